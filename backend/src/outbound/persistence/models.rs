//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    appointments, availability_slots, case_documents, cases, client_profiles, lawyer_profiles,
    messages, users,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
}

/// Insertable struct for the client side of a registration.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = client_profiles)]
pub(crate) struct NewClientProfileRow<'a> {
    pub user_id: Uuid,
    pub phone: Option<&'a str>,
}

/// Row struct for reading from the lawyer_profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lawyer_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LawyerProfileRow {
    pub user_id: Uuid,
    pub specialty: String,
    pub licence_number: String,
    pub verified: bool,
    #[expect(dead_code, reason = "read through the candidate query instead")]
    pub last_assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the lawyer side of a registration.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lawyer_profiles)]
pub(crate) struct NewLawyerProfileRow<'a> {
    pub user_id: Uuid,
    pub specialty: &'a str,
    pub licence_number: &'a str,
    pub verified: bool,
}

/// Row struct for reading from the cases table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub specialty: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new case records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cases)]
pub(crate) struct NewCaseRow<'a> {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub specialty: &'a str,
    pub status: &'a str,
}

/// Row struct for document listings; excludes the payload bytes.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = case_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseDocumentMetaRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Insertable struct for storing an uploaded document.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = case_documents)]
pub(crate) struct NewCaseDocumentRow<'a> {
    pub id: Uuid,
    pub case_id: Uuid,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub content: &'a [u8],
    pub size_bytes: i64,
}

/// Row struct for reading from the appointments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for booking an appointment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub(crate) struct NewAppointmentRow<'a> {
    pub id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: &'a str,
}

/// Row struct for reading from the availability_slots table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = availability_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AvailabilitySlotRow {
    #[expect(dead_code, reason = "surrogate key, never read back")]
    pub id: Uuid,
    #[expect(dead_code, reason = "queries already filter on the lawyer")]
    pub lawyer_id: Uuid,
    pub slot_type: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub weekday: Option<i16>,
    pub start_minute: Option<i16>,
    pub end_minute: Option<i16>,
}

/// Insertable struct for declaring an availability slot.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = availability_slots)]
pub(crate) struct NewAvailabilitySlotRow<'a> {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub slot_type: &'a str,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub weekday: Option<i16>,
    pub start_minute: Option<i16>,
    pub end_minute: Option<i16>,
}

/// Row struct for reading from the messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Insertable struct for mirroring a message.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: &'a str,
    pub sent_at: DateTime<Utc>,
}
