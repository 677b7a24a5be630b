//! Port for appointment persistence with conflict-checked writes.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::appointment::{Appointment, AppointmentStatus, TimeRange};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "appointment repository query failed: {message}",
        /// The appointment does not exist.
        NotFound =>
            "appointment not found",
        /// The requested range overlaps an existing scheduled appointment.
        Overlap =>
            "the requested time overlaps an existing appointment",
    }
}

/// Fields needed to book an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub id: Uuid,
    pub client_id: UserId,
    pub lawyer_id: UserId,
    pub range: TimeRange,
}

/// Port for appointment writes and reads.
///
/// `book_if_free` and `reschedule_if_free` must check for overlapping
/// scheduled appointments and insert or update inside one transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Insert the appointment unless its range overlaps a scheduled one for
    /// the same lawyer; overlap yields [`AppointmentRepositoryError::Overlap`].
    async fn book_if_free(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError>;

    /// Move an appointment to a new range under the same overlap rules.
    async fn reschedule_if_free(
        &self,
        appointment_id: &Uuid,
        range: TimeRange,
    ) -> Result<Appointment, AppointmentRepositoryError>;

    /// Load an appointment by id.
    async fn find_by_id(
        &self,
        appointment_id: &Uuid,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Every appointment the user is a party to, soonest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Update the status of an appointment.
    async fn set_status(
        &self,
        appointment_id: &Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentRepositoryError>;

    /// Ranges of scheduled appointments for a lawyer within a window.
    async fn booked_ranges(
        &self,
        lawyer_id: &UserId,
        window: &TimeRange,
    ) -> Result<Vec<TimeRange>, AppointmentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise scheduling storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentRepository;

#[async_trait]
impl AppointmentRepository for FixtureAppointmentRepository {
    async fn book_if_free(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let now = Utc::now();
        Ok(Appointment {
            id: appointment.id,
            client_id: appointment.client_id,
            lawyer_id: appointment.lawyer_id,
            range: appointment.range,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        })
    }

    async fn reschedule_if_free(
        &self,
        _appointment_id: &Uuid,
        _range: TimeRange,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        Err(AppointmentRepositoryError::not_found())
    }

    async fn find_by_id(
        &self,
        _appointment_id: &Uuid,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn set_status(
        &self,
        _appointment_id: &Uuid,
        _status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        Err(AppointmentRepositoryError::not_found())
    }

    async fn booked_ranges(
        &self,
        _lawyer_id: &UserId,
        _window: &TimeRange,
    ) -> Result<Vec<TimeRange>, AppointmentRepositoryError> {
        Ok(Vec::new())
    }
}
