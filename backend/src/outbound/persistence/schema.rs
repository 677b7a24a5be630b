//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel
//! uses them for compile-time query validation. Regenerate with
//! `diesel print-schema` when migrations change.

diesel::table! {
    /// Registered accounts, clients and lawyers alike.
    users (id) {
        id -> Uuid,
        /// Lowercased unique email address.
        email -> Varchar,
        display_name -> Varchar,
        /// `client` or `lawyer`.
        role -> Varchar,
        /// PHC-format argon2id hash.
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// 1:1 client extras.
    client_profiles (user_id) {
        user_id -> Uuid,
        phone -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// 1:1 lawyer extras plus assignment bookkeeping.
    lawyer_profiles (user_id) {
        user_id -> Uuid,
        specialty -> Varchar,
        licence_number -> Varchar,
        verified -> Bool,
        /// When this lawyer last received a case, for round-robin.
        last_assigned_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Legal cases with their lifecycle status.
    cases (id) {
        id -> Uuid,
        client_id -> Uuid,
        lawyer_id -> Nullable<Uuid>,
        title -> Varchar,
        description -> Text,
        specialty -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded case documents, payload included.
    case_documents (id) {
        id -> Uuid,
        case_id -> Uuid,
        file_name -> Varchar,
        content_type -> Varchar,
        content -> Bytea,
        size_bytes -> Int8,
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Booked appointments between clients and lawyers.
    appointments (id) {
        id -> Uuid,
        client_id -> Uuid,
        lawyer_id -> Uuid,
        starts_at -> Timestamptz,
        ends_at -> Timestamptz,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Declared lawyer availability, one-off or weekly recurring.
    availability_slots (id) {
        id -> Uuid,
        lawyer_id -> Uuid,
        /// `one_off` or `weekly`.
        slot_type -> Varchar,
        starts_at -> Nullable<Timestamptz>,
        ends_at -> Nullable<Timestamptz>,
        /// 0 = Monday through 6 = Sunday, for weekly slots.
        weekday -> Nullable<Int2>,
        start_minute -> Nullable<Int2>,
        end_minute -> Nullable<Int2>,
    }
}

diesel::table! {
    /// Local mirror of every chat message.
    messages (id) {
        id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        body -> Text,
        sent_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    client_profiles,
    lawyer_profiles,
    cases,
    case_documents,
    appointments,
    availability_slots,
    messages,
);
