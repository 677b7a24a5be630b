//! Driving port for scheduling mutations: booking, cancellation,
//! rescheduling, and availability replacement.

use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::appointment::{
    Appointment, AppointmentStatus, AvailabilitySlot, SchedulingError, TimeRange,
};
use crate::domain::user::UserId;
use crate::domain::Error;

/// Serializable appointment representation for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub client_id: UserId,
    #[schema(value_type = String)]
    pub lawyer_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentPayload {
    fn from(value: Appointment) -> Self {
        Self {
            id: value.id,
            client_id: value.client_id,
            lawyer_id: value.lawyer_id,
            starts_at: value.range.start,
            ends_at: value.range.end,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Day names as accepted in availability payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<WeekdayName> for Weekday {
    fn from(value: WeekdayName) -> Self {
        match value {
            WeekdayName::Monday => Weekday::Mon,
            WeekdayName::Tuesday => Weekday::Tue,
            WeekdayName::Wednesday => Weekday::Wed,
            WeekdayName::Thursday => Weekday::Thu,
            WeekdayName::Friday => Weekday::Fri,
            WeekdayName::Saturday => Weekday::Sat,
            WeekdayName::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for WeekdayName {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Serializable availability slot, one-off or weekly recurring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AvailabilitySlotPayload {
    #[serde(rename_all = "camelCase")]
    OneOff {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Weekly {
        weekday: WeekdayName,
        start_minute: u16,
        end_minute: u16,
    },
}

impl TryFrom<AvailabilitySlotPayload> for AvailabilitySlot {
    type Error = SchedulingError;

    fn try_from(value: AvailabilitySlotPayload) -> Result<Self, Self::Error> {
        match value {
            AvailabilitySlotPayload::OneOff { starts_at, ends_at } => {
                Ok(Self::OneOff(TimeRange::new(starts_at, ends_at)?))
            }
            AvailabilitySlotPayload::Weekly {
                weekday,
                start_minute,
                end_minute,
            } => Self::weekly(weekday.into(), start_minute, end_minute),
        }
    }
}

impl From<AvailabilitySlot> for AvailabilitySlotPayload {
    fn from(value: AvailabilitySlot) -> Self {
        match value {
            AvailabilitySlot::OneOff(range) => Self::OneOff {
                starts_at: range.start,
                ends_at: range.end,
            },
            AvailabilitySlot::Weekly {
                weekday,
                start_minute,
                end_minute,
            } => Self::Weekly {
                weekday: weekday.into(),
                start_minute,
                end_minute,
            },
        }
    }
}

/// Request to book a lawyer.
#[derive(Debug, Clone)]
pub struct BookAppointmentRequest {
    pub client_id: UserId,
    pub lawyer_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Request to cancel an appointment.
#[derive(Debug, Clone)]
pub struct CancelAppointmentRequest {
    pub appointment_id: Uuid,
    pub actor: UserId,
}

/// Request to move an appointment to a new range.
#[derive(Debug, Clone)]
pub struct RescheduleAppointmentRequest {
    pub appointment_id: Uuid,
    pub actor: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Request replacing a lawyer's declared availability wholesale.
#[derive(Debug, Clone)]
pub struct ReplaceAvailabilityRequest {
    pub lawyer_id: UserId,
    pub slots: Vec<AvailabilitySlotPayload>,
}

/// Driving port for scheduling write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentCommand: Send + Sync {
    /// Book a lawyer; conflicts yield a conflict error, ranges outside the
    /// lawyer's availability an invalid-request error.
    async fn book(&self, request: BookAppointmentRequest) -> Result<AppointmentPayload, Error>;

    /// Cancel an appointment; either party may cancel.
    async fn cancel(&self, request: CancelAppointmentRequest)
        -> Result<AppointmentPayload, Error>;

    /// Reschedule an appointment under the same conflict rules as booking.
    async fn reschedule(
        &self,
        request: RescheduleAppointmentRequest,
    ) -> Result<AppointmentPayload, Error>;

    /// Replace the lawyer's availability slots.
    async fn replace_availability(&self, request: ReplaceAvailabilityRequest)
        -> Result<(), Error>;
}

/// Fixture command implementation for tests that do not need scheduling.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentCommand;

#[async_trait]
impl AppointmentCommand for FixtureAppointmentCommand {
    async fn book(&self, request: BookAppointmentRequest) -> Result<AppointmentPayload, Error> {
        let now = Utc::now();
        Ok(AppointmentPayload {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            lawyer_id: request.lawyer_id,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        })
    }

    async fn cancel(
        &self,
        _request: CancelAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        Err(Error::not_found("appointment not found"))
    }

    async fn reschedule(
        &self,
        _request: RescheduleAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        Err(Error::not_found("appointment not found"))
    }

    async fn replace_availability(
        &self,
        _request: ReplaceAvailabilityRequest,
    ) -> Result<(), Error> {
        Ok(())
    }
}
