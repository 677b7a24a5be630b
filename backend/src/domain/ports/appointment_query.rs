//! Driving port for scheduling reads: own appointments, busy ranges, and
//! bookable slots.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::user::UserId;
use crate::domain::Error;

use super::appointment_command::AppointmentPayload;

/// Serializable time range for busy and slot listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct RangePayload {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl From<crate::domain::appointment::TimeRange> for RangePayload {
    fn from(value: crate::domain::appointment::TimeRange) -> Self {
        Self {
            starts_at: value.start,
            ends_at: value.end,
        }
    }
}

/// Request for the actor's own appointments.
#[derive(Debug, Clone)]
pub struct ListAppointmentsRequest {
    pub actor: UserId,
}

/// Window query against one lawyer's calendar.
#[derive(Debug, Clone)]
pub struct CalendarWindowRequest {
    pub lawyer_id: UserId,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Driving port for scheduling read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentQuery: Send + Sync {
    /// Every appointment the actor is a party to, soonest first.
    async fn list_appointments(
        &self,
        request: ListAppointmentsRequest,
    ) -> Result<Vec<AppointmentPayload>, Error>;

    /// Booked ranges for a lawyer within the window.
    async fn busy(&self, request: CalendarWindowRequest) -> Result<Vec<RangePayload>, Error>;

    /// Declared availability within the window minus booked ranges.
    async fn slots(&self, request: CalendarWindowRequest) -> Result<Vec<RangePayload>, Error>;
}

/// Fixture query implementation for tests that do not need calendars.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentQuery;

#[async_trait]
impl AppointmentQuery for FixtureAppointmentQuery {
    async fn list_appointments(
        &self,
        _request: ListAppointmentsRequest,
    ) -> Result<Vec<AppointmentPayload>, Error> {
        Ok(Vec::new())
    }

    async fn busy(&self, _request: CalendarWindowRequest) -> Result<Vec<RangePayload>, Error> {
        Ok(Vec::new())
    }

    async fn slots(&self, _request: CalendarWindowRequest) -> Result<Vec<RangePayload>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_calendar_is_empty() {
        let query = FixtureAppointmentQuery;
        let window = CalendarWindowRequest {
            lawyer_id: UserId::random(),
            from: Utc::now(),
            to: Utc::now() + chrono::Duration::days(7),
        };
        assert!(query.busy(window.clone()).await.expect("succeeds").is_empty());
        assert!(query.slots(window).await.expect("succeeds").is_empty());
    }
}
