//! Scheduling: appointments, time ranges, and lawyer availability.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;

/// Longest window the slot and busy queries will expand over.
pub const MAX_WINDOW_DAYS: i64 = 62;

/// Errors raised while validating scheduling input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("start must be before end")]
    EmptyRange,
    #[error("window must span at most {MAX_WINDOW_DAYS} days")]
    WindowTooWide,
    #[error("minutes of day must be below 1440 and start before end")]
    InvalidMinutes,
    #[error("unknown weekday")]
    UnknownWeekday,
}

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted input.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SchedulingError> {
        if start >= end {
            return Err(SchedulingError::EmptyRange);
        }
        Ok(Self { start, end })
    }

    /// Build a query window, additionally bounded to [`MAX_WINDOW_DAYS`].
    pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SchedulingError> {
        let range = Self::new(start, end)?;
        if range.end - range.start > Duration::days(MAX_WINDOW_DAYS) {
            return Err(SchedulingError::WindowTooWide);
        }
        Ok(range)
    }

    /// Standard half-open interval overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Appointment lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAppointmentStatus(pub String);

impl fmt::Display for UnknownAppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown appointment status: {}", self.0)
    }
}

impl std::error::Error for UnknownAppointmentStatus {}

impl FromStr for AppointmentStatus {
    type Err = UnknownAppointmentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownAppointmentStatus(other.to_owned())),
        }
    }
}

/// A booked client-lawyer meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: UserId,
    pub lawyer_id: UserId,
    pub range: TimeRange,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether `user` is a party to this appointment.
    #[must_use]
    pub fn is_party(&self, user: &UserId) -> bool {
        &self.client_id == user || &self.lawyer_id == user
    }

    /// Only scheduled appointments block the lawyer's calendar.
    #[must_use]
    pub fn blocks_calendar(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

/// A lawyer's declared availability: a one-off range or a weekly recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilitySlot {
    OneOff(TimeRange),
    Weekly {
        weekday: Weekday,
        /// Minutes after midnight UTC, `start < end`, both below 1440.
        start_minute: u16,
        end_minute: u16,
    },
}

impl AvailabilitySlot {
    /// Validate a weekly recurrence.
    pub fn weekly(
        weekday: Weekday,
        start_minute: u16,
        end_minute: u16,
    ) -> Result<Self, SchedulingError> {
        if start_minute >= end_minute || end_minute > 1_440 {
            return Err(SchedulingError::InvalidMinutes);
        }
        Ok(Self::Weekly {
            weekday,
            start_minute,
            end_minute,
        })
    }

    /// Concrete ranges this slot contributes within `window`, clipped to it.
    #[must_use]
    pub fn expand(&self, window: &TimeRange) -> Vec<TimeRange> {
        match self {
            Self::OneOff(range) => clip(range, window).into_iter().collect(),
            Self::Weekly {
                weekday,
                start_minute,
                end_minute,
            } => expand_weekly(*weekday, *start_minute, *end_minute, window),
        }
    }
}

fn clip(range: &TimeRange, window: &TimeRange) -> Option<TimeRange> {
    let start = range.start.max(window.start);
    let end = range.end.min(window.end);
    TimeRange::new(start, end).ok()
}

fn expand_weekly(
    weekday: Weekday,
    start_minute: u16,
    end_minute: u16,
    window: &TimeRange,
) -> Vec<TimeRange> {
    let mut ranges = Vec::new();
    // Start one day early so a slot straddling the window start is clipped
    // rather than missed.
    let mut day = window.start.date_naive() - Duration::days(1);
    let last = window.end.date_naive();
    while day <= last {
        if day.weekday() == weekday {
            let start = at_minute(day, start_minute);
            let end = at_minute(day, end_minute);
            if let Ok(range) = TimeRange::new(start, end) {
                if let Some(clipped) = clip(&range, window) {
                    ranges.push(clipped);
                }
            }
        }
        day += Duration::days(1);
    }
    ranges
}

fn at_minute(day: chrono::NaiveDate, minute: u16) -> DateTime<Utc> {
    let time = NaiveTime::from_num_seconds_from_midnight_opt(u32::from(minute) * 60, 0)
        .unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(time))
}

/// Expand `slots` over `window` and subtract `busy`, yielding the lawyer's
/// bookable ranges in ascending order.
#[must_use]
pub fn free_ranges(
    slots: &[AvailabilitySlot],
    busy: &[TimeRange],
    window: &TimeRange,
) -> Vec<TimeRange> {
    let mut available: Vec<TimeRange> = slots
        .iter()
        .flat_map(|slot| slot.expand(window))
        .collect();
    available.sort_by_key(|range| range.start);

    let mut busy: Vec<TimeRange> = busy.to_vec();
    busy.sort_by_key(|range| range.start);

    let mut free = Vec::new();
    for range in available {
        subtract_into(range, &busy, &mut free);
    }
    free
}

fn subtract_into(range: TimeRange, busy: &[TimeRange], out: &mut Vec<TimeRange>) {
    let mut cursor = range.start;
    for block in busy {
        if block.end <= cursor || block.start >= range.end {
            continue;
        }
        if block.start > cursor {
            if let Ok(gap) = TimeRange::new(cursor, block.start) {
                out.push(gap);
            }
        }
        cursor = cursor.max(block.end);
        if cursor >= range.end {
            return;
        }
    }
    if let Ok(tail) = TimeRange::new(cursor, range.end) {
        out.push(tail);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn range(start_day: u32, start_hour: u32, end_day: u32, end_hour: u32) -> TimeRange {
        TimeRange::new(at(start_day, start_hour), at(end_day, end_hour)).expect("valid range")
    }

    #[rstest]
    fn rejects_empty_and_inverted_ranges() {
        assert_eq!(
            TimeRange::new(at(2, 10), at(2, 10)).expect_err("must fail"),
            SchedulingError::EmptyRange
        );
        assert_eq!(
            TimeRange::new(at(2, 11), at(2, 10)).expect_err("must fail"),
            SchedulingError::EmptyRange
        );
    }

    #[rstest]
    // Touching endpoints do not overlap in a half-open model.
    #[case(range(2, 9, 2, 10), range(2, 10, 2, 11), false)]
    #[case(range(2, 9, 2, 11), range(2, 10, 2, 12), true)]
    #[case(range(2, 9, 2, 17), range(2, 10, 2, 11), true)]
    #[case(range(2, 9, 2, 10), range(2, 14, 2, 15), false)]
    fn overlap_is_half_open(
        #[case] a: TimeRange,
        #[case] b: TimeRange,
        #[case] expected: bool,
    ) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    fn window_caps_the_span() {
        let start = at(1, 0);
        let too_wide = start + Duration::days(MAX_WINDOW_DAYS + 1);
        assert_eq!(
            TimeRange::window(start, too_wide).expect_err("must fail"),
            SchedulingError::WindowTooWide
        );
        assert!(TimeRange::window(start, start + Duration::days(MAX_WINDOW_DAYS)).is_ok());
    }

    #[rstest]
    fn weekly_slot_expands_once_per_matching_day() {
        // 2026-03-02 is a Monday.
        let slot = AvailabilitySlot::weekly(Weekday::Mon, 9 * 60, 12 * 60).expect("valid");
        let window = range(1, 0, 15, 0);
        let expanded = slot.expand(&window);
        assert_eq!(expanded, vec![range(2, 9, 2, 12), range(9, 9, 9, 12)]);
    }

    #[rstest]
    fn weekly_slot_rejects_inverted_minutes() {
        assert_eq!(
            AvailabilitySlot::weekly(Weekday::Tue, 600, 600).expect_err("must fail"),
            SchedulingError::InvalidMinutes
        );
        assert_eq!(
            AvailabilitySlot::weekly(Weekday::Tue, 600, 2_000).expect_err("must fail"),
            SchedulingError::InvalidMinutes
        );
    }

    #[rstest]
    fn one_off_slot_is_clipped_to_the_window() {
        let slot = AvailabilitySlot::OneOff(range(1, 8, 1, 18));
        let window = range(1, 10, 1, 12);
        assert_eq!(slot.expand(&window), vec![range(1, 10, 1, 12)]);
    }

    #[rstest]
    fn free_ranges_subtract_booked_time() {
        let slots = vec![AvailabilitySlot::OneOff(range(2, 9, 2, 17))];
        let busy = vec![range(2, 10, 2, 11), range(2, 13, 2, 14)];
        let window = range(2, 0, 3, 0);
        assert_eq!(
            free_ranges(&slots, &busy, &window),
            vec![range(2, 9, 2, 10), range(2, 11, 2, 13), range(2, 14, 2, 17)]
        );
    }

    #[rstest]
    fn fully_booked_slot_yields_nothing() {
        let slots = vec![AvailabilitySlot::OneOff(range(2, 9, 2, 11))];
        let busy = vec![range(2, 8, 2, 12)];
        let window = range(2, 0, 3, 0);
        assert!(free_ranges(&slots, &busy, &window).is_empty());
    }
}
