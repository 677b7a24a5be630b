//! PostgreSQL-backed `AvailabilityRepository` implementation using Diesel ORM.
//!
//! Slots are stored as tagged rows: `one_off` rows carry a concrete range,
//! `weekly` rows carry a weekday plus minutes after midnight UTC.

use async_trait::async_trait;
use chrono::Weekday;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::appointment::{AvailabilitySlot, TimeRange};
use crate::domain::ports::{AvailabilityRepository, AvailabilityRepositoryError};
use crate::domain::user::UserId;

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AvailabilitySlotRow, NewAvailabilitySlotRow};
use super::pool::{DbPool, PoolError};
use super::schema::availability_slots;

const SLOT_ONE_OFF: &str = "one_off";
const SLOT_WEEKLY: &str = "weekly";

/// Diesel-backed implementation of the availability repository port.
#[derive(Clone)]
pub struct DieselAvailabilityRepository {
    pool: DbPool,
}

impl DieselAvailabilityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AvailabilityRepositoryError {
    map_basic_pool_error(error, AvailabilityRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AvailabilityRepositoryError {
    map_basic_diesel_error(
        error,
        AvailabilityRepositoryError::query,
        AvailabilityRepositoryError::connection,
    )
}

/// Weekday storage index, 0 = Monday through 6 = Sunday.
fn weekday_to_index(weekday: Weekday) -> i16 {
    weekday.num_days_from_monday() as i16
}

fn weekday_from_index(index: i16) -> Result<Weekday, AvailabilityRepositoryError> {
    match index {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        other => Err(AvailabilityRepositoryError::query(format!(
            "stored weekday index out of range: {other}"
        ))),
    }
}

fn slot_to_row(lawyer_id: Uuid, slot: &AvailabilitySlot) -> NewAvailabilitySlotRow<'static> {
    match slot {
        AvailabilitySlot::OneOff(range) => NewAvailabilitySlotRow {
            id: Uuid::new_v4(),
            lawyer_id,
            slot_type: SLOT_ONE_OFF,
            starts_at: Some(range.start),
            ends_at: Some(range.end),
            weekday: None,
            start_minute: None,
            end_minute: None,
        },
        AvailabilitySlot::Weekly {
            weekday,
            start_minute,
            end_minute,
        } => NewAvailabilitySlotRow {
            id: Uuid::new_v4(),
            lawyer_id,
            slot_type: SLOT_WEEKLY,
            starts_at: None,
            ends_at: None,
            weekday: Some(weekday_to_index(*weekday)),
            start_minute: Some(*start_minute as i16),
            end_minute: Some(*end_minute as i16),
        },
    }
}

fn row_to_slot(row: &AvailabilitySlotRow) -> Result<AvailabilitySlot, AvailabilityRepositoryError> {
    match row.slot_type.as_str() {
        SLOT_ONE_OFF => {
            let (Some(starts_at), Some(ends_at)) = (row.starts_at, row.ends_at) else {
                return Err(AvailabilityRepositoryError::query(
                    "one-off slot row is missing its range",
                ));
            };
            let range = TimeRange::new(starts_at, ends_at)
                .map_err(|err| AvailabilityRepositoryError::query(err.to_string()))?;
            Ok(AvailabilitySlot::OneOff(range))
        }
        SLOT_WEEKLY => {
            let (Some(weekday), Some(start_minute), Some(end_minute)) =
                (row.weekday, row.start_minute, row.end_minute)
            else {
                return Err(AvailabilityRepositoryError::query(
                    "weekly slot row is missing its recurrence fields",
                ));
            };
            let weekday = weekday_from_index(weekday)?;
            AvailabilitySlot::weekly(weekday, start_minute as u16, end_minute as u16)
                .map_err(|err| AvailabilityRepositoryError::query(err.to_string()))
        }
        other => Err(AvailabilityRepositoryError::query(format!(
            "unknown slot type: {other}"
        ))),
    }
}

#[async_trait]
impl AvailabilityRepository for DieselAvailabilityRepository {
    async fn replace_for_lawyer(
        &self,
        lawyer_id: &UserId,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<(), AvailabilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let lawyer_id = *lawyer_id.as_uuid();

        let rows: Vec<NewAvailabilitySlotRow<'static>> = slots
            .iter()
            .map(|slot| slot_to_row(lawyer_id, slot))
            .collect();

        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    availability_slots::table
                        .filter(availability_slots::lawyer_id.eq(lawyer_id)),
                )
                .execute(conn)
                .await?;
                if !rows.is_empty() {
                    diesel::insert_into(availability_slots::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok::<(), diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_for_lawyer(
        &self,
        lawyer_id: &UserId,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AvailabilitySlotRow> = availability_slots::table
            .filter(availability_slots::lawyer_id.eq(lawyer_id.as_uuid()))
            .select(AvailabilitySlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.iter().map(row_to_slot).collect()
    }
}
