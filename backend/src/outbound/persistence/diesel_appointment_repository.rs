//! PostgreSQL-backed `AppointmentRepository` implementation using Diesel ORM.
//!
//! Booking and rescheduling run inside a transaction that locks the
//! lawyer's profile row before checking for overlap, so concurrent writes
//! for one lawyer queue behind each other.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::{Eq, Filter, ForUpdate, Select};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::appointment::{Appointment, AppointmentStatus, TimeRange};
use crate::domain::ports::{AppointmentRepository, AppointmentRepositoryError, NewAppointment};
use crate::domain::user::UserId;

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AppointmentRow, NewAppointmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{appointments, lawyer_profiles};

/// Diesel-backed implementation of the appointment repository port.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AppointmentRepositoryError {
    map_basic_pool_error(error, AppointmentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AppointmentRepositoryError {
    map_basic_diesel_error(
        error,
        AppointmentRepositoryError::query,
        AppointmentRepositoryError::connection,
    )
}

enum TxError {
    Diesel(diesel::result::Error),
    Repo(AppointmentRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: TxError) -> AppointmentRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Repo(error) => error,
    }
}

fn row_to_appointment(row: &AppointmentRow) -> Result<Appointment, AppointmentRepositoryError> {
    let range = TimeRange::new(row.starts_at, row.ends_at)
        .map_err(|err| AppointmentRepositoryError::query(err.to_string()))?;
    let status = AppointmentStatus::from_str(row.status.as_str())
        .map_err(|err| AppointmentRepositoryError::query(err.to_string()))?;
    Ok(Appointment {
        id: row.id,
        client_id: UserId::from_uuid(row.client_id),
        lawyer_id: UserId::from_uuid(row.lawyer_id),
        range,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

type LawyerLock = ForUpdate<
    Select<
        Filter<lawyer_profiles::table, Eq<lawyer_profiles::user_id, Uuid>>,
        lawyer_profiles::user_id,
    >,
>;

fn lawyer_lock(lawyer_id: Uuid) -> LawyerLock {
    lawyer_profiles::table
        .filter(lawyer_profiles::user_id.eq(lawyer_id))
        .select(lawyer_profiles::user_id)
        .for_update()
}

/// Take the lawyer's profile row as the per-lawyer booking lock.
///
/// The overlap scan cannot serialise first bookings on its own: with no
/// conflicting row in place there is nothing for `FOR UPDATE` to lock, and
/// two concurrent inserts would both pass the check. Every range writer
/// queues on the profile row instead, as the assignment adapter does.
async fn lock_lawyer(conn: &mut AsyncPgConnection, lawyer_id: Uuid) -> Result<(), TxError> {
    let locked: Option<Uuid> = lawyer_lock(lawyer_id).first(conn).await.optional()?;
    match locked {
        Some(_) => Ok(()),
        None => Err(TxError::Repo(AppointmentRepositoryError::query(
            "lawyer profile missing",
        ))),
    }
}

/// Whether the lawyer already has a scheduled appointment crossing `range`.
///
/// `exclude` skips the appointment being rescheduled so it does not
/// conflict with itself. Callers hold the lawyer's profile lock, so the
/// scan itself needs no locking clause.
async fn has_overlap(
    conn: &mut AsyncPgConnection,
    lawyer_id: Uuid,
    range: &TimeRange,
    exclude: Option<Uuid>,
) -> Result<bool, diesel::result::Error> {
    let mut query = appointments::table
        .filter(appointments::lawyer_id.eq(lawyer_id))
        .filter(appointments::status.eq(AppointmentStatus::Scheduled.as_str()))
        .filter(appointments::starts_at.lt(range.end))
        .filter(appointments::ends_at.gt(range.start))
        .select(appointments::id)
        .into_boxed();
    if let Some(excluded_id) = exclude {
        query = query.filter(appointments::id.ne(excluded_id));
    }

    let conflicting: Vec<Uuid> = query.load(conn).await?;
    Ok(!conflicting.is_empty())
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn book_if_free(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: AppointmentRow = conn
            .transaction(|conn| {
                async move {
                    let lawyer_id = *appointment.lawyer_id.as_uuid();
                    lock_lawyer(conn, lawyer_id).await?;
                    if has_overlap(conn, lawyer_id, &appointment.range, None).await? {
                        return Err(TxError::Repo(AppointmentRepositoryError::overlap()));
                    }

                    let row = diesel::insert_into(appointments::table)
                        .values(&NewAppointmentRow {
                            id: appointment.id,
                            client_id: *appointment.client_id.as_uuid(),
                            lawyer_id,
                            starts_at: appointment.range.start,
                            ends_at: appointment.range.end,
                            status: AppointmentStatus::Scheduled.as_str(),
                        })
                        .returning(AppointmentRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        row_to_appointment(&row)
    }

    async fn reschedule_if_free(
        &self,
        appointment_id: &Uuid,
        range: TimeRange,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let appointment_id = *appointment_id;

        let row: AppointmentRow = conn
            .transaction(|conn| {
                async move {
                    let lawyer_id: Uuid = appointments::table
                        .filter(appointments::id.eq(appointment_id))
                        .select(appointments::lawyer_id)
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or(TxError::Repo(AppointmentRepositoryError::not_found()))?;

                    lock_lawyer(conn, lawyer_id).await?;
                    if has_overlap(conn, lawyer_id, &range, Some(appointment_id)).await? {
                        return Err(TxError::Repo(AppointmentRepositoryError::overlap()));
                    }

                    let row = diesel::update(
                        appointments::table.filter(appointments::id.eq(appointment_id)),
                    )
                    .set((
                        appointments::starts_at.eq(range.start),
                        appointments::ends_at.eq(range.end),
                        appointments::status.eq(AppointmentStatus::Scheduled.as_str()),
                        appointments::updated_at.eq(Utc::now()),
                    ))
                    .returning(AppointmentRow::as_returning())
                    .get_result(conn)
                    .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        row_to_appointment(&row)
    }

    async fn find_by_id(
        &self,
        appointment_id: &Uuid,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = appointments::table
            .filter(appointments::id.eq(appointment_id))
            .select(AppointmentRow::as_select())
            .first::<AppointmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_appointment).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AppointmentRow> = appointments::table
            .filter(
                appointments::client_id
                    .eq(user_id.as_uuid())
                    .or(appointments::lawyer_id.eq(user_id.as_uuid())),
            )
            .order(appointments::starts_at.asc())
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.iter().map(row_to_appointment).collect()
    }

    async fn set_status(
        &self,
        appointment_id: &Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(appointments::table.filter(appointments::id.eq(appointment_id)))
            .set((
                appointments::status.eq(status.as_str()),
                appointments::updated_at.eq(Utc::now()),
            ))
            .returning(AppointmentRow::as_returning())
            .get_result::<AppointmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or(AppointmentRepositoryError::not_found())?;

        row_to_appointment(&row)
    }

    async fn booked_ranges(
        &self,
        lawyer_id: &UserId,
        window: &TimeRange,
    ) -> Result<Vec<TimeRange>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(chrono::DateTime<Utc>, chrono::DateTime<Utc>)> = appointments::table
            .filter(appointments::lawyer_id.eq(lawyer_id.as_uuid()))
            .filter(appointments::status.eq(AppointmentStatus::Scheduled.as_str()))
            .filter(appointments::starts_at.lt(window.end))
            .filter(appointments::ends_at.gt(window.start))
            .order(appointments::starts_at.asc())
            .select((appointments::starts_at, appointments::ends_at))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(start, end)| {
                TimeRange::new(start, end)
                    .map_err(|err| AppointmentRepositoryError::query(err.to_string()))
            })
            .collect()
    }
}
