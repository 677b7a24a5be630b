//! PostgreSQL-backed `LawyerDirectory` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::str::FromStr;

use crate::domain::lawyer::{LawyerProfile, LicenceNumber, Specialty};
use crate::domain::ports::{LawyerDirectory, LawyerDirectoryError};
use crate::domain::user::{DisplayName, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::LawyerProfileRow;
use super::pool::{DbPool, PoolError};
use super::schema::{lawyer_profiles, users};

/// Diesel-backed implementation of the lawyer directory port.
#[derive(Clone)]
pub struct DieselLawyerDirectory {
    pool: DbPool,
}

impl DieselLawyerDirectory {
    /// Create a new directory adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LawyerDirectoryError {
    map_basic_pool_error(error, LawyerDirectoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LawyerDirectoryError {
    map_basic_diesel_error(
        error,
        LawyerDirectoryError::query,
        LawyerDirectoryError::connection,
    )
}

fn row_to_profile(
    row: &LawyerProfileRow,
    display_name: &str,
) -> Result<LawyerProfile, LawyerDirectoryError> {
    let specialty = Specialty::from_str(row.specialty.as_str())
        .map_err(|err| LawyerDirectoryError::query(err.to_string()))?;
    let licence_number = LicenceNumber::new(row.licence_number.as_str())
        .map_err(|err| LawyerDirectoryError::query(err.to_string()))?;
    let display_name = DisplayName::new(display_name)
        .map_err(|err| LawyerDirectoryError::query(err.to_string()))?;
    Ok(LawyerProfile {
        user_id: UserId::from_uuid(row.user_id),
        display_name,
        specialty,
        licence_number,
        verified: row.verified,
        created_at: row.created_at,
    })
}

#[async_trait]
impl LawyerDirectory for DieselLawyerDirectory {
    async fn list_verified(
        &self,
        specialty: Option<Specialty>,
    ) -> Result<Vec<LawyerProfile>, LawyerDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = lawyer_profiles::table
            .inner_join(users::table.on(users::id.eq(lawyer_profiles::user_id)))
            .filter(lawyer_profiles::verified.eq(true))
            .into_boxed();
        if let Some(specialty) = specialty {
            query = query.filter(lawyer_profiles::specialty.eq(specialty.as_str()));
        }

        let rows: Vec<(LawyerProfileRow, String)> = query
            .order((
                lawyer_profiles::created_at.asc(),
                lawyer_profiles::user_id.asc(),
            ))
            .select((LawyerProfileRow::as_select(), users::display_name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.iter()
            .map(|(row, display_name)| row_to_profile(row, display_name))
            .collect()
    }

    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LawyerProfile>, LawyerDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(LawyerProfileRow, String)> = lawyer_profiles::table
            .inner_join(users::table.on(users::id.eq(lawyer_profiles::user_id)))
            .filter(lawyer_profiles::user_id.eq(user_id.as_uuid()))
            .select((LawyerProfileRow::as_select(), users::display_name))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref()
            .map(|(row, display_name)| row_to_profile(row, display_name))
            .transpose()
    }
}
