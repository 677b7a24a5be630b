//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Persists accounts together with their role profile row and loads them
//! back through validated domain constructors.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use std::str::FromStr;

use crate::domain::auth::PasswordHashString;
use crate::domain::lawyer::{LicenceNumber, Specialty};
use crate::domain::ports::{
    NewAccount, ProfileDetails, StoredAccount, UserRepository, UserRepositoryError,
};
use crate::domain::user::{DisplayName, EmailAddress, Role, User, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewClientProfileRow, NewLawyerProfileRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{client_profiles, lawyer_profiles, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    if is_unique_violation(&error) {
        return UserRepositoryError::duplicate_email();
    }
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Build the profile row for a freshly registered lawyer.
///
/// Accounts start unverified; verification is granted out of band, and the
/// directory and assignment pools only consider verified profiles.
fn new_lawyer_profile_row(
    user_id: uuid::Uuid,
    specialty: Specialty,
    licence_number: &LicenceNumber,
) -> NewLawyerProfileRow<'_> {
    NewLawyerProfileRow {
        user_id,
        specialty: specialty.as_str(),
        licence_number: licence_number.as_ref(),
        verified: false,
    }
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: &UserRow) -> Result<User, UserRepositoryError> {
    let id = UserId::from_uuid(row.id);
    let email = EmailAddress::new(row.email.as_str())
        .map_err(|err| UserRepositoryError::query(err.to_string()))?;
    let display_name = DisplayName::new(row.display_name.as_str())
        .map_err(|err| UserRepositoryError::query(err.to_string()))?;
    let role = Role::from_str(row.role.as_str())
        .map_err(|err| UserRepositoryError::query(err.to_string()))?;
    Ok(User::new(id, email, display_name, role, row.created_at))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, account: NewAccount) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let role = account.profile.role();
        let profile = account.profile.clone();
        let user_row = NewUserRow {
            id: *account.id.as_uuid(),
            email: account.email.as_ref(),
            display_name: account.display_name.as_ref(),
            role: role.as_str(),
            password_hash: account.password_hash.as_ref(),
        };

        let row: UserRow = conn
            .transaction(|conn| {
                async move {
                    let row: UserRow = diesel::insert_into(users::table)
                        .values(&user_row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;

                    match &profile {
                        ProfileDetails::Client { phone } => {
                            diesel::insert_into(client_profiles::table)
                                .values(&NewClientProfileRow {
                                    user_id: row.id,
                                    phone: phone.as_deref(),
                                })
                                .execute(conn)
                                .await?;
                        }
                        ProfileDetails::Lawyer {
                            specialty,
                            licence_number,
                        } => {
                            diesel::insert_into(lawyer_profiles::table)
                                .values(&new_lawyer_profile_row(
                                    row.id,
                                    *specialty,
                                    licence_number,
                                ))
                                .execute(conn)
                                .await?;
                        }
                    }
                    Ok::<UserRow, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_user(&row)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            let user = row_to_user(&row)?;
            let password_hash = PasswordHashString::from_stored(row.password_hash.clone());
            Ok(StoredAccount {
                user,
                password_hash,
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(user_id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }
}
