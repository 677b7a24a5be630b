//! Shared Diesel-to-port error translation used by every repository adapter.

use tracing::debug;

use super::pool::PoolError;

/// Fold a pool failure into a repository connection-error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let (PoolError::Checkout { message } | PoolError::Build { message }) = error;
    connection(message)
}

/// Translate the Diesel error variants every adapter sees the same way.
///
/// `NotFound` and query-builder failures become query errors; only a closed
/// connection is reported as a connection error. Repositories with richer
/// semantics (unique violations, compare-and-swap misses) intercept those
/// variants before delegating here.
pub fn map_basic_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "statement failed");
    } else {
        debug!(error = %error, "statement failed");
    }

    match error {
        DieselError::NotFound => query("row not found"),
        DieselError::QueryBuilderError(_) => query("malformed query"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection lost")
        }
        _ => query("database failure"),
    }
}

/// Whether a Diesel error is a unique constraint violation.
pub fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}
