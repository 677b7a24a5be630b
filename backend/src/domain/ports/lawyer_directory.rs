//! Port for reading the verified lawyer directory.

use async_trait::async_trait;

use crate::domain::lawyer::{LawyerProfile, Specialty};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by lawyer directory adapters.
    pub enum LawyerDirectoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "lawyer directory connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "lawyer directory query failed: {message}",
    }
}

/// Port for reading lawyer profiles in directory order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LawyerDirectory: Send + Sync {
    /// Verified lawyers, optionally narrowed to one specialty, ordered by
    /// `(created_at, user_id)` ascending.
    async fn list_verified(
        &self,
        specialty: Option<Specialty>,
    ) -> Result<Vec<LawyerProfile>, LawyerDirectoryError>;

    /// A single lawyer's profile, verified or not.
    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LawyerProfile>, LawyerDirectoryError>;
}

/// Fixture implementation for tests that do not exercise the directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLawyerDirectory;

#[async_trait]
impl LawyerDirectory for FixtureLawyerDirectory {
    async fn list_verified(
        &self,
        _specialty: Option<Specialty>,
    ) -> Result<Vec<LawyerProfile>, LawyerDirectoryError> {
        Ok(Vec::new())
    }

    async fn find_profile(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<LawyerProfile>, LawyerDirectoryError> {
        Ok(None)
    }
}
