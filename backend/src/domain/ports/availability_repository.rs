//! Port for lawyer availability storage.

use async_trait::async_trait;

use crate::domain::appointment::AvailabilitySlot;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by availability repository adapters.
    pub enum AvailabilityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "availability repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "availability repository query failed: {message}",
    }
}

/// Port for reading and replacing a lawyer's declared availability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Replace the lawyer's slots wholesale in one transaction.
    async fn replace_for_lawyer(
        &self,
        lawyer_id: &UserId,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<(), AvailabilityRepositoryError>;

    /// All slots declared by the lawyer.
    async fn list_for_lawyer(
        &self,
        lawyer_id: &UserId,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityRepositoryError>;
}

/// Fixture implementation for tests that do not exercise availability.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAvailabilityRepository;

#[async_trait]
impl AvailabilityRepository for FixtureAvailabilityRepository {
    async fn replace_for_lawyer(
        &self,
        _lawyer_id: &UserId,
        _slots: Vec<AvailabilitySlot>,
    ) -> Result<(), AvailabilityRepositoryError> {
        Ok(())
    }

    async fn list_for_lawyer(
        &self,
        _lawyer_id: &UserId,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityRepositoryError> {
        Ok(Vec::new())
    }
}
