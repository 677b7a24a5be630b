//! Driving port for the public lawyer directory listing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::lawyer::{LawyerProfile, Specialty};
use crate::domain::user::UserId;
use crate::domain::Error;

/// Serializable lawyer directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LawyerPayload {
    #[schema(value_type = String)]
    pub id: UserId,
    pub display_name: String,
    pub specialty: Specialty,
    pub verified: bool,
    pub member_since: DateTime<Utc>,
}

impl From<LawyerProfile> for LawyerPayload {
    fn from(value: LawyerProfile) -> Self {
        Self {
            id: value.user_id,
            display_name: value.display_name.into(),
            specialty: value.specialty,
            verified: value.verified,
            member_since: value.created_at,
        }
    }
}

/// Request for the verified directory, optionally narrowed to one specialty.
#[derive(Debug, Clone)]
pub struct ListLawyersRequest {
    pub specialty: Option<Specialty>,
}

/// Driving port for directory reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LawyerQuery: Send + Sync {
    /// Verified lawyers in directory order.
    async fn list_lawyers(&self, request: ListLawyersRequest)
        -> Result<Vec<LawyerPayload>, Error>;
}

/// Fixture query implementation for tests that do not need the directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLawyerQuery;

#[async_trait]
impl LawyerQuery for FixtureLawyerQuery {
    async fn list_lawyers(
        &self,
        _request: ListLawyersRequest,
    ) -> Result<Vec<LawyerPayload>, Error> {
        Ok(Vec::new())
    }
}
