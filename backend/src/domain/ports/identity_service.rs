//! Driving port for account registration and credential verification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::lawyer::Specialty;
use crate::domain::user::{Role, User, UserId};
use crate::domain::Error;

/// Serializable user profile for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[schema(value_type = String)]
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        Self {
            id: value.id().clone(),
            email: value.email().to_string(),
            display_name: value.display_name().to_string(),
            role: value.role(),
            created_at: value.created_at(),
        }
    }
}

/// Role-specific registration fields.
#[derive(Debug, Clone)]
pub enum RegisterProfile {
    Client { phone: Option<String> },
    Lawyer { specialty: Specialty, licence_number: String },
}

/// Request to create an account.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub profile: RegisterProfile,
}

/// Request to verify credentials at login.
#[derive(Debug, Clone)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

/// Driving port for identity operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an account; a duplicate email yields a conflict error.
    async fn register(&self, request: RegisterRequest) -> Result<UserPayload, Error>;

    /// Verify credentials; wrong email and wrong password are
    /// indistinguishable to the caller.
    async fn authenticate(&self, request: AuthenticateRequest) -> Result<UserPayload, Error>;

    /// Load the profile behind an authenticated token.
    async fn get_user(&self, user_id: &UserId) -> Result<UserPayload, Error>;
}

/// Fixture identity service for tests that do not need real accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityService;

#[async_trait]
impl IdentityService for FixtureIdentityService {
    async fn register(&self, request: RegisterRequest) -> Result<UserPayload, Error> {
        let role = match request.profile {
            RegisterProfile::Client { .. } => Role::Client,
            RegisterProfile::Lawyer { .. } => Role::Lawyer,
        };
        Ok(UserPayload {
            id: UserId::random(),
            email: request.email,
            display_name: request.display_name,
            role,
            created_at: Utc::now(),
        })
    }

    async fn authenticate(&self, _request: AuthenticateRequest) -> Result<UserPayload, Error> {
        Err(Error::unauthorized("invalid email or password"))
    }

    async fn get_user(&self, _user_id: &UserId) -> Result<UserPayload, Error> {
        Err(Error::not_found("user not found"))
    }
}
