//! Identity service: registration and credential verification over the
//! user repository.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::{CredentialError, LoginCredentials, Registration};
use crate::domain::lawyer::LicenceNumber;
use crate::domain::ports::{
    AuthenticateRequest, IdentityService, NewAccount, ProfileDetails, RegisterProfile,
    RegisterRequest, UserPayload, UserRepository, UserRepositoryError,
};
use crate::domain::user::{Role, UserId};
use crate::domain::Error;

/// Uniform rejection for bad credentials; never hints which field failed.
const BAD_CREDENTIALS: &str = "invalid email or password";

/// [`IdentityService`] backed by a [`UserRepository`].
pub struct AuthService<R> {
    users: Arc<R>,
}

impl<R> AuthService<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateEmail => Error::conflict("email is already registered"),
        other => Error::internal(other.to_string()),
    }
}

fn map_credential_error(error: CredentialError) -> Error {
    Error::invalid_request(error.to_string())
}

#[async_trait]
impl<R> IdentityService for AuthService<R>
where
    R: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<UserPayload, Error> {
        let role = match &request.profile {
            RegisterProfile::Client { .. } => Role::Client,
            RegisterProfile::Lawyer { .. } => Role::Lawyer,
        };
        let registration = Registration::new(
            request.email,
            request.display_name,
            role,
            request.password,
        )
        .map_err(map_credential_error)?;
        let profile = match request.profile {
            RegisterProfile::Client { phone } => ProfileDetails::Client { phone },
            RegisterProfile::Lawyer {
                specialty,
                licence_number,
            } => ProfileDetails::Lawyer {
                specialty,
                licence_number: LicenceNumber::new(licence_number)
                    .map_err(|err| Error::invalid_request(err.to_string()))?,
            },
        };

        let password_hash = registration
            .password
            .hash()
            .map_err(map_credential_error)?;
        let user = self
            .users
            .create(NewAccount {
                id: UserId::random(),
                email: registration.email,
                display_name: registration.display_name,
                password_hash,
                profile,
            })
            .await
            .map_err(map_repository_error)?;
        Ok(user.into())
    }

    async fn authenticate(&self, request: AuthenticateRequest) -> Result<UserPayload, Error> {
        let credentials = LoginCredentials::new(request.email, request.password)
            .map_err(|_| Error::unauthorized(BAD_CREDENTIALS))?;
        let stored = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized(BAD_CREDENTIALS))?;
        if !stored.password_hash.verify(&credentials.password) {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        Ok(stored.user.into())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<UserPayload, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(user.into())
    }
}
