//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::auth::PasswordHashString;
use crate::domain::lawyer::{LicenceNumber, Specialty};
use crate::domain::user::{DisplayName, EmailAddress, Role, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The email is already registered.
        DuplicateEmail =>
            "email is already registered",
    }
}

/// Role-specific profile details captured at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileDetails {
    Client { phone: Option<String> },
    Lawyer { specialty: Specialty, licence_number: LicenceNumber },
}

impl ProfileDetails {
    /// The account role this profile belongs to.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Client { .. } => Role::Client,
            Self::Lawyer { .. } => Role::Lawyer,
        }
    }
}

/// A new account ready to persist: user row plus its 1:1 profile row.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: UserId,
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub password_hash: PasswordHashString,
    pub profile: ProfileDetails,
}

/// A stored account as loaded for authentication.
#[derive(Debug, Clone)]
pub struct StoredAccount {
    pub user: User,
    pub password_hash: PasswordHashString,
}

/// Port for creating and loading user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account atomically with its profile row.
    async fn create(&self, account: NewAccount) -> Result<User, UserRepositoryError>;

    /// Load an account by email for credential verification.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredAccount>, UserRepositoryError>;

    /// Load a user by id.
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise account storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, account: NewAccount) -> Result<User, UserRepositoryError> {
        Ok(User::new(
            account.id,
            account.email,
            account.display_name,
            account.profile.role(),
            chrono::Utc::now(),
        ))
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<StoredAccount>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_id(&self, _user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::auth::Password;

    fn new_account(role: Role) -> NewAccount {
        let profile = match role {
            Role::Client => ProfileDetails::Client { phone: None },
            Role::Lawyer => ProfileDetails::Lawyer {
                specialty: Specialty::Family,
                licence_number: LicenceNumber::new("SRA-000001").expect("valid"),
            },
        };
        NewAccount {
            id: UserId::random(),
            email: EmailAddress::new("someone@example.com").expect("valid"),
            display_name: DisplayName::new("Someone Fair").expect("valid"),
            password_hash: Password::new("a sound password")
                .expect("valid")
                .hash()
                .expect("hashes"),
            profile,
        }
    }

    #[rstest]
    #[case(Role::Client)]
    #[case(Role::Lawyer)]
    #[tokio::test]
    async fn fixture_create_echoes_the_role(#[case] role: Role) {
        let repo = FixtureUserRepository;
        let user = repo
            .create(new_account(role))
            .await
            .expect("fixture create succeeds");
        assert_eq!(user.role(), role);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_return_none() {
        let repo = FixtureUserRepository;
        let email = EmailAddress::new("nobody@example.com").expect("valid");
        assert!(repo.find_by_email(&email).await.expect("succeeds").is_none());
        assert!(
            repo.find_by_id(&UserId::random())
                .await
                .expect("succeeds")
                .is_none()
        );
    }

    #[rstest]
    fn duplicate_email_formats_a_stable_message() {
        assert_eq!(
            UserRepositoryError::duplicate_email().to_string(),
            "email is already registered"
        );
    }
}
