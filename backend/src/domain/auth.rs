//! Credential handling: password policy and argon2id hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::domain::user::{DisplayName, EmailAddress, Role, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length; argon2 inputs are bounded anyway.
pub const PASSWORD_MAX: usize = 128;

/// Errors raised while validating or hashing credentials.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters")]
    PasswordLength,
    #[error("failed to hash password")]
    Hashing,
    #[error(transparent)]
    Identity(#[from] UserValidationError),
}

/// Raw password accepted from a registration or login request.
///
/// The cleartext never leaves this type; it is either hashed or compared
/// against a stored hash.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Validate password length and wrap the cleartext.
    pub fn new(raw: impl Into<String>) -> Result<Self, CredentialError> {
        let raw = raw.into();
        let length = raw.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialError::PasswordLength);
        }
        Ok(Self(raw))
    }

    /// Hash the password with argon2id and a fresh random salt.
    pub fn hash(&self) -> Result<PasswordHashString, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|_| CredentialError::Hashing)?;
        Ok(PasswordHashString(hash.to_string()))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}

/// PHC-encoded argon2id hash as stored alongside the user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    /// Wrap a hash loaded from storage.
    #[must_use]
    pub fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    /// Constant-work verification of a candidate password.
    ///
    /// Returns `false` both for wrong passwords and for hashes that fail to
    /// parse, so callers see a uniform rejection.
    #[must_use]
    pub fn verify(&self, candidate: &Password) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.0.as_bytes(), &parsed)
            .is_ok()
    }
}

impl AsRef<str> for PasswordHashString {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub role: Role,
    pub password: Password,
}

impl Registration {
    /// Validate raw request fields into a [`Registration`].
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        password: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            display_name: DisplayName::new(display_name)?,
            role,
            password: Password::new(password)?,
        })
    }
}

/// Validated login payload.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: EmailAddress,
    pub password: Password,
}

impl LoginCredentials {
    /// Validate raw request fields into [`LoginCredentials`].
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }
}
