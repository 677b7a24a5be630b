//! Lawyer directory entities: practice specialties and profiles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::{DisplayName, UserId};

/// Practice areas a lawyer may register under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Family,
    Criminal,
    Corporate,
    Immigration,
    Property,
    Employment,
}

impl Specialty {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::Criminal => "criminal",
            Self::Corporate => "corporate",
            Self::Immigration => "immigration",
            Self::Property => "property",
            Self::Employment => "employment",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpecialty(pub String);

impl fmt::Display for UnknownSpecialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown specialty: {}", self.0)
    }
}

impl std::error::Error for UnknownSpecialty {}

impl FromStr for Specialty {
    type Err = UnknownSpecialty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "family" => Ok(Self::Family),
            "criminal" => Ok(Self::Criminal),
            "corporate" => Ok(Self::Corporate),
            "immigration" => Ok(Self::Immigration),
            "property" => Ok(Self::Property),
            "employment" => Ok(Self::Employment),
            other => Err(UnknownSpecialty(other.to_owned())),
        }
    }
}

/// Maximum accepted licence number length.
pub const LICENCE_NUMBER_MAX: usize = 32;

/// Errors raised when validating a lawyer profile.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LawyerValidationError {
    #[error("licence number must not be empty")]
    EmptyLicenceNumber,
    #[error("licence number must be at most {LICENCE_NUMBER_MAX} characters")]
    LicenceNumberTooLong,
}

/// Bar licence identifier supplied at lawyer registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenceNumber(String);

impl LicenceNumber {
    pub fn new(raw: impl Into<String>) -> Result<Self, LawyerValidationError> {
        let raw = raw.into().trim().to_owned();
        if raw.is_empty() {
            return Err(LawyerValidationError::EmptyLicenceNumber);
        }
        if raw.chars().count() > LICENCE_NUMBER_MAX {
            return Err(LawyerValidationError::LicenceNumberTooLong);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for LicenceNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<LicenceNumber> for String {
    fn from(value: LicenceNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for LicenceNumber {
    type Error = LawyerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A lawyer's directory entry.
///
/// Directory ordering (and therefore round-robin order) is
/// `(created_at, user_id)` ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawyerProfile {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub specialty: Specialty,
    pub licence_number: LicenceNumber,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Directory row enriched with scheduling state for assignment selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawyerCandidate {
    pub user_id: UserId,
    /// Count of cases assigned to this lawyer that are not yet terminal.
    pub active_cases: i64,
    /// When this lawyer most recently received an assignment, if ever.
    pub last_assigned_at: Option<DateTime<Utc>>,
}
