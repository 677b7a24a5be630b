//! Case lifecycle: the status machine, the case aggregate, and documents.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::lawyer::Specialty;
use crate::domain::user::UserId;

/// Case lifecycle states.
///
/// `Approved`, `Rejected`, and `Closed` drain into `Closed`; `Closed` is
/// terminal. Every transition goes through [`CaseStatus::can_transition`] and
/// is applied with a compare-and-set update, so a request that loses a race
/// observes a conflict rather than clobbering the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Open,
    Review,
    Submitted,
    Approved,
    Rejected,
    Closed,
}

impl CaseStatus {
    /// All states, in lifecycle order. Used by stats reporting.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Open,
        Self::Review,
        Self::Submitted,
        Self::Approved,
        Self::Rejected,
        Self::Closed,
    ];

    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Review => "review",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }

    /// Whether `self → next` is a legal lifecycle transition.
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Open | Self::Closed)
                | (Self::Open, Self::Review | Self::Submitted | Self::Closed)
                | (Self::Review, Self::Open | Self::Submitted | Self::Closed)
                | (Self::Submitted, Self::Approved | Self::Rejected)
                | (Self::Approved | Self::Rejected, Self::Closed)
        )
    }

    /// A terminal case no longer counts towards a lawyer's active load.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCaseStatus(pub String);

impl fmt::Display for UnknownCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown case status: {}", self.0)
    }
}

impl std::error::Error for UnknownCaseStatus {}

impl FromStr for CaseStatus {
    type Err = UnknownCaseStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "open" => Ok(Self::Open),
            "review" => Ok(Self::Review),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownCaseStatus(other.to_owned())),
        }
    }
}

/// Maximum accepted case title length.
pub const CASE_TITLE_MAX: usize = 160;
/// Maximum accepted case description length.
pub const CASE_DESCRIPTION_MAX: usize = 8_000;

/// Errors raised while validating case fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaseValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {CASE_TITLE_MAX} characters")]
    TitleTooLong,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("description must be at most {CASE_DESCRIPTION_MAX} characters")]
    DescriptionTooLong,
}

/// Validated case title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseTitle(String);

impl CaseTitle {
    pub fn new(raw: impl Into<String>) -> Result<Self, CaseValidationError> {
        let raw = raw.into().trim().to_owned();
        if raw.is_empty() {
            return Err(CaseValidationError::EmptyTitle);
        }
        if raw.chars().count() > CASE_TITLE_MAX {
            return Err(CaseValidationError::TitleTooLong);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for CaseTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CaseTitle> for String {
    fn from(value: CaseTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for CaseTitle {
    type Error = CaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated case description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseDescription(String);

impl CaseDescription {
    pub fn new(raw: impl Into<String>) -> Result<Self, CaseValidationError> {
        let raw = raw.into().trim().to_owned();
        if raw.is_empty() {
            return Err(CaseValidationError::EmptyDescription);
        }
        if raw.chars().count() > CASE_DESCRIPTION_MAX {
            return Err(CaseValidationError::DescriptionTooLong);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for CaseDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CaseDescription> for String {
    fn from(value: CaseDescription) -> Self {
        value.0
    }
}

impl TryFrom<String> for CaseDescription {
    type Error = CaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A client-submitted case tracked through the status lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub id: Uuid,
    pub client_id: UserId,
    pub lawyer_id: Option<UserId>,
    pub title: CaseTitle,
    pub description: CaseDescription,
    pub specialty: Specialty,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Whether `user` may read this case.
    #[must_use]
    pub fn is_party(&self, user: &UserId) -> bool {
        &self.client_id == user || self.lawyer_id.as_ref() == Some(user)
    }
}

/// Maximum accepted document size after base64 decoding.
pub const DOCUMENT_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Maximum accepted document file name length.
pub const DOCUMENT_NAME_MAX: usize = 255;

/// Errors raised while validating an uploaded document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentValidationError {
    #[error("file name must not be empty")]
    EmptyFileName,
    #[error("file name must be at most {DOCUMENT_NAME_MAX} characters")]
    FileNameTooLong,
    #[error("content type must not be empty")]
    EmptyContentType,
    #[error("document must not be empty")]
    EmptyContent,
    #[error("document exceeds {DOCUMENT_MAX_BYTES} bytes")]
    TooLarge,
}

/// A document attached to a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDocument {
    pub id: Uuid,
    pub case_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

/// Validated upload fields, prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Result<Self, DocumentValidationError> {
        let file_name = file_name.into().trim().to_owned();
        if file_name.is_empty() {
            return Err(DocumentValidationError::EmptyFileName);
        }
        if file_name.chars().count() > DOCUMENT_NAME_MAX {
            return Err(DocumentValidationError::FileNameTooLong);
        }
        let content_type = content_type.into().trim().to_owned();
        if content_type.is_empty() {
            return Err(DocumentValidationError::EmptyContentType);
        }
        if content.is_empty() {
            return Err(DocumentValidationError::EmptyContent);
        }
        if content.len() > DOCUMENT_MAX_BYTES {
            return Err(DocumentValidationError::TooLarge);
        }
        Ok(Self {
            file_name,
            content_type,
            content,
        })
    }
}

/// Per-status case counts, as reported by the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    pub pending: i64,
    pub open: i64,
    pub review: i64,
    pub submitted: i64,
    pub approved: i64,
    pub rejected: i64,
    pub closed: i64,
}

impl CaseStats {
    /// Accumulate one `(status, count)` pair.
    pub fn record(&mut self, status: CaseStatus, count: i64) {
        match status {
            CaseStatus::Pending => self.pending += count,
            CaseStatus::Open => self.open += count,
            CaseStatus::Review => self.review += count,
            CaseStatus::Submitted => self.submitted += count,
            CaseStatus::Approved => self.approved += count,
            CaseStatus::Rejected => self.rejected += count,
            CaseStatus::Closed => self.closed += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(CaseStatus::Pending, CaseStatus::Open, true)]
    #[case(CaseStatus::Pending, CaseStatus::Closed, true)]
    #[case(CaseStatus::Pending, CaseStatus::Submitted, false)]
    #[case(CaseStatus::Open, CaseStatus::Submitted, true)]
    #[case(CaseStatus::Open, CaseStatus::Review, true)]
    #[case(CaseStatus::Review, CaseStatus::Open, true)]
    #[case(CaseStatus::Review, CaseStatus::Approved, false)]
    #[case(CaseStatus::Submitted, CaseStatus::Approved, true)]
    #[case(CaseStatus::Submitted, CaseStatus::Rejected, true)]
    #[case(CaseStatus::Submitted, CaseStatus::Closed, false)]
    #[case(CaseStatus::Approved, CaseStatus::Closed, true)]
    #[case(CaseStatus::Rejected, CaseStatus::Closed, true)]
    #[case(CaseStatus::Closed, CaseStatus::Open, false)]
    #[case(CaseStatus::Closed, CaseStatus::Closed, false)]
    fn transition_table(
        #[case] from: CaseStatus,
        #[case] to: CaseStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition(to), allowed, "{from} -> {to}");
    }

    #[rstest]
    fn terminal_states_do_not_count_as_active_load() {
        for status in CaseStatus::ALL {
            let expected = matches!(
                status,
                CaseStatus::Approved | CaseStatus::Rejected | CaseStatus::Closed
            );
            assert_eq!(status.is_terminal(), expected, "{status}");
        }
    }

    #[rstest]
    fn title_and_description_enforce_bounds() {
        assert_eq!(
            CaseTitle::new("  ").expect_err("must fail"),
            CaseValidationError::EmptyTitle
        );
        assert_eq!(
            CaseTitle::new("t".repeat(CASE_TITLE_MAX + 1)).expect_err("must fail"),
            CaseValidationError::TitleTooLong
        );
        assert!(CaseDescription::new("Landlord withheld the deposit.").is_ok());
    }

    #[rstest]
    fn document_upload_enforces_size_cap() {
        let oversized = vec![0u8; DOCUMENT_MAX_BYTES + 1];
        assert_eq!(
            DocumentUpload::new("deed.pdf", "application/pdf", oversized).expect_err("must fail"),
            DocumentValidationError::TooLarge
        );
        assert!(DocumentUpload::new("deed.pdf", "application/pdf", vec![1, 2, 3]).is_ok());
    }

    #[rstest]
    fn stats_accumulate_per_status() {
        let mut stats = CaseStats::default();
        stats.record(CaseStatus::Open, 2);
        stats.record(CaseStatus::Submitted, 1);
        stats.record(CaseStatus::Open, 1);
        assert_eq!(stats.open, 3);
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.closed, 0);
    }
}
