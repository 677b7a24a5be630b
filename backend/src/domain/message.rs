//! Chat messages mirrored from the conversations provider.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Maximum accepted message body length.
pub const MESSAGE_BODY_MAX: usize = 4_000;

/// Errors raised while validating a message body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageValidationError {
    #[error("message body must not be empty")]
    EmptyBody,
    #[error("message body must be at most {MESSAGE_BODY_MAX} characters")]
    BodyTooLong,
}

/// Validated chat message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(raw: impl Into<String>) -> Result<Self, MessageValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MessageValidationError::EmptyBody);
        }
        if raw.chars().count() > MESSAGE_BODY_MAX {
            return Err(MessageValidationError::BodyTooLong);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MessageBody> for String {
    fn from(value: MessageBody) -> Self {
        value.0
    }
}

/// A message between two users, kept in the local mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub body: MessageBody,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    fn body_rejects_blank_input(#[case] raw: &str) {
        assert_eq!(
            MessageBody::new(raw).expect_err("must fail"),
            MessageValidationError::EmptyBody
        );
    }

    #[rstest]
    fn body_enforces_the_length_cap() {
        assert_eq!(
            MessageBody::new("m".repeat(MESSAGE_BODY_MAX + 1)).expect_err("must fail"),
            MessageValidationError::BodyTooLong
        );
        assert!(MessageBody::new("Can we meet on Thursday?").is_ok());
    }
}
