//! Port for the local chat message mirror.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::message::ChatMessage;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "message repository query failed: {message}",
    }
}

/// Keyset position within the `(sent_at desc, id desc)` message ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursorKey {
    pub sent_at: DateTime<Utc>,
    pub id: Uuid,
}

/// Port for writing and reading the mirrored conversation history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message in the local mirror.
    async fn save(&self, message: &ChatMessage) -> Result<(), MessageRepositoryError>;

    /// Page through messages exchanged between two users, newest first.
    async fn list_between(
        &self,
        a: &UserId,
        b: &UserId,
        before: Option<MessageCursorKey>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, MessageRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the mirror.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageRepository;

#[async_trait]
impl MessageRepository for FixtureMessageRepository {
    async fn save(&self, _message: &ChatMessage) -> Result<(), MessageRepositoryError> {
        Ok(())
    }

    async fn list_between(
        &self,
        _a: &UserId,
        _b: &UserId,
        _before: Option<MessageCursorKey>,
        _limit: i64,
    ) -> Result<Vec<ChatMessage>, MessageRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::message::MessageBody;

    #[rstest]
    #[tokio::test]
    async fn fixture_mirror_accepts_and_forgets() {
        let repo = FixtureMessageRepository;
        let sender = UserId::random();
        let receiver = UserId::random();
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            body: MessageBody::new("Can we meet on Thursday?").expect("valid body"),
            sent_at: Utc::now(),
        };
        repo.save(&message).await.expect("fixture save succeeds");
        assert!(
            repo.list_between(&sender, &receiver, None, 20)
                .await
                .expect("fixture list succeeds")
                .is_empty()
        );
    }
}
