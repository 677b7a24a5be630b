//! Driving port for sending chat messages through the mirror and provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::message::ChatMessage;
use crate::domain::user::UserId;
use crate::domain::Error;

/// Serializable chat message for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub sender_id: UserId,
    #[schema(value_type = String)]
    pub receiver_id: UserId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessagePayload {
    fn from(value: ChatMessage) -> Self {
        Self {
            id: value.id,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            body: value.body.into(),
            sent_at: value.sent_at,
        }
    }
}

/// Request to send one message to a peer.
#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub sender: UserId,
    pub receiver: UserId,
    pub body: String,
}

/// Driving port for chat writes.
///
/// Both operations mirror the message locally first. `send_message` then
/// awaits the provider and fails when it does; `mirror_message` treats the
/// provider as best-effort and only logs its failures, which is what the
/// live WebSocket path wants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCommand: Send + Sync {
    /// Mirror, then forward; provider failure is the caller's failure.
    async fn send_message(&self, request: SendMessageRequest) -> Result<MessagePayload, Error>;

    /// Mirror, then forward best-effort; only mirror failures propagate.
    async fn mirror_message(&self, request: SendMessageRequest) -> Result<MessagePayload, Error>;
}

/// Fixture command implementation for tests that do not need chat.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatCommand;

impl FixtureChatCommand {
    fn echo(request: SendMessageRequest) -> MessagePayload {
        MessagePayload {
            id: Uuid::new_v4(),
            sender_id: request.sender,
            receiver_id: request.receiver,
            body: request.body,
            sent_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ChatCommand for FixtureChatCommand {
    async fn send_message(&self, request: SendMessageRequest) -> Result<MessagePayload, Error> {
        Ok(Self::echo(request))
    }

    async fn mirror_message(&self, request: SendMessageRequest) -> Result<MessagePayload, Error> {
        Ok(Self::echo(request))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_send_echoes_the_body() {
        let command = FixtureChatCommand;
        let sent = command
            .send_message(SendMessageRequest {
                sender: UserId::random(),
                receiver: UserId::random(),
                body: "Can we meet on Thursday?".into(),
            })
            .await
            .expect("fixture send succeeds");
        assert_eq!(sent.body, "Can we meet on Thursday?");
    }
}
