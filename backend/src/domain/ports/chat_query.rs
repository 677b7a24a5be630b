//! Driving port for reading mirrored conversation history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::UserId;
use crate::domain::Error;

use super::chat_command::MessagePayload;

/// Request for history between the actor and one peer.
#[derive(Debug, Clone)]
pub struct MessageHistoryRequest {
    pub actor: UserId,
    pub peer: UserId,
    /// Opaque cursor from a previous page, if any.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// One page of messages, newest first, plus the cursor for older history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub items: Vec<MessagePayload>,
    pub next_cursor: Option<String>,
}

/// Driving port for chat reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatQuery: Send + Sync {
    /// Mirror-backed history between the actor and the peer.
    async fn history(&self, request: MessageHistoryRequest) -> Result<MessagePage, Error>;
}

/// Fixture query implementation for tests that do not need history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatQuery;

#[async_trait]
impl ChatQuery for FixtureChatQuery {
    async fn history(&self, _request: MessageHistoryRequest) -> Result<MessagePage, Error> {
        Ok(MessagePage {
            items: Vec::new(),
            next_cursor: None,
        })
    }
}
