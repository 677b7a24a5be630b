//! Chat service: mirror-first message delivery and history reads.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Cursor, Page, PageLimits};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::message::{ChatMessage, MessageBody};
use crate::domain::ports::{
    ChatCommand, ChatProvider, ChatQuery, MessageCursorKey, MessageHistoryRequest, MessagePage,
    MessagePayload, MessageRepository, MessageRepositoryError, SendMessageRequest,
};
use crate::domain::Error;

/// Page size bounds for history listings.
const MESSAGE_PAGE_LIMITS: PageLimits = PageLimits {
    default: 50,
    max: 200,
};

/// Wire form of the history cursor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageCursor {
    sent_at: DateTime<Utc>,
    id: Uuid,
}

/// [`ChatCommand`] and [`ChatQuery`] over the local mirror and the
/// conversations provider.
pub struct ChatService<M, P> {
    messages: Arc<M>,
    provider: Arc<P>,
}

impl<M, P> ChatService<M, P> {
    pub fn new(messages: Arc<M>, provider: Arc<P>) -> Self {
        Self { messages, provider }
    }
}

fn map_mirror_error(error: MessageRepositoryError) -> Error {
    Error::internal(error.to_string())
}

impl<M, P> ChatService<M, P>
where
    M: MessageRepository,
    P: ChatProvider,
{
    /// Validate and mirror the message; the mirror write is the commit point.
    async fn mirror(&self, request: SendMessageRequest) -> Result<ChatMessage, Error> {
        if request.sender == request.receiver {
            return Err(Error::invalid_request("cannot message yourself"));
        }
        let body = MessageBody::new(request.body)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender_id: request.sender,
            receiver_id: request.receiver,
            body,
            sent_at: Utc::now(),
        };
        self.messages
            .save(&message)
            .await
            .map_err(map_mirror_error)?;
        Ok(message)
    }
}

#[async_trait]
impl<M, P> ChatCommand for ChatService<M, P>
where
    M: MessageRepository,
    P: ChatProvider,
{
    async fn send_message(&self, request: SendMessageRequest) -> Result<MessagePayload, Error> {
        let message = self.mirror(request).await?;
        self.provider.forward(&message).await.map_err(|err| {
            Error::service_unavailable(format!("conversations provider failed: {err}"))
        })?;
        Ok(message.into())
    }

    async fn mirror_message(&self, request: SendMessageRequest) -> Result<MessagePayload, Error> {
        let message = self.mirror(request).await?;
        if let Err(error) = self.provider.forward(&message).await {
            tracing::warn!(message_id = %message.id, %error, "provider forward failed");
        }
        Ok(message.into())
    }
}

#[async_trait]
impl<M, P> ChatQuery for ChatService<M, P>
where
    M: MessageRepository,
    P: ChatProvider,
{
    async fn history(&self, request: MessageHistoryRequest) -> Result<MessagePage, Error> {
        let before = match request.cursor.as_deref() {
            Some(token) => {
                let cursor: MessageCursor = Cursor::decode(token)
                    .map_err(|_| Error::invalid_request("malformed cursor"))?;
                Some(MessageCursorKey {
                    sent_at: cursor.sent_at,
                    id: cursor.id,
                })
            }
            None => None,
        };
        let limit = MESSAGE_PAGE_LIMITS.resolve(request.limit);
        let rows = self
            .messages
            .list_between(
                &request.actor,
                &request.peer,
                before,
                i64::from(limit) + 1,
            )
            .await
            .map_err(map_mirror_error)?;
        let page = Page::from_overfetch(rows, limit, |message: &ChatMessage| MessageCursor {
            sent_at: message.sent_at,
            id: message.id,
        })
        .map_err(|err| Error::internal(err.to_string()))?;
        Ok(MessagePage {
            items: page.items.into_iter().map(Into::into).collect(),
            next_cursor: page.next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::sync::Mutex;

    use rstest::rstest;

    use crate::domain::error::ErrorCode;
    use crate::domain::ports::ChatProviderError;
    use crate::domain::user::UserId;

    use super::*;

    /// In-memory mirror keeping messages in insertion order.
    #[derive(Default)]
    struct StubMessageRepository {
        messages: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl MessageRepository for StubMessageRepository {
        async fn save(&self, message: &ChatMessage) -> Result<(), MessageRepositoryError> {
            self.messages.lock().expect("lock").push(message.clone());
            Ok(())
        }

        async fn list_between(
            &self,
            a: &UserId,
            b: &UserId,
            before: Option<MessageCursorKey>,
            limit: i64,
        ) -> Result<Vec<ChatMessage>, MessageRepositoryError> {
            let mut messages: Vec<ChatMessage> = self
                .messages
                .lock()
                .expect("lock")
                .iter()
                .filter(|message| {
                    (&message.sender_id == a && &message.receiver_id == b)
                        || (&message.sender_id == b && &message.receiver_id == a)
                })
                .cloned()
                .collect();
            messages.sort_by(|x, y| (y.sent_at, y.id).cmp(&(x.sent_at, x.id)));
            if let Some(key) = before {
                messages.retain(|message| (message.sent_at, message.id) < (key.sent_at, key.id));
            }
            messages.truncate(limit as usize);
            Ok(messages)
        }
    }

    /// Provider that records forwards and optionally fails them.
    #[derive(Default)]
    struct StubChatProvider {
        forwarded: Mutex<usize>,
        fail: bool,
    }

    #[async_trait]
    impl ChatProvider for StubChatProvider {
        async fn forward(&self, _message: &ChatMessage) -> Result<(), ChatProviderError> {
            *self.forwarded.lock().expect("lock") += 1;
            if self.fail {
                return Err(ChatProviderError::unreachable("connection refused"));
            }
            Ok(())
        }
    }

    fn request(sender: &UserId, receiver: &UserId, body: &str) -> SendMessageRequest {
        SendMessageRequest {
            sender: sender.clone(),
            receiver: receiver.clone(),
            body: body.into(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn send_mirrors_then_forwards() {
        let mirror = Arc::new(StubMessageRepository::default());
        let provider = Arc::new(StubChatProvider::default());
        let service = ChatService::new(Arc::clone(&mirror), Arc::clone(&provider));
        let sender = UserId::random();
        let receiver = UserId::random();

        let sent = service
            .send_message(request(&sender, &receiver, "Can we meet on Thursday?"))
            .await
            .expect("send succeeds");
        assert_eq!(sent.sender_id, sender);
        assert_eq!(mirror.messages.lock().expect("lock").len(), 1);
        assert_eq!(*provider.forwarded.lock().expect("lock"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn provider_failure_fails_a_strict_send_but_keeps_the_mirror() {
        let mirror = Arc::new(StubMessageRepository::default());
        let provider = Arc::new(StubChatProvider {
            fail: true,
            ..StubChatProvider::default()
        });
        let service = ChatService::new(Arc::clone(&mirror), provider);

        let err = service
            .send_message(request(&UserId::random(), &UserId::random(), "hello there"))
            .await
            .expect_err("strict send fails");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(mirror.messages.lock().expect("lock").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn provider_failure_is_swallowed_on_the_best_effort_path() {
        let provider = Arc::new(StubChatProvider {
            fail: true,
            ..StubChatProvider::default()
        });
        let service = ChatService::new(Arc::new(StubMessageRepository::default()), provider);

        service
            .mirror_message(request(&UserId::random(), &UserId::random(), "hello there"))
            .await
            .expect("best-effort send succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn self_messages_are_rejected() {
        let service = ChatService::new(
            Arc::new(StubMessageRepository::default()),
            Arc::new(StubChatProvider::default()),
        );
        let user = UserId::random();
        let err = service
            .send_message(request(&user, &user, "note to self"))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn history_pages_newest_first() {
        let service = ChatService::new(
            Arc::new(StubMessageRepository::default()),
            Arc::new(StubChatProvider::default()),
        );
        let client = UserId::random();
        let lawyer = UserId::random();
        for body in ["first", "second", "third"] {
            service
                .send_message(request(&client, &lawyer, body))
                .await
                .expect("send succeeds");
            // Distinct timestamps keep the keyset ordering unambiguous.
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let first_page = service
            .history(MessageHistoryRequest {
                actor: lawyer.clone(),
                peer: client.clone(),
                cursor: None,
                limit: Some(2),
            })
            .await
            .expect("first page");
        assert_eq!(first_page.items.len(), 2);
        assert_eq!(first_page.items[0].body, "third");
        let cursor = first_page.next_cursor.expect("more history");

        let second_page = service
            .history(MessageHistoryRequest {
                actor: lawyer,
                peer: client,
                cursor: Some(cursor),
                limit: Some(2),
            })
            .await
            .expect("second page");
        assert_eq!(second_page.items.len(), 1);
        assert_eq!(second_page.items[0].body, "first");
        assert!(second_page.next_cursor.is_none());
    }
}
