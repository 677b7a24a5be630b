//! Reqwest-backed conversations provider adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping. The provider never learns message history; the
//! local mirror remains the source of truth.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::message::ChatMessage;
use crate::domain::ports::{ChatProvider, ChatProviderError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire form of a forwarded message, as the provider's ingest API expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForwardMessageDto<'a> {
    message_id: String,
    sender_id: String,
    receiver_id: String,
    body: &'a str,
    sent_at: String,
}

impl<'a> From<&'a ChatMessage> for ForwardMessageDto<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            message_id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            receiver_id: message.receiver_id.to_string(),
            body: message.body.as_ref(),
            sent_at: message.sent_at.to_rfc3339(),
        }
    }
}

/// Conversations provider adapter that POSTs messages to one endpoint.
pub struct HttpChatProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpChatProvider {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        endpoint: Url,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ChatProvider for HttpChatProvider {
    async fn forward(&self, message: &ChatMessage) -> Result<(), ChatProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&ForwardMessageDto::from(message))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> ChatProviderError {
    ChatProviderError::unreachable(error.to_string())
}

fn map_status_error(status: StatusCode) -> ChatProviderError {
    ChatProviderError::rejected(status.as_u16())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network provider mapping helpers.

    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use crate::domain::message::MessageBody;
    use crate::domain::user::UserId;

    use super::*;

    #[rstest]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, 422)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, 503)]
    fn non_success_statuses_map_to_rejected(#[case] status: StatusCode, #[case] code: u16) {
        assert_eq!(
            map_status_error(status),
            ChatProviderError::rejected(code)
        );
    }

    #[rstest]
    fn forwarded_messages_serialise_in_provider_wire_form() {
        let message = ChatMessage {
            id: Uuid::nil(),
            sender_id: UserId::from_uuid(Uuid::nil()),
            receiver_id: UserId::from_uuid(Uuid::nil()),
            body: MessageBody::new("See you Thursday.").expect("valid"),
            sent_at: Utc.with_ymd_and_hms(2026, 9, 7, 10, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(ForwardMessageDto::from(&message))
            .expect("dto serialises");
        assert_eq!(
            value,
            json!({
                "messageId": "00000000-0000-0000-0000-000000000000",
                "senderId": "00000000-0000-0000-0000-000000000000",
                "receiverId": "00000000-0000-0000-0000-000000000000",
                "body": "See you Thursday.",
                "sentAt": "2026-09-07T10:00:00+00:00",
            })
        );
    }
}
