//! Wire-level message definitions for the chat WebSocket adapter.
//!
//! Mirrored messages are transformed into these payloads before being
//! serialized to JSON and sent to connected clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::MessagePayload;

/// Inbound frame sent by a connected client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFrame {
    /// Receiving user, as a UUID.
    #[serde(alias = "receiver_id")]
    pub receiver_id: Uuid,
    /// Message body.
    pub body: String,
}

/// Outbound frame confirming the sender's message was mirrored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentFrame {
    pub kind: &'static str,
    pub id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub sent_at: String,
}

impl From<&MessagePayload> for SentFrame {
    fn from(value: &MessagePayload) -> Self {
        Self {
            kind: "sent",
            id: value.id,
            receiver_id: *value.receiver_id.as_uuid(),
            body: value.body.clone(),
            sent_at: value.sent_at.to_rfc3339(),
        }
    }
}

/// Outbound frame delivering a peer's message to this connection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredFrame {
    pub kind: &'static str,
    pub id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub sent_at: String,
}

impl From<&MessagePayload> for DeliveredFrame {
    fn from(value: &MessagePayload) -> Self {
        Self {
            kind: "message",
            id: value.id,
            sender_id: *value.sender_id.as_uuid(),
            body: value.body.clone(),
            sent_at: value.sent_at.to_rfc3339(),
        }
    }
}

/// Outbound frame describing a rejected inbound frame.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFrame {
    pub kind: &'static str,
    pub code: String,
    pub error: String,
}

impl ErrorFrame {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            kind: "error",
            code: code.into(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::user::UserId;

    fn payload() -> MessagePayload {
        MessagePayload {
            id: Uuid::nil(),
            sender_id: UserId::from_uuid(Uuid::nil()),
            receiver_id: UserId::from_uuid(Uuid::nil()),
            body: "Could we meet Thursday?".into(),
            sent_at: Utc.with_ymd_and_hms(2026, 9, 7, 10, 0, 0).single().expect("valid"),
        }
    }

    #[rstest]
    fn serialises_a_sent_acknowledgement() {
        let frame = serde_json::to_value(SentFrame::from(&payload())).expect("serialises");
        assert_eq!(
            frame,
            json!({
                "kind": "sent",
                "id": "00000000-0000-0000-0000-000000000000",
                "receiverId": "00000000-0000-0000-0000-000000000000",
                "body": "Could we meet Thursday?",
                "sentAt": "2026-09-07T10:00:00+00:00"
            })
        );
    }

    #[rstest]
    fn serialises_a_delivered_message() {
        let frame = serde_json::to_value(DeliveredFrame::from(&payload())).expect("serialises");
        assert_eq!(frame["kind"], "message");
        assert_eq!(frame["senderId"], "00000000-0000-0000-0000-000000000000");
    }

    #[rstest]
    fn parses_a_send_frame_with_either_field_casing() {
        let camel: SendFrame =
            serde_json::from_str(r#"{"receiverId":"3fa85f64-5717-4562-b3fc-2c963f66afa6","body":"hi"}"#)
                .expect("camelCase parses");
        let snake: SendFrame =
            serde_json::from_str(r#"{"receiver_id":"3fa85f64-5717-4562-b3fc-2c963f66afa6","body":"hi"}"#)
                .expect("snake_case parses");
        assert_eq!(camel.receiver_id, snake.receiver_id);
    }
}
