//! Per-connection WebSocket handler.
//!
//! Keeps framing and heartbeats at the edge while deferring chat behaviour
//! to the injected `ChatCommand` port. The connection pings every 5s and is
//! considered idle after 10s without client traffic. Tests shorten these
//! intervals to speed up feedback.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc;
use tokio::time;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::SendMessageRequest;
use crate::domain::user::UserId;
use crate::inbound::ws::messages::{DeliveredFrame, ErrorFrame, SendFrame, SentFrame};
use crate::inbound::ws::state::WsState;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    state: WsState,
    user_id: UserId,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(state, user_id).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    state: WsState,
    user_id: UserId,
}

impl WsSession {
    fn new(state: WsState, user_id: UserId) -> Self {
        Self { state, user_id }
    }

    async fn run(&self, mut session: Session, mut stream: MessageStream) {
        let (relay_tx, mut relay_rx) = mpsc::unbounded_channel::<String>();
        let uuid = *self.user_id.as_uuid();
        self.state.registry.register(uuid, relay_tx.clone());

        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                frame = relay_rx.recv() => {
                    self.handle_relayed_frame(&mut session, frame).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                self.state.registry.deregister(uuid, &relay_tx);
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_relayed_frame(
        &self,
        session: &mut Session,
        frame: Option<String>,
    ) -> Result<(), SessionError> {
        // The registry holds the sender while we hold the receiver, so the
        // channel cannot close before the session does.
        let Some(frame) = frame else {
            return Err(SessionError::StreamClosed);
        };
        session.text(frame).await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    /// Mirror the message, acknowledge to the sender, and relay to the
    /// receiver when connected. A malformed frame or a rejected message is
    /// answered with an error frame; neither tears the connection down.
    async fn handle_text_message(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let frame = match serde_json::from_str::<SendFrame>(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                let response = ErrorFrame::new("malformed_frame", "frame could not be parsed");
                return self
                    .send_json(session, &response)
                    .await
                    .map_err(SessionError::Network);
            }
        };
        let receiver = frame.receiver_id;

        let outcome = self
            .state
            .chat
            .mirror_message(SendMessageRequest {
                sender: self.user_id.clone(),
                receiver: UserId::from_uuid(receiver),
                body: frame.body,
            })
            .await;

        match outcome {
            Ok(message) => {
                let ack = SentFrame::from(&message);
                self.send_json(session, &ack)
                    .await
                    .map_err(SessionError::Network)?;
                self.relay_to_receiver(receiver, &message);
                Ok(())
            }
            Err(error) => {
                let response = ErrorFrame::new(error.code().as_str(), error.message());
                self.send_json(session, &response)
                    .await
                    .map_err(SessionError::Network)
            }
        }
    }

    fn relay_to_receiver(&self, receiver: Uuid, message: &crate::domain::ports::MessagePayload) {
        let frame = DeliveredFrame::from(message);
        match serde_json::to_string(&frame) {
            Ok(body) => {
                // An offline receiver reads the mirror later; nothing to do.
                self.state.registry.relay(receiver, body);
            }
            Err(error) => {
                warn!(error = %error, "Failed to serialize relay payload");
            }
        }
    }

    async fn send_json<T: serde::Serialize>(
        &self,
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                if cfg!(debug_assertions) {
                    panic!("outbound frames must serialize: {error}");
                } else {
                    warn!(error = %error, "Failed to serialize WebSocket payload");
                }
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
