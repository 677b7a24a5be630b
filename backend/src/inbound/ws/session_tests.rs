//! WebSocket session handler tests.

use std::sync::Arc;

use actix_web::{dev::Server, dev::ServerHandle, http::header, App, HttpServer};
use awc::{ws::Codec, ws::Frame, ws::Message, BoxedSocket};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::ports::FixtureChatCommand;
use crate::domain::user::{Role, UserId};
use crate::inbound::http::tokens::{TokenKind, TokenSigner, ACCESS_COOKIE};
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::inbound::ws::OriginPolicy;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

fn signer() -> TokenSigner {
    TokenSigner::new(b"test-secret-material", false)
}

#[fixture]
async fn start_ws_server() -> (String, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let ws_state = WsState::new(Arc::new(FixtureChatCommand));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .app_data(actix_web::web::Data::new(OriginPolicy::new(
                "justiceconnect.example",
            )))
            .app_data(actix_web::web::Data::new(signer()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, server)
}

async fn connect(url: &str, user_id: &UserId) -> Socket {
    let token = signer()
        .issue(user_id, Role::Client, TokenKind::Access)
        .expect("issue succeeds");
    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .cookie(actix_web::cookie::Cookie::new(ACCESS_COOKIE, token))
        .connect()
        .await
        .expect("websocket connect");
    socket
}

#[fixture]
async fn ws_client(#[future] start_ws_server: (String, Server)) -> (Socket, ServerHandle) {
    let (url, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (connect(&url, &UserId::random()).await, handle)
}

fn send_payload(receiver: Uuid, body: &str) -> String {
    serde_json::json!({
        "receiverId": receiver,
        "body": body
    })
    .to_string()
}

async fn next_text_frame(socket: &mut Socket) -> Vec<u8> {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return bytes.to_vec(),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn acknowledges_a_mirrored_message(#[future] ws_client: (Socket, ServerHandle)) {
    let (mut socket, _server) = ws_client.await;
    socket
        .send(Message::Text(
            send_payload(Uuid::new_v4(), "Could we meet Thursday?").into(),
        ))
        .await
        .expect("send text");

    let text = next_text_frame(&mut socket).await;
    let value: Value = serde_json::from_slice(&text).expect("json");
    assert_eq!(value.get("kind").and_then(Value::as_str), Some("sent"));
    assert_eq!(
        value.get("body").and_then(Value::as_str),
        Some("Could we meet Thursday?")
    );
}

#[rstest]
#[actix_rt::test]
async fn relays_to_a_connected_peer(#[future] start_ws_server: (String, Server)) {
    let (url, server) = start_ws_server.await;
    let _handle = server.handle();
    actix_web::rt::spawn(server);

    let sender_id = UserId::random();
    let receiver_id = UserId::random();
    let mut sender = connect(&url, &sender_id).await;
    let mut receiver = connect(&url, &receiver_id).await;

    sender
        .send(Message::Text(
            send_payload(*receiver_id.as_uuid(), "Hello from the other side").into(),
        ))
        .await
        .expect("send text");

    let text = next_text_frame(&mut receiver).await;
    let value: Value = serde_json::from_slice(&text).expect("json");
    assert_eq!(value.get("kind").and_then(Value::as_str), Some("message"));
    assert_eq!(
        value.get("senderId").and_then(Value::as_str),
        Some(sender_id.to_string().as_str())
    );
    assert_eq!(
        value.get("body").and_then(Value::as_str),
        Some("Hello from the other side")
    );
}

#[rstest]
#[actix_rt::test]
async fn answers_malformed_json_without_closing(#[future] ws_client: (Socket, ServerHandle)) {
    let (mut socket, _server) = ws_client.await;
    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    let text = next_text_frame(&mut socket).await;
    let value: Value = serde_json::from_slice(&text).expect("json");
    assert_eq!(value.get("kind").and_then(Value::as_str), Some("error"));
    assert_eq!(
        value.get("code").and_then(Value::as_str),
        Some("malformed_frame")
    );

    // The connection is still usable afterwards.
    socket
        .send(Message::Text(send_payload(Uuid::new_v4(), "still here").into()))
        .await
        .expect("send text");
    let text = next_text_frame(&mut socket).await;
    let value: Value = serde_json::from_slice(&text).expect("json");
    assert_eq!(value.get("kind").and_then(Value::as_str), Some("sent"));
}

#[rstest]
#[actix_rt::test]
async fn rejects_an_upgrade_without_an_access_cookie(
    #[future] start_ws_server: (String, Server),
) {
    let (url, server) = start_ws_server.await;
    let _handle = server.handle();
    actix_web::rt::spawn(server);

    let result = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .connect()
        .await;
    assert!(result.is_err(), "upgrade without auth must fail");
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] ws_client: (Socket, ServerHandle),
) {
    let (mut socket, _server) = ws_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    use std::time::Duration;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            let frame = frame.expect("frame");
            match frame {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
