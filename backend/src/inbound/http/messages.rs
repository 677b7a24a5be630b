//! Chat API handlers: send a message and page through mirrored history.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{
    MessageHistoryRequest, MessagePage, MessagePayload, SendMessageRequest,
};
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::auth_context::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Body for `POST /api/v1/messages/{peer}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub body: String,
}

/// Query string for `GET /api/v1/messages/{peer}`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// Send a message to a peer, mirroring it before the provider forward.
#[utoipa::path(
    post,
    path = "/api/v1/messages/{peer}",
    params(("peer" = Uuid, Path, description = "Receiving user")),
    request_body = SendMessageBody,
    responses(
        (status = 201, description = "Message mirrored and forwarded", body = MessagePayload),
        (status = 400, description = "Blank or oversized body", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Chat provider unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/messages/{peer}")]
pub async fn send_message(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<SendMessageBody>,
) -> ApiResult<HttpResponse> {
    let message = state
        .chat_command
        .send_message(SendMessageRequest {
            sender: context.user_id,
            receiver: UserId::from_uuid(path.into_inner()),
            body: payload.into_inner().body,
        })
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// Mirrored history with one peer, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/messages/{peer}",
    params(
        ("peer" = Uuid, Path, description = "The other party"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "One page of messages", body = MessagePage),
        (status = 400, description = "Malformed cursor", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["messages"],
    operation_id = "messageHistory"
)]
#[get("/messages/{peer}")]
pub async fn history(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<MessagePage>> {
    let query = query.into_inner();
    let page = state
        .chat_query
        .history(MessageHistoryRequest {
            actor: context.user_id,
            peer: UserId::from_uuid(path.into_inner()),
            cursor: query.cursor,
            limit: query.limit,
        })
        .await?;
    Ok(web::Json(page))
}
