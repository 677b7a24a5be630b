//! Availability API handler: lawyers replace their declared slots.

use actix_web::{put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AvailabilitySlotPayload, ReplaceAvailabilityRequest};
use crate::domain::Error;
use crate::inbound::http::auth_context::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Body for `PUT /api/v1/availability`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAvailabilityBody {
    pub slots: Vec<AvailabilitySlotPayload>,
}

/// Replace the caller's availability slots wholesale.
#[utoipa::path(
    put,
    path = "/api/v1/availability",
    request_body = ReplaceAvailabilityBody,
    responses(
        (status = 204, description = "Availability replaced"),
        (status = 400, description = "Invalid slot", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Lawyer account required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "replaceAvailability"
)]
#[put("/availability")]
pub async fn replace_availability(
    state: web::Data<HttpState>,
    context: AuthContext,
    payload: web::Json<ReplaceAvailabilityBody>,
) -> ApiResult<HttpResponse> {
    context.require_lawyer()?;
    state
        .appointment_command
        .replace_availability(ReplaceAvailabilityRequest {
            lawyer_id: context.user_id,
            slots: payload.into_inner().slots,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
