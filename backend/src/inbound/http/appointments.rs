//! Appointment API handlers: booking, listing, cancellation, rescheduling.

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{
    AppointmentPayload, BookAppointmentRequest, CancelAppointmentRequest,
    ListAppointmentsRequest, RescheduleAppointmentRequest,
};
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::auth_context::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Body for `POST /api/v1/appointments`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
    /// Lawyer to book, as a UUID.
    pub lawyer_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Body for `POST /api/v1/appointments/{id}/reschedule`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Book a slot with a lawyer.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = BookBody,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentPayload),
        (status = 400, description = "Invalid range or outside availability", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Client account required", body = Error),
        (status = 409, description = "Range already booked", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "bookAppointment"
)]
#[post("/appointments")]
pub async fn book(
    state: web::Data<HttpState>,
    context: AuthContext,
    payload: web::Json<BookBody>,
) -> ApiResult<HttpResponse> {
    context.require_client()?;
    let body = payload.into_inner();
    let appointment = state
        .appointment_command
        .book(BookAppointmentRequest {
            client_id: context.user_id,
            lawyer_id: UserId::from_uuid(body.lawyer_id),
            starts_at: body.starts_at,
            ends_at: body.ends_at,
        })
        .await?;
    Ok(HttpResponse::Created().json(appointment))
}

/// The caller's appointments, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    responses(
        (status = 200, description = "Appointments the caller is party to", body = [AppointmentPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "listAppointments"
)]
#[get("/appointments")]
pub async fn list_appointments(
    state: web::Data<HttpState>,
    context: AuthContext,
) -> ApiResult<web::Json<Vec<AppointmentPayload>>> {
    let appointments = state
        .appointment_query
        .list_appointments(ListAppointmentsRequest {
            actor: context.user_id,
        })
        .await?;
    Ok(web::Json(appointments))
}

/// Cancel an appointment the caller is party to.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/cancel",
    params(("id" = Uuid, Path, description = "Appointment identifier")),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a party to the appointment", body = Error),
        (status = 404, description = "Appointment not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "cancelAppointment"
)]
#[post("/appointments/{id}/cancel")]
pub async fn cancel(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let appointment = state
        .appointment_command
        .cancel(CancelAppointmentRequest {
            appointment_id: path.into_inner(),
            actor: context.user_id,
        })
        .await?;
    Ok(web::Json(appointment))
}

/// Move an appointment to a new range.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/reschedule",
    params(("id" = Uuid, Path, description = "Appointment identifier")),
    request_body = RescheduleBody,
    responses(
        (status = 200, description = "Appointment moved", body = AppointmentPayload),
        (status = 400, description = "Invalid range or outside availability", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a party to the appointment", body = Error),
        (status = 404, description = "Appointment not found", body = Error),
        (status = 409, description = "Range already booked", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "rescheduleAppointment"
)]
#[post("/appointments/{id}/reschedule")]
pub async fn reschedule(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<RescheduleBody>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let body = payload.into_inner();
    let appointment = state
        .appointment_command
        .reschedule(RescheduleAppointmentRequest {
            appointment_id: path.into_inner(),
            actor: context.user_id,
            starts_at: body.starts_at,
            ends_at: body.ends_at,
        })
        .await?;
    Ok(web::Json(appointment))
}
