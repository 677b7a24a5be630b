//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer
//! - **Schemas**: Request bodies, response payloads, and the error envelope
//! - **Security**: The access-token cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::appointment::{AppointmentStatus, TimeRange};
use crate::domain::assignment::AssignmentStrategy;
use crate::domain::case::{CaseStats, CaseStatus};
use crate::domain::lawyer::Specialty;
use crate::domain::ports::{
    AppointmentPayload, AvailabilitySlotPayload, CasePage, CasePayload, DocumentMetaPayload,
    LawyerPayload, MessagePage, MessagePayload, RangePayload, UserPayload, WeekdayName,
};
use crate::domain::user::Role;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::appointments::{BookBody, RescheduleBody};
use crate::inbound::http::auth::{LoginBody, RegisterBody};
use crate::inbound::http::availability::ReplaceAvailabilityBody;
use crate::inbound::http::cases::{AssignBody, AttachDocumentBody, CreateCaseBody};
use crate::inbound::http::messages::SendMessageBody;

/// Enrich the generated document with the access cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessTokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "accessToken",
                "Short-lived JWT cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "JusticeConnect backend API",
        description = "HTTP interface for case intake, lawyer assignment, \
                       appointment scheduling, mirrored chat, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessTokenCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::refresh,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::cases::create_case,
        crate::inbound::http::cases::list_cases,
        crate::inbound::http::cases::case_stats,
        crate::inbound::http::cases::attach_document,
        crate::inbound::http::cases::list_documents,
        crate::inbound::http::cases::assign_lawyer,
        crate::inbound::http::cases::submit,
        crate::inbound::http::cases::approve,
        crate::inbound::http::cases::reject,
        crate::inbound::http::cases::close,
        crate::inbound::http::cases::get_case,
        crate::inbound::http::appointments::book,
        crate::inbound::http::appointments::list_appointments,
        crate::inbound::http::appointments::cancel,
        crate::inbound::http::appointments::reschedule,
        crate::inbound::http::availability::replace_availability,
        crate::inbound::http::lawyers::list_lawyers,
        crate::inbound::http::lawyers::busy,
        crate::inbound::http::lawyers::slots,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::messages::history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        Specialty,
        CaseStatus,
        CaseStats,
        AppointmentStatus,
        AssignmentStrategy,
        TimeRange,
        UserPayload,
        CasePayload,
        CasePage,
        DocumentMetaPayload,
        AppointmentPayload,
        AvailabilitySlotPayload,
        WeekdayName,
        RangePayload,
        LawyerPayload,
        MessagePayload,
        MessagePage,
        RegisterBody,
        LoginBody,
        CreateCaseBody,
        AssignBody,
        AttachDocumentBody,
        BookBody,
        RescheduleBody,
        ReplaceAvailabilityBody,
        SendMessageBody,
    )),
    tags(
        (name = "auth", description = "Registration, login, and token refresh"),
        (name = "cases", description = "Case intake, lifecycle, and documents"),
        (name = "appointments", description = "Appointment booking and calendars"),
        (name = "lawyers", description = "Lawyer directory and availability"),
        (name = "messages", description = "Mirrored chat history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
