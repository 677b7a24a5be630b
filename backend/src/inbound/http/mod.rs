//! HTTP inbound adapter exposing REST endpoints.

pub mod appointments;
pub mod auth;
pub mod auth_context;
pub mod availability;
pub mod cases;
pub mod error;
pub mod health;
pub mod lawyers;
pub mod messages;
pub mod state;
pub mod tokens;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` endpoint on the given scope config.
///
/// `cases::case_stats` must precede `cases::get_case` so the literal
/// `stats` segment is not swallowed by the `{id}` matcher.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::refresh)
        .service(auth::logout)
        .service(auth::me)
        .service(cases::create_case)
        .service(cases::list_cases)
        .service(cases::case_stats)
        .service(cases::attach_document)
        .service(cases::list_documents)
        .service(cases::assign_lawyer)
        .service(cases::submit)
        .service(cases::approve)
        .service(cases::reject)
        .service(cases::close)
        .service(cases::get_case)
        .service(appointments::book)
        .service(appointments::list_appointments)
        .service(appointments::cancel)
        .service(appointments::reschedule)
        .service(availability::replace_availability)
        .service(lawyers::list_lawyers)
        .service(lawyers::busy)
        .service(lawyers::slots)
        .service(messages::send_message)
        .service(messages::history);
}
