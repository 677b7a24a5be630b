//! Lawyer directory API handlers: listing plus per-lawyer calendar views.

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::lawyer::Specialty;
use crate::domain::ports::{
    CalendarWindowRequest, LawyerPayload, ListLawyersRequest, RangePayload,
};
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::auth_context::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query string for `GET /api/v1/lawyers`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListLawyersQuery {
    pub specialty: Option<Specialty>,
}

/// Query string for the calendar views.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWindowQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Verified lawyers, optionally narrowed to one specialty.
#[utoipa::path(
    get,
    path = "/api/v1/lawyers",
    params(ListLawyersQuery),
    responses(
        (status = 200, description = "Verified lawyers in directory order", body = [LawyerPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lawyers"],
    operation_id = "listLawyers"
)]
#[get("/lawyers")]
pub async fn list_lawyers(
    state: web::Data<HttpState>,
    _context: AuthContext,
    query: web::Query<ListLawyersQuery>,
) -> ApiResult<web::Json<Vec<LawyerPayload>>> {
    let lawyers = state
        .lawyer_query
        .list_lawyers(ListLawyersRequest {
            specialty: query.into_inner().specialty,
        })
        .await?;
    Ok(web::Json(lawyers))
}

/// Booked ranges for one lawyer within a window.
#[utoipa::path(
    get,
    path = "/api/v1/lawyers/{id}/busy",
    params(
        ("id" = Uuid, Path, description = "Lawyer identifier"),
        CalendarWindowQuery
    ),
    responses(
        (status = 200, description = "Booked ranges, soonest first", body = [RangePayload]),
        (status = 400, description = "Window invalid or too wide", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Lawyer not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lawyers"],
    operation_id = "lawyerBusy"
)]
#[get("/lawyers/{id}/busy")]
pub async fn busy(
    state: web::Data<HttpState>,
    _context: AuthContext,
    path: web::Path<Uuid>,
    query: web::Query<CalendarWindowQuery>,
) -> ApiResult<web::Json<Vec<RangePayload>>> {
    let window = query.into_inner();
    let ranges = state
        .appointment_query
        .busy(CalendarWindowRequest {
            lawyer_id: UserId::from_uuid(path.into_inner()),
            from: window.from,
            to: window.to,
        })
        .await?;
    Ok(web::Json(ranges))
}

/// Bookable ranges for one lawyer within a window.
#[utoipa::path(
    get,
    path = "/api/v1/lawyers/{id}/slots",
    params(
        ("id" = Uuid, Path, description = "Lawyer identifier"),
        CalendarWindowQuery
    ),
    responses(
        (status = 200, description = "Free ranges inside declared availability", body = [RangePayload]),
        (status = 400, description = "Window invalid or too wide", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Lawyer not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lawyers"],
    operation_id = "lawyerSlots"
)]
#[get("/lawyers/{id}/slots")]
pub async fn slots(
    state: web::Data<HttpState>,
    _context: AuthContext,
    path: web::Path<Uuid>,
    query: web::Query<CalendarWindowQuery>,
) -> ApiResult<web::Json<Vec<RangePayload>>> {
    let window = query.into_inner();
    let ranges = state
        .appointment_query
        .slots(CalendarWindowRequest {
            lawyer_id: UserId::from_uuid(path.into_inner()),
            from: window.from,
            to: window.to,
        })
        .await?;
    Ok(web::Json(ranges))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use rstest::rstest;

    use super::*;
    use crate::domain::user::Role;
    use crate::inbound::http::tokens::{TokenKind, TokenSigner, ACCESS_COOKIE};

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-material", false)
    }

    fn access_cookie(signer: &TokenSigner, role: Role) -> actix_web::cookie::Cookie<'static> {
        let token = signer
            .issue(&UserId::random(), role, TokenKind::Access)
            .expect("issue succeeds");
        actix_web::cookie::Cookie::new(ACCESS_COOKIE, token)
    }

    macro_rules! test_app {
        () => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(HttpState::fixture()))
                    .app_data(web::Data::new(signer()))
                    .service(
                        web::scope("/api/v1")
                            .service(list_lawyers)
                            .service(busy)
                            .service(slots),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[tokio::test]
    async fn the_directory_requires_authentication() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/lawyers")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn the_directory_accepts_a_specialty_filter() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/lawyers?specialty=family")
            .cookie(access_cookie(&signer(), Role::Client))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[rstest]
    #[tokio::test]
    async fn calendar_views_require_an_explicit_window() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/lawyers/{}/slots", Uuid::new_v4()))
            .cookie(access_cookie(&signer(), Role::Client))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn busy_returns_ranges_within_the_window() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri(&format!(
                "/api/v1/lawyers/{}/busy?from=2026-09-07T00:00:00Z&to=2026-09-14T00:00:00Z",
                Uuid::new_v4()
            ))
            .cookie(access_cookie(&signer(), Role::Client))
            .to_request();
        let ranges: Vec<RangePayload> = actix_test::call_and_read_body_json(&app, req).await;
        assert!(ranges.is_empty());
    }
}
