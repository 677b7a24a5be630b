//! Case API handlers: creation, documents, assignment, lifecycle actions,
//! listings, and stats.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::assignment::AssignmentStrategy;
use crate::domain::case::CaseStats;
use crate::domain::lawyer::Specialty;
use crate::domain::ports::{
    AssignLawyerRequest, AttachDocumentRequest, CaseActionRequest, CasePage, CasePayload,
    CaseStatsRequest, CreateCaseRequest, DocumentMetaPayload, GetCaseRequest, ListCasesRequest,
    ListDocumentsRequest,
};
use crate::domain::Error;
use crate::inbound::http::auth_context::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::decode_base64;
use crate::inbound::http::ApiResult;

/// Body for `POST /api/v1/cases`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseBody {
    pub title: String,
    pub description: String,
    pub specialty: Specialty,
    /// Assignment strategy; defaults to round robin.
    #[serde(default)]
    pub strategy: AssignmentStrategy,
}

/// Body for `POST /api/v1/cases/{id}/assign`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    #[serde(default)]
    pub strategy: AssignmentStrategy,
}

/// Body for `POST /api/v1/cases/{id}/documents`.
///
/// `content` is standard base64; the decoded size is capped server-side.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentBody {
    pub file_name: String,
    pub content_type: String,
    pub content: String,
}

/// Query string for `GET /api/v1/cases`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListCasesQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// Open a case and trigger lawyer assignment.
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    request_body = CreateCaseBody,
    responses(
        (status = 201, description = "Case created", body = CasePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Client account required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "createCase"
)]
#[post("/cases")]
pub async fn create_case(
    state: web::Data<HttpState>,
    context: AuthContext,
    payload: web::Json<CreateCaseBody>,
) -> ApiResult<HttpResponse> {
    context.require_client()?;
    let body = payload.into_inner();
    let case = state
        .case_command
        .create_case(CreateCaseRequest {
            client_id: context.user_id,
            title: body.title,
            description: body.description,
            specialty: body.specialty,
            strategy: body.strategy,
        })
        .await?;
    Ok(HttpResponse::Created().json(case))
}

/// Attach a document to a case the caller is party to.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/documents",
    params(("id" = Uuid, Path, description = "Case identifier")),
    request_body = AttachDocumentBody,
    responses(
        (status = 201, description = "Document stored", body = DocumentMetaPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a party to the case", body = Error),
        (status = 404, description = "Case not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "attachDocument"
)]
#[post("/cases/{id}/documents")]
pub async fn attach_document(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<AttachDocumentBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let content = decode_base64("content", &body.content)?;
    let meta = state
        .case_command
        .attach_document(AttachDocumentRequest {
            case_id: path.into_inner(),
            actor: context.user_id,
            file_name: body.file_name,
            content_type: body.content_type,
            content,
        })
        .await?;
    Ok(HttpResponse::Created().json(meta))
}

/// Document metadata for one case.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/documents",
    params(("id" = Uuid, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Documents, oldest first", body = [DocumentMetaPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a party to the case", body = Error),
        (status = 404, description = "Case not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "listDocuments"
)]
#[get("/cases/{id}/documents")]
pub async fn list_documents(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<DocumentMetaPayload>>> {
    let documents = state
        .case_query
        .list_documents(ListDocumentsRequest {
            case_id: path.into_inner(),
            actor: context.user_id,
        })
        .await?;
    Ok(web::Json(documents))
}

/// Re-run assignment for a case that is still unassigned.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/assign",
    params(("id" = Uuid, Path, description = "Case identifier")),
    request_body = AssignBody,
    responses(
        (status = 200, description = "Assignment attempted", body = CasePayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a party to the case", body = Error),
        (status = 404, description = "Case not found", body = Error),
        (status = 409, description = "Case already assigned", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "assignLawyer"
)]
#[post("/cases/{id}/assign")]
pub async fn assign_lawyer(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<AssignBody>,
) -> ApiResult<web::Json<CasePayload>> {
    let case = state
        .case_command
        .assign_lawyer(AssignLawyerRequest {
            case_id: path.into_inner(),
            actor: context.user_id,
            strategy: payload.into_inner().strategy,
        })
        .await?;
    Ok(web::Json(case))
}

macro_rules! action_handler {
    ($name:ident, $route:literal, $api_path:literal, $op:literal, $doc:literal) => {
        #[doc = $doc]
        #[utoipa::path(
            post,
            path = $api_path,
            params(("id" = Uuid, Path, description = "Case identifier")),
            responses(
                (status = 200, description = "Transition applied", body = CasePayload),
                (status = 401, description = "Unauthorised", body = Error),
                (status = 403, description = "Actor may not perform this action", body = Error),
                (status = 404, description = "Case not found", body = Error),
                (status = 409, description = "Invalid transition from current status", body = Error),
                (status = 500, description = "Internal server error", body = Error)
            ),
            tags = ["cases"],
            operation_id = $op
        )]
        #[post($route)]
        pub async fn $name(
            state: web::Data<HttpState>,
            context: AuthContext,
            path: web::Path<Uuid>,
        ) -> ApiResult<web::Json<CasePayload>> {
            let case = state
                .case_command
                .$name(CaseActionRequest {
                    case_id: path.into_inner(),
                    actor: context.user_id,
                })
                .await?;
            Ok(web::Json(case))
        }
    };
}

action_handler!(
    submit,
    "/cases/{id}/submit",
    "/api/v1/cases/{id}/submit",
    "submitCase",
    "Client submits the case for a decision."
);
action_handler!(
    approve,
    "/cases/{id}/approve",
    "/api/v1/cases/{id}/approve",
    "approveCase",
    "Assigned lawyer approves a submitted case."
);
action_handler!(
    reject,
    "/cases/{id}/reject",
    "/api/v1/cases/{id}/reject",
    "rejectCase",
    "Assigned lawyer rejects a submitted case."
);
action_handler!(
    close,
    "/cases/{id}/close",
    "/api/v1/cases/{id}/close",
    "closeCase",
    "Either party closes the case."
);

/// The caller's cases, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    params(ListCasesQuery),
    responses(
        (status = 200, description = "One page of cases", body = CasePage),
        (status = 400, description = "Malformed cursor", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "listCases"
)]
#[get("/cases")]
pub async fn list_cases(
    state: web::Data<HttpState>,
    context: AuthContext,
    query: web::Query<ListCasesQuery>,
) -> ApiResult<web::Json<CasePage>> {
    let query = query.into_inner();
    let page = state
        .case_query
        .list_cases(ListCasesRequest {
            actor: context.user_id,
            role: context.role,
            cursor: query.cursor,
            limit: query.limit,
        })
        .await?;
    Ok(web::Json(page))
}

/// Per-status counts over the caller's cases.
#[utoipa::path(
    get,
    path = "/api/v1/cases/stats",
    responses(
        (status = 200, description = "Per-status counts", body = CaseStats),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "caseStats"
)]
#[get("/cases/stats")]
pub async fn case_stats(
    state: web::Data<HttpState>,
    context: AuthContext,
) -> ApiResult<web::Json<CaseStats>> {
    let stats = state
        .case_query
        .stats(CaseStatsRequest {
            actor: context.user_id,
            role: context.role,
        })
        .await?;
    Ok(web::Json(stats))
}

/// A single case the caller is party to.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    params(("id" = Uuid, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "The case", body = CasePayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a party to the case", body = Error),
        (status = 404, description = "Case not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cases"],
    operation_id = "getCase"
)]
#[get("/cases/{id}")]
pub async fn get_case(
    state: web::Data<HttpState>,
    context: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CasePayload>> {
    let case = state
        .case_query
        .get_case(GetCaseRequest {
            case_id: path.into_inner(),
            actor: context.user_id,
        })
        .await?;
    Ok(web::Json(case))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::user::{Role, UserId};
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
                            .service(create_case)
                            .service(attach_document)
                            .service(list_documents)
                            .service(assign_lawyer)
                            .service(submit)
                            .service(approve)
                            .service(reject)
                            .service(close)
                            .service(list_cases)
                            .service(case_stats)
                            .service(get_case),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[tokio::test]
    async fn creating_a_case_requires_authentication() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/cases")
            .set_json(json!({
                "title": "Unfair dismissal",
                "description": "Dismissed without notice after raising a safety concern.",
                "specialty": "employment"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn lawyers_may_not_open_cases() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/cases")
            .cookie(access_cookie(&signer(), Role::Lawyer))
            .set_json(json!({
                "title": "Unfair dismissal",
                "description": "Dismissed without notice after raising a safety concern.",
                "specialty": "employment"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[tokio::test]
    async fn a_client_can_open_a_case() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/cases")
            .cookie(access_cookie(&signer(), Role::Client))
            .set_json(json!({
                "title": "Unfair dismissal",
                "description": "Dismissed without notice after raising a safety concern.",
                "specialty": "employment",
                "strategy": "leastLoaded"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[tokio::test]
    async fn document_upload_rejects_malformed_base64() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/v1/cases/{}/documents", Uuid::new_v4()))
            .cookie(access_cookie(&signer(), Role::Client))
            .set_json(json!({
                "fileName": "contract.pdf",
                "contentType": "application/pdf",
                "content": "not base64!!!"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_cases_returns_an_empty_page_from_the_fixture() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/cases?limit=10")
            .cookie(access_cookie(&signer(), Role::Client))
            .to_request();
        let page: CasePage = actix_test::call_and_read_body_json(&app, req).await;
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn stats_route_is_not_shadowed_by_the_case_id_route() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/cases/stats")
            .cookie(access_cookie(&signer(), Role::Client))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[rstest]
    #[case::submit("submit")]
    #[case::approve("approve")]
    #[case::reject("reject")]
    #[case::close("close")]
    #[tokio::test]
    async fn lifecycle_actions_on_a_missing_case_are_not_found(#[case] action: &str) {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/v1/cases/{}/{action}", Uuid::new_v4()))
            .cookie(access_cookie(&signer(), Role::Client))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
