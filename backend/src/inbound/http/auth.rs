//! Auth API handlers: register, login, refresh, logout, me.

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::lawyer::Specialty;
use crate::domain::ports::{AuthenticateRequest, RegisterProfile, RegisterRequest, UserPayload};
use crate::domain::user::Role;
use crate::domain::Error;
use crate::inbound::http::auth_context::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tokens::{TokenKind, TokenSigner, REFRESH_COOKIE};
use crate::inbound::http::ApiResult;

/// Registration body for `POST /api/v1/auth/register`.
///
/// Lawyer accounts must carry `specialty` and `licenceNumber`; client
/// accounts may carry a phone number.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence_number: Option<String>,
}

impl TryFrom<RegisterBody> for RegisterRequest {
    type Error = Error;

    fn try_from(value: RegisterBody) -> Result<Self, Self::Error> {
        let profile = match value.role {
            Role::Client => RegisterProfile::Client { phone: value.phone },
            Role::Lawyer => {
                let specialty = value
                    .specialty
                    .ok_or_else(|| Error::invalid_request("specialty is required for lawyers"))?;
                let licence_number = value.licence_number.ok_or_else(|| {
                    Error::invalid_request("licenceNumber is required for lawyers")
                })?;
                RegisterProfile::Lawyer {
                    specialty,
                    licence_number,
                }
            }
        };
        Ok(Self {
            email: value.email,
            display_name: value.display_name,
            password: value.password,
            profile,
        })
    }
}

/// Login body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Create a client or lawyer account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = UserPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let request = RegisterRequest::try_from(payload.into_inner())?;
    let user = state.identity.register(request).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Verify credentials and set the auth cookie pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = UserPayload,
            headers(("Set-Cookie" = String, description = "accessToken and refreshToken cookies"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    signer: web::Data<TokenSigner>,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let user = state
        .identity
        .authenticate(AuthenticateRequest {
            email: body.email,
            password: body.password,
        })
        .await?;
    let (access, refresh_cookie) = signer.login_cookies(&user.id, user.role)?;
    Ok(HttpResponse::Ok()
        .cookie(access)
        .cookie(refresh_cookie)
        .json(user))
}

/// Rotate the access token from a valid `refreshToken` cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (status = 204, description = "Access token rotated",
            headers(("Set-Cookie" = String, description = "fresh accessToken cookie"))),
        (status = 401, description = "Missing or invalid refresh token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "refresh",
    security([])
)]
#[post("/auth/refresh")]
pub async fn refresh(
    req: HttpRequest,
    signer: web::Data<TokenSigner>,
) -> ApiResult<HttpResponse> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| Error::unauthorized("refresh token required"))?;
    let identity = signer.verify(cookie.value(), TokenKind::Refresh)?;
    let access = signer.refreshed_access_cookie(&identity)?;
    Ok(HttpResponse::NoContent().cookie(access).finish())
}

/// Clear both auth cookies.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Cookies cleared",
            headers(("Set-Cookie" = String, description = "expired auth cookies"))),
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(signer: web::Data<TokenSigner>) -> ApiResult<HttpResponse> {
    let (access, refresh_cookie) = signer.logout_cookies();
    Ok(HttpResponse::NoContent()
        .cookie(access)
        .cookie(refresh_cookie)
        .finish())
}

/// The authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    context: AuthContext,
) -> ApiResult<web::Json<UserPayload>> {
    let user = state.identity.get_user(&context.user_id).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-material", false)
    }

    macro_rules! test_app {
        () => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(HttpState::fixture()))
                    .app_data(web::Data::new(signer()))
                    .service(
                        web::scope("/api/v1")
                            .service(register)
                            .service(login)
                            .service(refresh)
                            .service(logout)
                            .service(me),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[tokio::test]
    async fn register_creates_a_client_account() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "email": "maya@example.com",
                "displayName": "Maya Rodriguez",
                "password": "a sound password",
                "role": "client"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[tokio::test]
    async fn lawyer_registration_without_a_licence_is_rejected() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "email": "asha@example.com",
                "displayName": "Asha Nair",
                "password": "a sound password",
                "role": "lawyer",
                "specialty": "immigration"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn login_with_bad_credentials_is_unauthorised() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({
                "email": "maya@example.com",
                "password": "wrong password"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_requires_the_refresh_cookie() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_rotates_from_a_valid_cookie() {
        use crate::domain::user::UserId;

        let app = test_app!();
        let signer = signer();
        let token = signer
            .issue(&UserId::random(), Role::Client, TokenKind::Refresh)
            .expect("issue succeeds");
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .cookie(actix_web::cookie::Cookie::new(REFRESH_COOKIE, token))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let set_cookie = resp
            .headers()
            .get(actix_web::http::header::SET_COOKIE)
            .expect("cookie set");
        assert!(
            set_cookie
                .to_str()
                .expect("ascii header")
                .starts_with("accessToken=")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn an_access_token_is_not_accepted_by_refresh() {
        use crate::domain::user::UserId;

        let app = test_app!();
        let signer = signer();
        let token = signer
            .issue(&UserId::random(), Role::Client, TokenKind::Access)
            .expect("issue succeeds");
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .cookie(actix_web::cookie::Cookie::new(REFRESH_COOKIE, token))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn me_requires_authentication() {
        let app = test_app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn logout_expires_both_cookies() {
        let app = test_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let cookies: Vec<String> = resp
            .headers()
            .get_all(actix_web::http::header::SET_COOKIE)
            .map(|value| value.to_str().expect("ascii header").to_owned())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
    }
}
