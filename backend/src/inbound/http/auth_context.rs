//! Request extractor for the authenticated caller.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

use crate::domain::user::{Role, UserId};
use crate::domain::Error;

use super::tokens::{TokenKind, TokenSigner, ACCESS_COOKIE};

/// The verified identity behind a request's access cookie.
///
/// Extracting this fails with 401 when the cookie is missing, expired, or
/// carries a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthContext {
    /// Guard for endpoints only lawyers may call.
    pub fn require_lawyer(&self) -> Result<(), Error> {
        if self.role == Role::Lawyer {
            Ok(())
        } else {
            Err(Error::forbidden("lawyer account required"))
        }
    }

    /// Guard for endpoints only clients may call.
    pub fn require_client(&self) -> Result<(), Error> {
        if self.role == Role::Client {
            Ok(())
        } else {
            Err(Error::forbidden("client account required"))
        }
    }

    /// Extract outside the `FromRequest` machinery, for upgrade handlers
    /// that need the identity before handing the stream off.
    pub fn from_request_parts(req: &HttpRequest) -> Result<Self, Error> {
        extract(req)
    }
}

fn extract(req: &HttpRequest) -> Result<AuthContext, Error> {
    let signer = req
        .app_data::<web::Data<TokenSigner>>()
        .ok_or_else(|| Error::internal("token signer not configured"))?;
    let cookie = req
        .cookie(ACCESS_COOKIE)
        .ok_or_else(|| Error::unauthorized("authentication required"))?;
    let identity = signer.verify(cookie.value(), TokenKind::Access)?;
    Ok(AuthContext {
        user_id: identity.user_id,
        role: identity.role,
    })
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use rstest::{fixture, rstest};

    use crate::domain::error::ErrorCode;

    use super::*;

    #[fixture]
    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-material", false)
    }

    fn request_with(signer: &TokenSigner, cookie: Option<Cookie<'static>>) -> HttpRequest {
        let mut builder = TestRequest::default().app_data(web::Data::new(signer.clone()));
        if let Some(cookie) = cookie {
            builder = builder.cookie(cookie);
        }
        builder.to_http_request()
    }

    #[rstest]
    #[tokio::test]
    async fn a_valid_access_cookie_authenticates(signer: TokenSigner) {
        let user_id = UserId::random();
        let token = signer
            .issue(&user_id, Role::Lawyer, TokenKind::Access)
            .expect("issue succeeds");
        let req = request_with(&signer, Some(Cookie::new(ACCESS_COOKIE, token)));

        let context = AuthContext::extract(&req).await.expect("extraction succeeds");
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, Role::Lawyer);
    }

    #[rstest]
    #[tokio::test]
    async fn a_missing_cookie_is_unauthorized(signer: TokenSigner) {
        let req = request_with(&signer, None);
        let err = AuthContext::extract(&req).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn a_refresh_cookie_does_not_authenticate(signer: TokenSigner) {
        let token = signer
            .issue(&UserId::random(), Role::Client, TokenKind::Refresh)
            .expect("issue succeeds");
        let req = request_with(&signer, Some(Cookie::new(ACCESS_COOKIE, token)));
        let err = AuthContext::extract(&req).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn role_guards_enforce_the_account_class() {
        let lawyer = AuthContext {
            user_id: UserId::random(),
            role: Role::Lawyer,
        };
        assert!(lawyer.require_lawyer().is_ok());
        assert_eq!(
            lawyer.require_client().expect_err("rejected").code(),
            ErrorCode::Forbidden
        );
    }
}
