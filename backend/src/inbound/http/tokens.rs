//! JWT issuance and verification plus the auth cookie pair.
//!
//! Access and refresh tokens are HS256 JWTs carried in HttpOnly cookies.
//! The `kind` claim keeps the two roles apart: a refresh token never
//! authorises an API call and an access token is never accepted by the
//! refresh endpoint.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::user::{Role, UserId};
use crate::domain::Error;

/// Cookie carrying the short-lived access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie carrying the long-lived refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Default access token lifetime.
pub const ACCESS_TTL_MINUTES: i64 = 15;
/// Default refresh token lifetime.
pub const REFRESH_TTL_DAYS: i64 = 14;

/// Which of the two token roles a JWT plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    kind: TokenKind,
    iat: i64,
    exp: i64,
}

/// The verified identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub role: Role,
}

/// Signs and verifies the auth token pair with one shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    /// Whether issued cookies carry the `Secure` attribute.
    secure_cookies: bool,
}

impl TokenSigner {
    /// Build a signer from the shared HS256 secret.
    #[must_use]
    pub fn new(secret: &[u8], secure_cookies: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(REFRESH_TTL_DAYS),
            secure_cookies,
        }
    }

    #[cfg(test)]
    fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Issue a token of the given kind for the user.
    pub fn issue(
        &self,
        user_id: &UserId,
        role: Role,
        kind: TokenKind,
    ) -> Result<String, Error> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_owned(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }

    /// Verify a token and require it to be of `expected` kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenIdentity, Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| Error::unauthorized("invalid or expired token"))?;
        if data.claims.kind != expected {
            return Err(Error::unauthorized("wrong token kind"));
        }
        let user_id = UserId::new(&data.claims.sub)
            .map_err(|_| Error::unauthorized("invalid or expired token"))?;
        let role = data
            .claims
            .role
            .parse::<Role>()
            .map_err(|_| Error::unauthorized("invalid or expired token"))?;
        Ok(TokenIdentity { user_id, role })
    }

    /// Issue both cookies for a freshly authenticated user.
    pub fn login_cookies(
        &self,
        user_id: &UserId,
        role: Role,
    ) -> Result<(Cookie<'static>, Cookie<'static>), Error> {
        let access = self.issue(user_id, role, TokenKind::Access)?;
        let refresh = self.issue(user_id, role, TokenKind::Refresh)?;
        Ok((
            self.cookie(ACCESS_COOKIE, access, self.access_ttl),
            self.cookie(REFRESH_COOKIE, refresh, self.refresh_ttl),
        ))
    }

    /// Issue a fresh access cookie from a verified refresh token.
    pub fn refreshed_access_cookie(
        &self,
        identity: &TokenIdentity,
    ) -> Result<Cookie<'static>, Error> {
        let access = self.issue(&identity.user_id, identity.role, TokenKind::Access)?;
        Ok(self.cookie(ACCESS_COOKIE, access, self.access_ttl))
    }

    /// Immediately expiring cookie pair for logout.
    #[must_use]
    pub fn logout_cookies(&self) -> (Cookie<'static>, Cookie<'static>) {
        (
            self.expired_cookie(ACCESS_COOKIE),
            self.expired_cookie(REFRESH_COOKIE),
        )
    }

    fn cookie(&self, name: &'static str, value: String, ttl: Duration) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::seconds(ttl.num_seconds()))
            .finish()
    }

    fn expired_cookie(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build(name, "")
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::ZERO)
            .finish()
    }
}
