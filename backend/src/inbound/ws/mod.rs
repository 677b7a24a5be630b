//! WebSocket inbound adapter for live chat.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, access cookie)
//! - run the per-connection session loop
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    get,
    http::header::{HeaderValue, ORIGIN},
    HttpRequest, HttpResponse,
};
use tracing::{error, warn};
use url::Url;

use crate::inbound::http::auth_context::AuthContext;

mod session;

pub mod messages;
pub mod state;

const LOCALHOST: &str = "localhost";

/// Origin allow-list for upgrades, derived from the configured primary
/// host. Accepts HTTPS requests from the primary host and its subdomains,
/// and HTTP requests from localhost with a non-zero explicit port.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    primary_host: String,
    subdomain_suffix: String,
}

impl OriginPolicy {
    #[must_use]
    pub fn new(primary_host: impl Into<String>) -> Self {
        let primary_host = primary_host.into();
        let subdomain_suffix = format!(".{primary_host}");
        Self {
            primary_host,
            subdomain_suffix,
        }
    }

    fn is_allowed(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };

        match origin.scheme() {
            "http" if host == LOCALHOST => matches!(origin.port(), Some(port) if port != 0),
            "https" if host == self.primary_host => true,
            "https" if host.strip_suffix(self.subdomain_suffix.as_str()).is_some() => true,
            _ => false,
        }
    }
}

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// The caller authenticates the same way REST does, with the access
/// cookie; there is no in-band auth frame.
#[get("/ws")]
pub async fn ws_entry(
    ws_state: web::Data<state::WsState>,
    policy: web::Data<OriginPolicy>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(&policy, origin_header)?;
    let context = AuthContext::from_request_parts(&req)?;

    let (response, session, message_stream) = actix_ws::handle(&req, stream)?;
    actix_web::rt::spawn(session::handle_ws_session(
        ws_state.get_ref().clone(),
        context.user_id,
        session,
        message_stream,
    ));
    Ok(response)
}

fn validate_origin(policy: &OriginPolicy, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if policy.is_allowed(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::HeaderValue;
    use rstest::rstest;

    use super::*;

    fn policy() -> OriginPolicy {
        OriginPolicy::new("justiceconnect.example")
    }

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).expect("valid header value")
    }

    #[rstest]
    #[case("http://localhost:3000")]
    #[case("https://justiceconnect.example")]
    #[case("https://app.justiceconnect.example")]
    fn accepts_configured_origins(#[case] origin: &str) {
        assert!(validate_origin(&policy(), &header(origin)).is_ok());
    }

    #[rstest]
    #[case("http://localhost")]
    #[case("https://example.com")]
    #[case("wss://justiceconnect.example")]
    #[case("https://justiceconnect.example.evil.com")]
    #[case("not a url")]
    fn rejects_foreign_origins(#[case] origin: &str) {
        assert!(validate_origin(&policy(), &header(origin)).is_err());
    }
}
