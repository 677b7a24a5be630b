//! HTTP mapping for domain errors.
//!
//! Keeps `domain::Error` transport-agnostic while giving every handler a
//! uniform JSON error body, status code, and `trace-id` header.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Internal failures keep their detail in the logs, not the response body.
fn client_view(err: &Error) -> Error {
    if err.code() == ErrorCode::InternalError {
        error!(message = err.message(), trace_id = ?err.trace_id(), "internal error");
        let mut redacted = Error::internal("internal server error");
        if let Some(id) = err.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        err.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use actix_web::body::to_bytes;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Error::invalid_request("bad field"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("not yours"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("already done"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("upstream down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes_follow_the_error_code(#[case] err: Error, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn internal_detail_never_reaches_the_body() {
        let err = Error::internal("pg: connection refused on 10.0.0.3");
        let response = err.error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let text = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(!text.contains("10.0.0.3"));
        assert!(text.contains("internal server error"));
    }

    #[rstest]
    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let err = Error::conflict("case status changed concurrently");
        let response = err.error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let text = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(text.contains("case status changed concurrently"));
    }

    #[rstest]
    fn responses_carry_the_trace_id_header() {
        let err = Error::not_found("missing").with_trace_id("trace-123");
        let response = err.error_response();
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace header present");
        assert_eq!(header, "trace-123");
    }
}
