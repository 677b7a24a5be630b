//! Reqwest-backed email provider adapter.
//!
//! Delivery is best-effort at the call sites: services log a failed send
//! and carry on, so this adapter only has to report what went wrong.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::ports::{EmailMessage, Mailer, MailerError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire form of a notification email, as the provider's send API expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailDto<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl<'a> From<&'a EmailMessage> for SendEmailDto<'a> {
    fn from(message: &'a EmailMessage) -> Self {
        Self {
            to: message.to.as_ref(),
            subject: message.subject.as_str(),
            body: message.body.as_str(),
        }
    }
}

/// Email provider adapter that POSTs plain-text sends to one endpoint.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpMailer {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        endpoint: Url,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&SendEmailDto::from(&message))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> MailerError {
    MailerError::unreachable(error.to_string())
}

fn map_status_error(status: StatusCode) -> MailerError {
    MailerError::rejected(status.as_u16())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mailer mapping helpers.

    use rstest::rstest;
    use serde_json::json;

    use crate::domain::user::EmailAddress;

    use super::*;

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, 400)]
    #[case(StatusCode::BAD_GATEWAY, 502)]
    fn non_success_statuses_map_to_rejected(#[case] status: StatusCode, #[case] code: u16) {
        assert_eq!(map_status_error(status), MailerError::rejected(code));
    }

    #[rstest]
    fn emails_serialise_in_provider_wire_form() {
        let message = EmailMessage {
            to: EmailAddress::new("client@example.com").expect("valid"),
            subject: "Your case was approved".into(),
            body: "Your lawyer approved the case.".into(),
        };

        let value = serde_json::to_value(SendEmailDto::from(&message)).expect("dto serialises");
        assert_eq!(
            value,
            json!({
                "to": "client@example.com",
                "subject": "Your case was approved",
                "body": "Your lawyer approved the case.",
            })
        );
    }
}
