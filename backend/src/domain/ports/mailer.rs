//! Port for outbound email notifications.

use async_trait::async_trait;

use crate::domain::user::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mailer adapters.
    pub enum MailerError {
        /// The email provider could not be reached.
        Unreachable { message: String } =>
            "email provider unreachable: {message}",
        /// The email provider rejected the message.
        Rejected { status: u16 } =>
            "email provider rejected the message with status {status}",
    }
}

/// A plain-text notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

/// Port for sending notification emails.
///
/// Callers treat delivery as best-effort: a failed send is logged and never
/// retried, and never fails the operation that triggered it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one email.
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError>;
}

/// Fixture mailer that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailer;

#[async_trait]
impl Mailer for FixtureMailer {
    async fn send(&self, _message: EmailMessage) -> Result<(), MailerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_mailer_always_delivers() {
        let mailer = FixtureMailer;
        mailer
            .send(EmailMessage {
                to: EmailAddress::new("client@example.com").expect("valid"),
                subject: "Your case was approved".into(),
                body: "Your lawyer approved the case.".into(),
            })
            .await
            .expect("fixture send succeeds");
    }
}
