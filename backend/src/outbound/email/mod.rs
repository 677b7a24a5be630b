//! Email provider adapters.

mod http_mailer;

pub use http_mailer::HttpMailer;
