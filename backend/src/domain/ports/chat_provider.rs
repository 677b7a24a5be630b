//! Port for the third-party conversations provider.

use async_trait::async_trait;

use crate::domain::message::ChatMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversations provider adapters.
    pub enum ChatProviderError {
        /// The provider could not be reached.
        Unreachable { message: String } =>
            "conversations provider unreachable: {message}",
        /// The provider rejected the message.
        Rejected { status: u16 } =>
            "conversations provider rejected the message with status {status}",
    }
}

/// Port for forwarding messages to the conversations provider.
///
/// The local mirror is the source of truth for history; forwarding keeps the
/// provider-side conversation in step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Forward one message to the provider.
    async fn forward(&self, message: &ChatMessage) -> Result<(), ChatProviderError>;
}

/// Fixture provider that swallows every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatProvider;

#[async_trait]
impl ChatProvider for FixtureChatProvider {
    async fn forward(&self, _message: &ChatMessage) -> Result<(), ChatProviderError> {
        Ok(())
    }
}
