//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use reqwest::Url;

use crate::outbound::persistence::DbPool;

/// Endpoint and credential for one outbound HTTP provider.
#[derive(Clone)]
pub struct ProviderEndpoint {
    pub endpoint: Url,
    pub api_key: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) jwt_secret: Vec<u8>,
    pub(crate) secure_cookies: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) primary_host: String,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) chat_provider: Option<ProviderEndpoint>,
    pub(crate) email_provider: Option<ProviderEndpoint>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(
        jwt_secret: Vec<u8>,
        secure_cookies: bool,
        bind_addr: SocketAddr,
        primary_host: impl Into<String>,
    ) -> Self {
        Self {
            jwt_secret,
            secure_cookies,
            bind_addr,
            primary_host: primary_host.into(),
            db_pool: None,
            chat_provider: None,
            email_provider: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed implementations for
    /// every port that has an adapter; without it the fixture ports serve,
    /// which is the mode handler tests run in.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the third-party conversations provider endpoint.
    #[must_use]
    pub fn with_chat_provider(mut self, provider: ProviderEndpoint) -> Self {
        self.chat_provider = Some(provider);
        self
    }

    /// Attach the notification email provider endpoint.
    #[must_use]
    pub fn with_email_provider(mut self, provider: ProviderEndpoint) -> Self {
        self.email_provider = Some(provider);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
