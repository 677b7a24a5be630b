//! Backend entry-point: wires REST endpoints, WebSocket entry, and OpenAPI docs.

use std::env;
use std::net::SocketAddr;

use actix_web::web;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use justiceconnect::inbound::http::health::HealthState;
use justiceconnect::outbound::persistence::{DbPool, PoolConfig};
use justiceconnect::server::{create_server, ProviderEndpoint, ServerConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PRIMARY_HOST: &str = "justiceconnect.example";

/// Read the JWT signing secret, falling back to an ephemeral one in dev.
fn load_jwt_secret() -> std::io::Result<Vec<u8>> {
    let secret_path =
        env::var("JWT_SECRET_FILE").unwrap_or_else(|_| "/var/run/secrets/jwt_secret".into());
    match std::fs::read(&secret_path) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %secret_path, error = %e, "using temporary JWT secret (dev only)");
                let mut secret = vec![0u8; 64];
                use rand::RngCore as _;
                rand::thread_rng().fill_bytes(&mut secret);
                Ok(secret)
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read JWT secret at {secret_path}: {e}"
                )))
            }
        }
    }
}

/// Read an optional provider endpoint from `<PREFIX>_URL` and `<PREFIX>_API_KEY`.
fn load_provider(prefix: &str) -> std::io::Result<Option<ProviderEndpoint>> {
    let Ok(raw_url) = env::var(format!("{prefix}_URL")) else {
        return Ok(None);
    };
    let endpoint = Url::parse(&raw_url)
        .map_err(|e| std::io::Error::other(format!("invalid {prefix}_URL: {e}")))?;
    let api_key = env::var(format!("{prefix}_API_KEY"))
        .map_err(|_| std::io::Error::other(format!("{prefix}_API_KEY is required with {prefix}_URL")))?;
    Ok(Some(ProviderEndpoint { endpoint, api_key }))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let jwt_secret = load_jwt_secret()?;

    let secure_cookies = env::var("COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let primary_host =
        env::var("PRIMARY_HOST").unwrap_or_else(|_| DEFAULT_PRIMARY_HOST.into());

    let mut config = ServerConfig::new(jwt_secret, secure_cookies, bind_addr, primary_host);

    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            config = config.with_db_pool(pool);
        }
        Err(_) => warn!("DATABASE_URL not set; serving with fixture ports (dev only)"),
    }

    if let Some(provider) = load_provider("CHAT_PROVIDER")? {
        config = config.with_chat_provider(provider);
    }
    if let Some(provider) = load_provider("EMAIL_PROVIDER")? {
        config = config.with_email_provider(provider);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "server started");
    server.await
}
