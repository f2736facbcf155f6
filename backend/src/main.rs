//! Backend entry-point: reads configuration, opens the connection pool, and
//! starts the HTTP server.

mod server;

use std::env;
use std::sync::Arc;

use actix_web::web;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use coursedesk_backend::domain::SigningKey;
use coursedesk_backend::inbound::http::health::HealthState;
use coursedesk_backend::outbound::payments::HttpPaymentProvider;
use coursedesk_backend::outbound::persistence::{DbPool, PoolConfig};
use server::ServerConfig;

fn required_env(name: &str) -> std::io::Result<String> {
    env::var(name).map_err(|_| std::io::Error::other(format!("{name} is not set")))
}

fn load_signing_key() -> std::io::Result<SigningKey> {
    let key_path = required_env("TOKEN_KEY_FILE")?;
    let bytes = std::fs::read(&key_path).map_err(|e| {
        std::io::Error::other(format!("failed to read signing key at {key_path}: {e}"))
    })?;
    SigningKey::from_bytes(bytes)
        .map_err(|e| std::io::Error::other(format!("invalid signing key at {key_path}: {e}")))
}

fn load_payment_provider() -> std::io::Result<HttpPaymentProvider> {
    let endpoint = required_env("PAYMENT_PROVIDER_URL")?;
    let endpoint = Url::parse(&endpoint)
        .map_err(|e| std::io::Error::other(format!("invalid PAYMENT_PROVIDER_URL: {e}")))?;

    let secret_path = required_env("PAYMENT_PROVIDER_SECRET_FILE")?;
    let secret = std::fs::read_to_string(&secret_path).map_err(|e| {
        std::io::Error::other(format!("failed to read provider secret at {secret_path}: {e}"))
    })?;

    HttpPaymentProvider::new(endpoint, secret.trim().to_owned())
        .map_err(|e| std::io::Error::other(format!("payment provider client: {e}")))
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

    let bind_addr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let signing_key = load_signing_key()?;
    let provider = Arc::new(load_payment_provider()?);

    let database_url = required_env("DATABASE_URL")?;
    let db_pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, signing_key, db_pool, provider);
    let server = server::create_server(health_state.clone(), config)?;

    // Fail liveness first so load balancers drain before the stop.
    let handle = server.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            health_state.mark_unhealthy();
            handle.stop(true).await;
        }
    });

    server.await
}
