//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use coursedesk_backend::domain::SigningKey;
use coursedesk_backend::domain::ports::PaymentProvider;
use coursedesk_backend::outbound::persistence::DbPool;

/// Configuration for creating the HTTP server.
///
/// Everything here is established at startup and injected downwards; no
/// handler reads the environment or opens its own connections.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) signing_key: SigningKey,
    pub(crate) db_pool: DbPool,
    pub(crate) provider: Arc<dyn PaymentProvider>,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        signing_key: SigningKey,
        db_pool: DbPool,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            bind_addr,
            signing_key,
            db_pool,
            provider,
        }
    }
}
