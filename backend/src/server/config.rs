//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use telecare::domain::IdempotencyConfig;
use telecare::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) idempotency: IdempotencyConfig,
}

impl ServerConfig {
    /// Configuration for `bind_addr` with fixture ports and default
    /// idempotency retention.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            idempotency: IdempotencyConfig::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server books, lists and verifies tokens against
    /// PostgreSQL instead of the fixture ports.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override how long idempotency records are kept.
    #[must_use]
    pub fn with_idempotency(mut self, idempotency: IdempotencyConfig) -> Self {
        self.idempotency = idempotency;
        self
    }
}
