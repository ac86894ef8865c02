//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `TELECARE_*` environment variables, an optional
//! configuration file and command-line flags, in increasing precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::IdempotencyConfig;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Settings for the HTTP server and its database.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TELECARE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string. Without it the server uses fixture
    /// ports and every booking fails with `503`.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub db_max_connections: Option<u32>,
    /// How long booking responses stay replayable by idempotency key.
    pub idempotency_ttl_hours: Option<u64>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Return the listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Return the pool size, falling back to ten connections.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Return the idempotency retention window.
    pub fn idempotency(&self) -> IdempotencyConfig {
        self.idempotency_ttl_hours
            .map_or_else(IdempotencyConfig::default, IdempotencyConfig::from_hours)
    }
}
