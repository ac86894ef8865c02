//! Backend entry-point: loads settings, prepares the database and serves the
//! booking API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use telecare::inbound::http::health::HealthState;
use telecare::outbound::persistence::{DbPool, PoolConfig, apply_migrations_in_background};
use telecare::settings::AppSettings;

async fn connect(settings: &AppSettings, database_url: &str) -> std::io::Result<DbPool> {
    if settings.run_migrations {
        let applied = apply_migrations_in_background(database_url.to_owned())
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database schema is up to date");
    }

    let pool_config = PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
    DbPool::new(pool_config)
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))
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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("invalid configuration: {err}")))?;

    let mut config =
        ServerConfig::new(settings.bind_addr()).with_idempotency(settings.idempotency());
    if let Some(database_url) = settings.database_url() {
        config = config.with_db_pool(connect(&settings, database_url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!(bind_addr = %settings.bind_addr(), "listening");
    server.await
}
