//! Embedded schema migrations.
//!
//! The SQL under `backend/migrations/` is compiled into the binary and
//! applied at startup before the pool is handed to adapters.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations compiled from `backend/migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    /// The blocking migration task did not complete.
    #[error("migration task aborted: {message}")]
    Aborted { message: String },
}

/// Apply pending migrations over a blocking connection, returning how many
/// ran.
///
/// # Errors
///
/// Returns [`MigrationError::Connect`] when `database_url` is unreachable and
/// [`MigrationError::Apply`] when a migration fails.
pub fn apply_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
            message: err.to_string(),
        })?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied.len())
}

/// Run [`apply_migrations`] on the blocking thread pool.
///
/// # Errors
///
/// As for [`apply_migrations`], plus [`MigrationError::Aborted`] when the
/// task panics or is cancelled.
pub async fn apply_migrations_in_background(database_url: String) -> Result<usize, MigrationError> {
    tokio::task::spawn_blocking(move || apply_migrations(&database_url))
        .await
        .map_err(|err| MigrationError::Aborted {
            message: err.to_string(),
        })?
}
