//! PostgreSQL-backed `IdempotencyRepository` implementation using Diesel ORM.
//!
//! Records are written by the booking ledger inside the booking transaction;
//! this adapter only reads and purges them. Lookups do not filter by age, so
//! `cleanup_expired` must run periodically to enforce the TTL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{IdempotencyRepository, IdempotencyRepositoryError};
use crate::domain::{
    IdempotencyKey, IdempotencyLookupQuery, IdempotencyLookupResult, IdempotencyRecord, PatientId,
    PayloadHash,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::IdempotencyKeyRow;
use super::pool::{DbPool, PoolError};
use super::schema::idempotency_keys;

/// Diesel-backed implementation of the `IdempotencyRepository` port.
#[derive(Clone)]
pub struct DieselIdempotencyRepository {
    pool: DbPool,
}

impl DieselIdempotencyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdempotencyRepositoryError {
    map_basic_pool_error(error, |message| IdempotencyRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> IdempotencyRepositoryError {
    map_basic_diesel_error(
        error,
        IdempotencyRepositoryError::query,
        IdempotencyRepositoryError::connection,
    )
}

/// Convert a database row to a domain record.
fn row_to_record(row: IdempotencyKeyRow) -> Result<IdempotencyRecord, IdempotencyRepositoryError> {
    let payload_hash = PayloadHash::try_from_bytes(&row.payload_hash).map_err(|err| {
        IdempotencyRepositoryError::query(format!("corrupted payload hash in database: {err}"))
    })?;
    Ok(IdempotencyRecord {
        key: IdempotencyKey::from_uuid(row.key),
        patient_id: PatientId::from_uuid(row.patient_id),
        payload_hash,
        response_snapshot: row.response_snapshot,
        created_at: row.created_at,
    })
}

#[async_trait]
impl IdempotencyRepository for DieselIdempotencyRepository {
    async fn lookup(
        &self,
        query: &IdempotencyLookupQuery,
    ) -> Result<IdempotencyLookupResult, IdempotencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<IdempotencyKeyRow> = idempotency_keys::table
            .filter(
                idempotency_keys::key
                    .eq(query.key.as_uuid())
                    .and(idempotency_keys::patient_id.eq(query.patient_id.as_uuid())),
            )
            .select(IdempotencyKeyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let record = row.map(row_to_record).transpose()?;
        Ok(IdempotencyLookupResult::classify(record, &query.payload_hash))
    }

    async fn cleanup_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, IdempotencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(idempotency_keys::table)
            .filter(idempotency_keys::created_at.lt(cutoff))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(deleted, %cutoff, "cleaned up expired idempotency records");
        u64::try_from(deleted).map_err(|_| {
            IdempotencyRepositoryError::query(format!("row count out of range: {deleted}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(payload_hash: Vec<u8>) -> IdempotencyKeyRow {
        IdempotencyKeyRow {
            key: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            payload_hash,
            response_snapshot: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, IdempotencyRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn well_formed_row_converts() {
        let source = row(vec![7; 32]);
        let key = source.key;
        let record = row_to_record(source).expect("valid row");
        assert_eq!(record.key.as_uuid(), &key);
        assert_eq!(record.payload_hash.as_bytes(), &[7; 32]);
    }

    #[rstest]
    fn truncated_hash_is_a_query_error() {
        let err = row_to_record(row(vec![1; 16])).expect_err("short hash");
        assert!(matches!(err, IdempotencyRepositoryError::Query { .. }));
        assert!(err.to_string().contains("corrupted payload hash"));
    }
}
