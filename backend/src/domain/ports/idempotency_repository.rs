//! Port abstraction for idempotency record lookup and retention.
//!
//! Records are written by [`super::BookingLedger::commit`] inside the booking
//! transaction; this port only reads and purges them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{IdempotencyLookupQuery, IdempotencyLookupResult};

use super::define_port_error;

define_port_error! {
    /// Errors raised by idempotency repository adapters.
    pub enum IdempotencyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "idempotency repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "idempotency repository query failed: {message}",
    }
}

/// Port for idempotency record retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdempotencyRepository: Send + Sync {
    /// Look up a key scoped to the requesting patient and classify it
    /// against the incoming digest.
    async fn lookup(
        &self,
        query: &IdempotencyLookupQuery,
    ) -> Result<IdempotencyLookupResult, IdempotencyRepositoryError>;

    /// Delete records created before `cutoff`, returning how many went.
    async fn cleanup_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, IdempotencyRepositoryError>;
}

/// Store used when no database is configured. Knows no keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdempotencyRepository;

#[async_trait]
impl IdempotencyRepository for FixtureIdempotencyRepository {
    async fn lookup(
        &self,
        _query: &IdempotencyLookupQuery,
    ) -> Result<IdempotencyLookupResult, IdempotencyRepositoryError> {
        Ok(IdempotencyLookupResult::NotFound)
    }

    async fn cleanup_expired(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<u64, IdempotencyRepositoryError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IdempotencyKey, PatientId, canonicalize_and_hash};
    use serde_json::json;

    #[tokio::test]
    async fn fixture_repository_reports_unknown_keys() {
        let query = IdempotencyLookupQuery {
            key: IdempotencyKey::random(),
            patient_id: PatientId::random(),
            payload_hash: canonicalize_and_hash(&json!({"doctorId": "d"})).expect("hash"),
        };
        let result = FixtureIdempotencyRepository
            .lookup(&query)
            .await
            .expect("fixture lookup succeeds");
        assert_eq!(result, IdempotencyLookupResult::NotFound);
    }

    #[tokio::test]
    async fn fixture_repository_purges_nothing() {
        let purged = FixtureIdempotencyRepository
            .cleanup_expired(Utc::now())
            .await
            .expect("fixture cleanup succeeds");
        assert_eq!(purged, 0);
    }
}
