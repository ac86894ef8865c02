//! Stored booking outcomes keyed by client idempotency keys.

use chrono::{DateTime, Utc};

use super::super::PatientId;
use super::{IdempotencyKey, PayloadHash};

/// Outcome of a completed booking, stored so retries can be replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct IdempotencyRecord {
    /// Client key.
    pub key: IdempotencyKey,
    /// Patient the key is scoped to.
    pub patient_id: PatientId,
    /// Digest of the original request.
    pub payload_hash: PayloadHash,
    /// Serialised booking receipt.
    pub response_snapshot: serde_json::Value,
    /// When the booking committed.
    pub created_at: DateTime<Utc>,
}

/// What the store knows about a key.
#[derive(Debug, Clone, PartialEq)]
pub enum IdempotencyLookupResult {
    /// Unused key.
    NotFound,
    /// Same key and same request: replay the stored receipt.
    MatchingPayload(IdempotencyRecord),
    /// Same key reused for a different request.
    ConflictingPayload(IdempotencyRecord),
}

impl IdempotencyLookupResult {
    /// Classify a stored record against the digest of an incoming request.
    pub fn classify(record: Option<IdempotencyRecord>, incoming: &PayloadHash) -> Self {
        match record {
            None => Self::NotFound,
            Some(found) if found.payload_hash == *incoming => Self::MatchingPayload(found),
            Some(found) => Self::ConflictingPayload(found),
        }
    }
}

/// Key, owner and digest of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyLookupQuery {
    /// Client key.
    pub key: IdempotencyKey,
    /// Requesting patient.
    pub patient_id: PatientId,
    /// Digest of the incoming request.
    pub payload_hash: PayloadHash,
}
