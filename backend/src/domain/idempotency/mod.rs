//! Idempotent booking retries.
//!
//! A client may send an `Idempotency-Key` header with a booking request. The
//! request body is canonicalised (object keys sorted recursively, compact
//! encoding) and hashed with SHA-256. A retry under the same key and patient
//! with the same digest replays the stored receipt; a different digest is a
//! conflict.

mod config;
mod key;
mod payload;
mod record;

pub use config::IdempotencyConfig;
pub use key::{IdempotencyKey, IdempotencyKeyValidationError};
pub use payload::{PayloadHash, PayloadHashError, canonicalize_and_hash};
pub use record::{IdempotencyLookupQuery, IdempotencyLookupResult, IdempotencyRecord};
