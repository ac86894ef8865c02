//! Canonical request hashing.

use std::fmt;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

const HASH_LEN: usize = 32;

/// Failures building a [`PayloadHash`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadHashError {
    /// Stored digest had the wrong width.
    #[error("payload hash must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required width.
        expected: usize,
        /// Width found.
        actual: usize,
    },
    /// Canonical JSON could not be encoded.
    #[error("failed to serialise canonical JSON payload: {message}")]
    Serialization {
        /// Encoder message.
        message: String,
    },
}

/// SHA-256 digest of a canonicalised booking request.
///
/// Two requests under the same idempotency key are the same booking only if
/// their digests match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadHash([u8; HASH_LEN]);

impl PayloadHash {
    /// Wrap a digest.
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Wrap a digest read back from a `BYTEA` column.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, PayloadHashError> {
        let digest = <[u8; HASH_LEN]>::try_from(bytes).map_err(|_| {
            PayloadHashError::InvalidLength {
                expected: HASH_LEN,
                actual: bytes.len(),
            }
        })?;
        Ok(Self(digest))
    }

    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash `value` after sorting object keys recursively and encoding compactly.
///
/// Array order is significant.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use telecare::domain::idempotency::canonicalize_and_hash;
///
/// let a = canonicalize_and_hash(&json!({"date": "2024-06-10", "doctorId": "d"})).expect("hash");
/// let b = canonicalize_and_hash(&json!({"doctorId": "d", "date": "2024-06-10"})).expect("hash");
/// assert_eq!(a, b);
/// ```
pub fn canonicalize_and_hash(value: &Value) -> Result<PayloadHash, PayloadHashError> {
    let bytes = serde_json::to_vec(&canonicalize(value)).map_err(|err| {
        PayloadHashError::Serialization {
            message: err.to_string(),
        }
    })?;
    Ok(PayloadHash::from_bytes(Sha256::digest(&bytes).into()))
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, inner)| (key.clone(), canonicalize(inner)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        scalar => scalar.clone(),
    }
}
