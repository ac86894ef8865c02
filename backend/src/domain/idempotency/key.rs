//! Client-supplied idempotency keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reasons an `Idempotency-Key` header value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyKeyValidationError {
    /// Header present but empty.
    #[error("idempotency key must not be empty")]
    EmptyKey,
    /// Header is not a canonical UUID.
    #[error("idempotency key must be a valid UUID")]
    InvalidKey,
}

/// UUID sent by clients so that retried bookings are charged once.
///
/// The original string is kept alongside the parsed value so replays echo
/// exactly what the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey {
    uuid: Uuid,
    raw: String,
}

impl IdempotencyKey {
    /// Parse a header value.
    ///
    /// Surrounding whitespace is rejected rather than trimmed.
    ///
    /// # Examples
    /// ```
    /// use telecare::domain::idempotency::IdempotencyKey;
    ///
    /// let key = IdempotencyKey::new("550e8400-e29b-41d4-a716-446655440000").expect("valid key");
    /// assert_eq!(key.as_ref(), "550e8400-e29b-41d4-a716-446655440000");
    /// assert!(IdempotencyKey::new("retry-1").is_err());
    /// ```
    pub fn new(key: impl Into<String>) -> Result<Self, IdempotencyKeyValidationError> {
        let raw = key.into();
        if raw.is_empty() {
            return Err(IdempotencyKeyValidationError::EmptyKey);
        }
        if raw.trim() != raw {
            return Err(IdempotencyKeyValidationError::InvalidKey);
        }
        let uuid = Uuid::parse_str(&raw).map_err(|_| IdempotencyKeyValidationError::InvalidKey)?;
        Ok(Self { uuid, raw })
    }

    /// Wrap a UUID loaded from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            raw: uuid.to_string(),
        }
    }

    /// Fresh random key.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Parsed UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<IdempotencyKey> for String {
    fn from(value: IdempotencyKey) -> Self {
        value.raw
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
