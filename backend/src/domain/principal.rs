//! Authenticated callers and bearer tokens.
//!
//! Token issuance is out of scope; the backend only verifies tokens it finds
//! in its store. Tokens are held in zeroising memory and compared by SHA-256
//! digest so raw tokens never reach the database.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{DoctorId, PatientId};

/// Who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    /// A patient acting on their own wallet and appointments.
    Patient(PatientId),
    /// A doctor viewing their own schedule and earnings.
    Doctor(DoctorId),
}

impl Principal {
    /// Role of the caller.
    pub const fn role(&self) -> Role {
        match self {
            Self::Patient(_) => Role::Patient,
            Self::Doctor(_) => Role::Doctor,
        }
    }
}

/// Caller role as persisted next to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Patient account.
    Patient,
    /// Doctor account.
    Doctor,
}

impl Role {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

/// Rejections for an `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerTokenError {
    /// Scheme was not `Bearer`.
    #[error("authorization scheme must be Bearer")]
    WrongScheme,
    /// Scheme present but no token followed.
    #[error("bearer token must not be empty")]
    EmptyToken,
}

/// Opaque access token presented by a client.
///
/// # Examples
/// ```
/// use telecare::domain::BearerToken;
///
/// let token = BearerToken::from_header("Bearer abc123").expect("bearer token");
/// assert_eq!(token.expose(), "abc123");
/// assert!(BearerToken::from_header("Basic abc123").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a raw token.
    pub fn new(raw: impl Into<String>) -> Result<Self, BearerTokenError> {
        let raw = Zeroizing::new(raw.into());
        if raw.trim().is_empty() {
            return Err(BearerTokenError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Parse an `Authorization` header value. The scheme is case-insensitive.
    pub fn from_header(value: &str) -> Result<Self, BearerTokenError> {
        let (scheme, token) = value
            .trim_start()
            .split_once(' ')
            .ok_or(BearerTokenError::WrongScheme)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(BearerTokenError::WrongScheme);
        }
        Self::new(token.trim())
    }

    /// Raw token text.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest used as the storage lookup key.
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(Sha256::digest(self.0.as_bytes()).into())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// SHA-256 digest of a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    /// Digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering, handy for seeding fixtures.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}
