//! Port resolving bearer tokens to principals.

use async_trait::async_trait;

use crate::domain::{BearerToken, Principal};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token verification adapters.
    pub enum TokenVerifierError {
        /// Token store unreachable.
        Connection { message: String } => "token store connection failed: {message}",
        /// Lookup failed or returned malformed rows.
        Query { message: String } => "token store query failed: {message}",
    }
}

/// Resolves an access token issued elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// The principal the token was issued to, or `None` when the token is
    /// unknown or expired.
    async fn verify(&self, token: &BearerToken) -> Result<Option<Principal>, TokenVerifierError>;
}

/// Verifier used when no database is configured. Recognises no tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenVerifier;

#[async_trait]
impl TokenVerifier for FixtureTokenVerifier {
    async fn verify(&self, _token: &BearerToken) -> Result<Option<Principal>, TokenVerifierError> {
        Ok(None)
    }
}
