//! PostgreSQL-backed `TokenVerifier`.
//!
//! Looks the SHA-256 digest of the presented token up in `access_tokens`.
//! Expired rows are ignored; the raw token never reaches the database.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{TokenVerifier, TokenVerifierError};
use crate::domain::{BearerToken, DoctorId, PatientId, Principal, Role};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AccessTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::access_tokens;

/// Diesel-backed bearer token verification.
#[derive(Clone)]
pub struct DieselTokenVerifier {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselTokenVerifier {
    /// Create a verifier that checks expiry against `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> TokenVerifierError {
    map_basic_pool_error(error, |message| TokenVerifierError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> TokenVerifierError {
    map_basic_diesel_error(
        error,
        TokenVerifierError::query,
        TokenVerifierError::connection,
    )
}

fn principal_for(role: &str, id: Uuid) -> Result<Principal, TokenVerifierError> {
    let role: Role = role
        .parse()
        .map_err(|err| TokenVerifierError::query(format!("invalid stored role: {err}")))?;
    Ok(match role {
        Role::Patient => Principal::Patient(PatientId::from_uuid(id)),
        Role::Doctor => Principal::Doctor(DoctorId::from_uuid(id)),
    })
}

#[async_trait]
impl TokenVerifier for DieselTokenVerifier {
    async fn verify(&self, token: &BearerToken) -> Result<Option<Principal>, TokenVerifierError> {
        let digest = token.digest();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccessTokenRow> = access_tokens::table
            .filter(
                access_tokens::token_hash
                    .eq(digest.as_bytes().as_slice())
                    .and(access_tokens::expires_at.gt(self.clock.utc())),
            )
            .select(AccessTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|r| principal_for(&r.role, r.principal_id))
            .transpose()
    }
}
