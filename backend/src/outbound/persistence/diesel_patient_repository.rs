//! PostgreSQL-backed `PatientRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PatientRepository, PatientRepositoryError};
use crate::domain::{Patient, PatientId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::PatientRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::patient_from_row;
use super::schema::patients;

/// Diesel-backed patient accounts. Reads never lock the row; the booking ledger does.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PatientRepositoryError {
    map_basic_pool_error(error, |message| PatientRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> PatientRepositoryError {
    map_basic_diesel_error(
        error,
        PatientRepositoryError::query,
        PatientRepositoryError::connection,
    )
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PatientRow> = patients::table
            .find(id.as_uuid())
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(patient_from_row)
            .transpose()
            .map_err(PatientRepositoryError::query)
    }
}
