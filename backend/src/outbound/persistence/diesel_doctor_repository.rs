//! PostgreSQL-backed `DoctorRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DoctorRepository, DoctorRepositoryError};
use crate::domain::{Doctor, DoctorId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::DoctorRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::doctor_from_row;
use super::schema::doctors;

/// Diesel-backed doctor directory.
#[derive(Clone)]
pub struct DieselDoctorRepository {
    pool: DbPool,
}

impl DieselDoctorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DoctorRepositoryError {
    map_basic_pool_error(error, |message| DoctorRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> DoctorRepositoryError {
    map_basic_diesel_error(
        error,
        DoctorRepositoryError::query,
        DoctorRepositoryError::connection,
    )
}

#[async_trait]
impl DoctorRepository for DieselDoctorRepository {
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DoctorRow> = doctors::table
            .find(id.as_uuid())
            .select(DoctorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(doctor_from_row)
            .transpose()
            .map_err(DoctorRepositoryError::query)
    }
}
