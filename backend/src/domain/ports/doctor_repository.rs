//! Port abstraction for the doctor directory.

use async_trait::async_trait;

use crate::domain::{Doctor, DoctorId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by doctor directory adapters.
    pub enum DoctorRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "doctor repository connection failed: {message}",
        /// Query failed or returned malformed rows.
        Query { message: String } => "doctor repository query failed: {message}",
    }
}

/// Read access to bookable doctor profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Load a doctor by id.
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError>;
}

/// Empty directory used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDoctorRepository;

#[async_trait]
impl DoctorRepository for FixtureDoctorRepository {
    async fn find_by_id(&self, _id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        Ok(None)
    }
}
