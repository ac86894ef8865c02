//! Port abstraction for patient accounts.

use async_trait::async_trait;

use crate::domain::{Patient, PatientId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by patient account adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "patient repository connection failed: {message}",
        /// Query failed or returned malformed rows.
        Query { message: String } => "patient repository query failed: {message}",
    }
}

/// Read access to patient accounts and wallets.
///
/// Wallet mutation happens only inside [`super::BookingLedger::commit`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Load a patient by id.
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, PatientRepositoryError>;
}

/// Empty account store used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePatientRepository;

#[async_trait]
impl PatientRepository for FixturePatientRepository {
    async fn find_by_id(&self, _id: &PatientId) -> Result<Option<Patient>, PatientRepositoryError> {
        Ok(None)
    }
}
