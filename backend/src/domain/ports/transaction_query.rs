//! Driving port for transaction listings.

use async_trait::async_trait;

use crate::domain::{DoctorId, Error, PatientId};

use super::TransactionListing;

/// Domain use-case port for listing money movements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionQuery: Send + Sync {
    /// A patient's payment history, newest first.
    async fn patient_transactions(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<TransactionListing>, Error>;

    /// A doctor's revenue ledger, newest first.
    async fn doctor_transactions(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<TransactionListing>, Error>;
}

/// Query used when no database is configured. Always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTransactionQuery;

#[async_trait]
impl TransactionQuery for FixtureTransactionQuery {
    async fn patient_transactions(
        &self,
        _patient_id: PatientId,
    ) -> Result<Vec<TransactionListing>, Error> {
        Ok(Vec::new())
    }

    async fn doctor_transactions(
        &self,
        _doctor_id: DoctorId,
    ) -> Result<Vec<TransactionListing>, Error> {
        Ok(Vec::new())
    }
}
