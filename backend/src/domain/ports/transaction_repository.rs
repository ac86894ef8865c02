//! Port abstraction for the transaction ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AppointmentId, AppointmentStatus, DoctorId, DoctorSummary, PatientId, PatientSummary,
    TimeSlot, Transaction,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by transaction ledger adapters.
    pub enum TransactionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "transaction repository connection failed: {message}",
        /// Query failed or returned malformed rows.
        Query { message: String } => "transaction repository query failed: {message}",
    }
}

/// Reduced appointment projection attached to transaction listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBrief {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// Consultation date.
    pub date: NaiveDate,
    /// Consultation window.
    pub slot: TimeSlot,
    /// Lifecycle status.
    pub status: AppointmentStatus,
}

/// Transaction joined with its appointment and counterpart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionListing {
    /// Ledger entry.
    pub transaction: Transaction,
    /// Settled appointment, when there is one.
    pub appointment: Option<AppointmentBrief>,
    /// Doctor display data, on patient listings.
    pub doctor: Option<DoctorSummary>,
    /// Patient display data, on doctor listings.
    pub patient: Option<PatientSummary>,
}

/// Read access to money movements, newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Every transaction paid by `patient_id`, joined to the doctor.
    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<TransactionListing>, TransactionRepositoryError>;

    /// Every transaction paid to `doctor_id`, joined to the patient.
    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
    ) -> Result<Vec<TransactionListing>, TransactionRepositoryError>;
}

/// Empty ledger used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTransactionRepository;

#[async_trait]
impl TransactionRepository for FixtureTransactionRepository {
    async fn list_for_patient(
        &self,
        _patient_id: &PatientId,
    ) -> Result<Vec<TransactionListing>, TransactionRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_doctor(
        &self,
        _doctor_id: &DoctorId,
    ) -> Result<Vec<TransactionListing>, TransactionRepositoryError> {
        Ok(Vec::new())
    }
}
