//! Port abstraction for the appointment ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use pagination::{Page, PageRequest};

use crate::domain::{
    Appointment, AppointmentStatus, DoctorId, DoctorSummary, PatientId, PatientSummary, TimeSlot,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by appointment ledger adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "appointment repository connection failed: {message}",
        /// Query failed or returned malformed rows.
        Query { message: String } => "appointment repository query failed: {message}",
    }
}

/// Whose appointments a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    /// Appointments booked by a patient.
    Patient(PatientId),
    /// Appointments with a doctor.
    Doctor(DoctorId),
}

/// Listing filter. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentFilter {
    /// Owner of the listing.
    pub scope: AppointmentScope,
    /// Only appointments in this status.
    pub status: Option<AppointmentStatus>,
    /// Earliest date.
    pub from: Option<NaiveDate>,
    /// Latest date.
    pub to: Option<NaiveDate>,
}

impl AppointmentFilter {
    /// Unfiltered listing for `scope`.
    pub const fn for_scope(scope: AppointmentScope) -> Self {
        Self {
            scope,
            status: None,
            from: None,
            to: None,
        }
    }
}

/// Appointment joined with the counterpart's display data.
///
/// Patient listings carry the doctor; doctor listings carry the patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentListing {
    /// Ledger entry.
    pub appointment: Appointment,
    /// Doctor display data.
    pub doctor: Option<DoctorSummary>,
    /// Patient display data.
    pub patient: Option<PatientSummary>,
}

/// Read access to booked appointments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Non-cancelled appointment occupying `slot` on `date`, if any.
    async fn find_active_in_slot(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        slot: &TimeSlot,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// One page of appointments ordered by date then start time, newest
    /// first.
    async fn list(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<AppointmentListing>, AppointmentRepositoryError>;
}

/// Empty ledger used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentRepository;

#[async_trait]
impl AppointmentRepository for FixtureAppointmentRepository {
    async fn find_active_in_slot(
        &self,
        _doctor_id: &DoctorId,
        _date: NaiveDate,
        _slot: &TimeSlot,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<AppointmentListing>, AppointmentRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }
}
