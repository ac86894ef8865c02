//! Driving port for appointment listings.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Appointment, AppointmentTiming, DoctorSummary, Error, PatientSummary};

use super::AppointmentFilter;

/// Appointment as shown to its patient or doctor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentView {
    /// Ledger entry.
    pub appointment: Appointment,
    /// Flags derived at query time.
    pub timing: AppointmentTiming,
    /// Doctor display data, on patient listings.
    pub doctor: Option<DoctorSummary>,
    /// Patient display data, on doctor listings.
    pub patient: Option<PatientSummary>,
}

/// Domain use-case port for listing appointments.
///
/// The caller has already checked that the principal may read `filter.scope`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentQuery: Send + Sync {
    /// One page of appointments, newest first.
    async fn list_appointments(
        &self,
        filter: AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, Error>;
}

/// Query used when no database is configured. Always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentQuery;

#[async_trait]
impl AppointmentQuery for FixtureAppointmentQuery {
    async fn list_appointments(
        &self,
        _filter: AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }
}
