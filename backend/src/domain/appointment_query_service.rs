//! Appointment listing service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{
    AppointmentFilter, AppointmentQuery, AppointmentRepository, AppointmentRepositoryError,
    AppointmentView,
};

/// Query service implementing [`AppointmentQuery`].
pub struct AppointmentQueryService<A> {
    appointments: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> AppointmentQueryService<A> {
    /// Create a service over `appointments`.
    pub fn new(appointments: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            appointments,
            clock,
        }
    }
}

fn map_repository_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentRepositoryError::Query { message } => {
            Error::internal(format!("appointment repository error: {message}"))
        }
    }
}

fn validate_range(filter: &AppointmentFilter) -> Result<(), Error> {
    match (filter.from, filter.to) {
        (Some(from), Some(to)) if from > to => Err(Error::invalid_request(
            "fromDate must not be after toDate",
        )
        .with_details(json!({
            "field": "fromDate",
            "value": from.to_string(),
            "code": "invalid_date_range",
        }))),
        _ => Ok(()),
    }
}

#[async_trait]
impl<A> AppointmentQuery for AppointmentQueryService<A>
where
    A: AppointmentRepository,
{
    async fn list_appointments(
        &self,
        filter: AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, Error> {
        validate_range(&filter)?;
        let listings = self
            .appointments
            .list(&filter, page)
            .await
            .map_err(map_repository_error)?;
        let now = self.clock.utc();
        Ok(listings.map(|listing| AppointmentView {
            timing: listing.appointment.timing(now),
            appointment: listing.appointment,
            doctor: listing.doctor,
            patient: listing.patient,
        }))
    }
}

#[cfg(test)]
#[path = "appointment_query_service_tests.rs"]
mod tests;
