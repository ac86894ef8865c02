//! Builders wiring domain services onto persistence adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use telecare::domain::ports::IdempotencyRepository;
use telecare::domain::{
    AppointmentBookingService, AppointmentQueryService, BookingPorts, TransactionQueryService,
};
use telecare::inbound::http::state::HttpState;
use telecare::outbound::persistence::{
    DbPool, DieselAppointmentRepository, DieselBookingLedger, DieselDoctorRepository,
    DieselIdempotencyRepository, DieselPatientRepository, DieselTokenVerifier,
    DieselTransactionRepository,
};

use super::ServerConfig;

fn build_db_state(pool: &DbPool, clock: Arc<dyn Clock>) -> HttpState {
    let appointments = Arc::new(DieselAppointmentRepository::new(pool.clone()));
    let booking = AppointmentBookingService::new(
        BookingPorts {
            doctors: Arc::new(DieselDoctorRepository::new(pool.clone())),
            patients: Arc::new(DieselPatientRepository::new(pool.clone())),
            appointments: appointments.clone(),
            ledger: Arc::new(DieselBookingLedger::new(pool.clone())),
            idempotency: Arc::new(DieselIdempotencyRepository::new(pool.clone())),
        },
        clock.clone(),
    );
    let transactions =
        TransactionQueryService::new(Arc::new(DieselTransactionRepository::new(pool.clone())));

    HttpState {
        tokens: Arc::new(DieselTokenVerifier::new(pool.clone(), clock.clone())),
        booking: Arc::new(booking),
        appointments: Arc::new(AppointmentQueryService::new(appointments, clock)),
        transactions: Arc::new(transactions),
    }
}

/// Build handler state from the configured adapters, falling back to
/// fixtures when no database is attached.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => build_db_state(pool, Arc::new(DefaultClock)),
        None => {
            warn!("no database configured; serving fixture ports");
            HttpState::fixtures()
        }
    };
    web::Data::new(state)
}

/// Delete idempotency records older than the configured retention window.
///
/// Failures are logged, not propagated.
pub(super) async fn purge_expired_idempotency_records(config: &ServerConfig) {
    let Some(pool) = &config.db_pool else {
        return;
    };
    let cutoff = config.idempotency.cutoff(DefaultClock.utc());
    match DieselIdempotencyRepository::new(pool.clone())
        .cleanup_expired(cutoff)
        .await
    {
        Ok(purged) => info!(purged, %cutoff, "purged expired idempotency records"),
        Err(err) => warn!(error = %err, "idempotency purge failed"),
    }
}
