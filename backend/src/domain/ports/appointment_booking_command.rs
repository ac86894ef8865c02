//! Driving port for booking appointments.
//!
//! Inbound adapters hand over a validated [`BookingRequest`]; the
//! implementation prices the consultation, debits the wallet and writes the
//! appointment and its payment as one unit.

use async_trait::async_trait;

use crate::domain::{BookingOutcome, BookingRequest, Error, IdempotencyKey};

/// Domain use-case port for booking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentBookingCommand: Send + Sync {
    /// Book a consultation.
    ///
    /// # Errors
    ///
    /// - `not_found` when the doctor or patient does not exist.
    /// - `slot_unavailable` when the slot is taken.
    /// - `insufficient_funds` when the wallet cannot cover the final price.
    /// - `conflict` when `idempotency_key` was used for a different request.
    /// - `service_unavailable` or `internal_error` on storage failures.
    async fn book(
        &self,
        request: BookingRequest,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<BookingOutcome, Error>;
}

/// Booking port used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentBookingCommand;

#[async_trait]
impl AppointmentBookingCommand for FixtureAppointmentBookingCommand {
    async fn book(
        &self,
        _request: BookingRequest,
        _idempotency_key: Option<IdempotencyKey>,
    ) -> Result<BookingOutcome, Error> {
        Err(Error::service_unavailable("booking requires a database"))
    }
}
