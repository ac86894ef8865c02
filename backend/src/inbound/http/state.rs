//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AppointmentBookingCommand, AppointmentQuery, FixtureAppointmentBookingCommand,
    FixtureAppointmentQuery, FixtureTokenVerifier, FixtureTransactionQuery, TokenVerifier,
    TransactionQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resolves bearer tokens to principals.
    pub tokens: Arc<dyn TokenVerifier>,
    /// Books consultations.
    pub booking: Arc<dyn AppointmentBookingCommand>,
    /// Lists appointments.
    pub appointments: Arc<dyn AppointmentQuery>,
    /// Lists transactions.
    pub transactions: Arc<dyn TransactionQuery>,
}

impl HttpState {
    /// State backed entirely by fixtures: no token verifies, bookings fail
    /// with `503` and listings are empty.
    ///
    /// # Examples
    /// ```
    /// use telecare::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::fixtures();
    /// let _booking = state.booking.clone();
    /// ```
    pub fn fixtures() -> Self {
        Self {
            tokens: Arc::new(FixtureTokenVerifier),
            booking: Arc::new(FixtureAppointmentBookingCommand),
            appointments: Arc::new(FixtureAppointmentQuery),
            transactions: Arc::new(FixtureTransactionQuery),
        }
    }

    /// Replace the token verifier.
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenVerifier>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replace the booking command.
    pub fn with_booking(mut self, booking: Arc<dyn AppointmentBookingCommand>) -> Self {
        self.booking = booking;
        self
    }

    /// Replace the appointment query.
    pub fn with_appointments(mut self, appointments: Arc<dyn AppointmentQuery>) -> Self {
        self.appointments = appointments;
        self
    }

    /// Replace the transaction query.
    pub fn with_transactions(mut self, transactions: Arc<dyn TransactionQuery>) -> Self {
        self.transactions = transactions;
        self
    }
}
