//! Port for the atomic booking write.
//!
//! A single [`BookingLedger::commit`] call must insert the appointment and
//! its settling transaction, debit the wallet, record the doctor as
//! consulted and store the idempotency record, all or nothing. Adapters
//! re-derive pricing and funds under a lock on the patient row because the
//! service's pre-checks can be stale by the time the write happens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AppointmentId, BookingReceipt, BookingRequest, Doctor, IdempotencyKey, PayloadHash,
    TransactionId,
};

use super::define_port_error;

define_port_error! {
    /// Reasons a booking commit rolls back.
    pub enum BookingLedgerError {
        /// The patient row disappeared.
        PatientMissing => "patient account not found",
        /// Another non-cancelled appointment holds the slot.
        SlotTaken => "slot is already booked",
        /// Balance below the final price at commit time.
        InsufficientFunds { balance: i64, required: i64 } =>
            "insufficient funds: balance {balance}, required {required}",
        /// Wallet and fee currencies differ.
        CurrencyMismatch { wallet: String, fee: String } =>
            "wallet currency {wallet} does not match fee currency {fee}",
        /// A concurrent request stored the same idempotency key first.
        DuplicateIdempotencyKey => "idempotency key already recorded",
        /// Connection could not be established or was lost.
        Connection { message: String } => "booking ledger connection failed: {message}",
        /// Statement failed for any other reason.
        Query { message: String } => "booking ledger query failed: {message}",
    }
}

/// Idempotency key and request digest to store with the booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyClaim {
    /// Client key.
    pub key: IdempotencyKey,
    /// Request digest.
    pub payload_hash: PayloadHash,
}

/// Everything the ledger needs to write a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Identifier for the new appointment.
    pub appointment_id: AppointmentId,
    /// Identifier for the settling transaction.
    pub transaction_id: TransactionId,
    /// Validated request.
    pub request: BookingRequest,
    /// Doctor as loaded by the service; supplies the fee policy.
    pub doctor: Doctor,
    /// Idempotency record to store, if the client sent a key.
    pub idempotency: Option<IdempotencyClaim>,
    /// Commit timestamp.
    pub booked_at: DateTime<Utc>,
}

/// Atomic appointment + payment writer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Write the booking as one unit.
    async fn commit(&self, draft: BookingDraft) -> Result<BookingReceipt, BookingLedgerError>;
}

/// Ledger used when no database is configured. Every commit fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingLedger;

#[async_trait]
impl BookingLedger for FixtureBookingLedger {
    async fn commit(&self, _draft: BookingDraft) -> Result<BookingReceipt, BookingLedgerError> {
        Err(BookingLedgerError::connection("no database configured"))
    }
}
