//! Domain primitives, aggregates and services.
//!
//! Purpose: model the booking ledger (doctors, patients, appointments,
//! transactions) with strongly typed values and keep the booking invariants
//! next to the types that carry them. Persistence and HTTP concerns live in
//! `outbound` and `inbound`; this module only talks to them through
//! [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - [`AppointmentBookingService`]: books a consultation and debits the
//!   wallet.
//! - [`AppointmentQueryService`] / [`TransactionQueryService`]: read side.

pub mod appointment;
pub mod appointment_query_service;
pub mod booking;
pub mod booking_service;
pub mod doctor;
pub mod error;
pub mod idempotency;
pub mod ids;
pub mod money;
pub mod patient;
pub mod ports;
pub mod pricing;
pub mod principal;
pub mod slot;
pub mod trace_id;
pub mod transaction;
pub mod transaction_query_service;

pub use self::appointment::{
    Appointment, AppointmentStatus, AppointmentTiming, CHANGE_WINDOW_HOURS,
    ParseAppointmentStatusError, PaymentSnapshot,
};
pub use self::appointment_query_service::AppointmentQueryService;
pub use self::booking::{BookingOutcome, BookingReceipt, BookingRequest, DATE_FORMAT};
pub use self::booking_service::{AppointmentBookingService, BookingPorts};
pub use self::doctor::{Doctor, DoctorDraft, DoctorSummary, DoctorValidationError, FirstTimeDiscount};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::idempotency::{
    IdempotencyConfig, IdempotencyKey, IdempotencyKeyValidationError, IdempotencyLookupQuery,
    IdempotencyLookupResult, IdempotencyRecord, PayloadHash, PayloadHashError,
    canonicalize_and_hash,
};
pub use self::ids::{AppointmentId, DoctorId, PatientId, TransactionId};
pub use self::money::{Currency, Money, MoneyError};
pub use self::patient::{Patient, PatientSummary};
pub use self::pricing::{PriceQuote, quote_consultation};
pub use self::principal::{
    BearerToken, BearerTokenError, ParseRoleError, Principal, Role, TokenDigest,
};
pub use self::slot::{SlotValidationError, TimeSlot};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transaction::{
    ParseTransactionFieldError, Transaction, TransactionKind, TransactionMetadata,
    TransactionStatus, WALLET_PAYMENT_METHOD,
};
pub use self::transaction_query_service::TransactionQueryService;

