//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`BookingLedger`], [`TokenVerifier`]) are
//! implemented by outbound adapters and expose typed errors. Driving ports
//! ([`AppointmentBookingCommand`], [`AppointmentQuery`], [`TransactionQuery`])
//! are consumed by inbound adapters and speak the domain [`crate::domain::Error`].
//! Every port ships a `Fixture*` implementation used when no database is
//! configured.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_booking_command;
mod appointment_query;
mod appointment_repository;
mod booking_ledger;
mod doctor_repository;
mod idempotency_repository;
mod patient_repository;
mod token_verifier;
mod transaction_query;
mod transaction_repository;

#[cfg(test)]
pub use appointment_booking_command::MockAppointmentBookingCommand;
pub use appointment_booking_command::{
    AppointmentBookingCommand, FixtureAppointmentBookingCommand,
};
#[cfg(test)]
pub use appointment_query::MockAppointmentQuery;
pub use appointment_query::{AppointmentQuery, AppointmentView, FixtureAppointmentQuery};
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentFilter, AppointmentListing, AppointmentRepository, AppointmentRepositoryError,
    AppointmentScope, FixtureAppointmentRepository,
};
#[cfg(test)]
pub use booking_ledger::MockBookingLedger;
pub use booking_ledger::{
    BookingDraft, BookingLedger, BookingLedgerError, FixtureBookingLedger, IdempotencyClaim,
};
#[cfg(test)]
pub use doctor_repository::MockDoctorRepository;
pub use doctor_repository::{DoctorRepository, DoctorRepositoryError, FixtureDoctorRepository};
#[cfg(test)]
pub use idempotency_repository::MockIdempotencyRepository;
pub use idempotency_repository::{
    FixtureIdempotencyRepository, IdempotencyRepository, IdempotencyRepositoryError,
};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{
    FixturePatientRepository, PatientRepository, PatientRepositoryError,
};
#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use token_verifier::{FixtureTokenVerifier, TokenVerifier, TokenVerifierError};
#[cfg(test)]
pub use transaction_query::MockTransactionQuery;
pub use transaction_query::{FixtureTransactionQuery, TransactionQuery};
#[cfg(test)]
pub use transaction_repository::MockTransactionRepository;
pub use transaction_repository::{
    AppointmentBrief, FixtureTransactionRepository, TransactionListing, TransactionRepository,
    TransactionRepositoryError,
};
