//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's driven ports, backed by
//! PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between rows and domain
//!   types; pricing and validation stay in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **One transaction per booking**: [`DieselBookingLedger`] is the only
//!   writer of appointments, transactions, wallets and idempotency records.
//!
//! ```ignore
//! use telecare::outbound::persistence::{DbPool, DieselBookingLedger, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/telecare")).await?;
//! let ledger = DieselBookingLedger::new(pool);
//! ```

mod diesel_appointment_repository;
mod diesel_basic_error_mapping;
mod diesel_booking_ledger;
mod diesel_doctor_repository;
mod diesel_idempotency_repository;
mod diesel_patient_repository;
mod diesel_token_verifier;
mod diesel_transaction_repository;
mod migrations;
mod models;
mod pool;
mod row_conversions;
mod schema;

pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use diesel_booking_ledger::DieselBookingLedger;
pub use diesel_doctor_repository::DieselDoctorRepository;
pub use diesel_idempotency_repository::DieselIdempotencyRepository;
pub use diesel_patient_repository::DieselPatientRepository;
pub use diesel_token_verifier::DieselTokenVerifier;
pub use diesel_transaction_repository::DieselTransactionRepository;
pub use migrations::{MIGRATIONS, MigrationError, apply_migrations, apply_migrations_in_background};
pub use pool::{DbPool, PoolConfig, PoolError};
