//! Appointment booking orchestration.
//!
//! The service validates the request against current state and then hands a
//! [`BookingDraft`] to the [`BookingLedger`], which performs the write as one
//! database transaction. The pre-checks exist to fail fast with precise
//! errors; the ledger remains the authority on slot uniqueness and funds.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AppointmentBookingCommand, AppointmentRepository, AppointmentRepositoryError, BookingDraft,
    BookingLedger, BookingLedgerError, DoctorRepository, DoctorRepositoryError, IdempotencyClaim,
    IdempotencyRepository, IdempotencyRepositoryError, PatientRepository, PatientRepositoryError,
};
use crate::domain::{
    AppointmentId, BookingOutcome, BookingReceipt, BookingRequest, DATE_FORMAT, Doctor, Error,
    ErrorCode, IdempotencyKey, IdempotencyLookupQuery, IdempotencyLookupResult, Money, MoneyError,
    Patient, TransactionId, canonicalize_and_hash, quote_consultation,
};

/// Driven ports the booking flow depends on.
pub struct BookingPorts<D, P, A, L, I> {
    /// Doctor directory.
    pub doctors: Arc<D>,
    /// Patient accounts.
    pub patients: Arc<P>,
    /// Appointment ledger reads.
    pub appointments: Arc<A>,
    /// Atomic booking writer.
    pub ledger: Arc<L>,
    /// Idempotency record reads.
    pub idempotency: Arc<I>,
}

/// Booking service implementing [`AppointmentBookingCommand`].
pub struct AppointmentBookingService<D, P, A, L, I> {
    ports: BookingPorts<D, P, A, L, I>,
    clock: Arc<dyn Clock>,
}

impl<D, P, A, L, I> AppointmentBookingService<D, P, A, L, I> {
    /// Create a service over the given ports.
    pub fn new(ports: BookingPorts<D, P, A, L, I>, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }
}

fn map_doctor_error(error: DoctorRepositoryError) -> Error {
    match error {
        DoctorRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("doctor repository unavailable: {message}"))
        }
        DoctorRepositoryError::Query { message } => {
            Error::internal(format!("doctor repository error: {message}"))
        }
    }
}

fn map_patient_error(error: PatientRepositoryError) -> Error {
    match error {
        PatientRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("patient repository unavailable: {message}"))
        }
        PatientRepositoryError::Query { message } => {
            Error::internal(format!("patient repository error: {message}"))
        }
    }
}

fn map_appointment_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentRepositoryError::Query { message } => {
            Error::internal(format!("appointment repository error: {message}"))
        }
    }
}

fn map_idempotency_error(error: IdempotencyRepositoryError) -> Error {
    match error {
        IdempotencyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("idempotency repository unavailable: {message}"))
        }
        IdempotencyRepositoryError::Query { message } => {
            Error::internal(format!("idempotency repository error: {message}"))
        }
    }
}

fn slot_unavailable(request: &BookingRequest) -> Error {
    Error::slot_unavailable("the requested slot is already booked").with_details(json!({
        "doctorId": request.doctor_id,
        "date": request.date.format(DATE_FORMAT).to_string(),
        "slot": request.slot,
    }))
}

fn insufficient_funds(balance: i64, required: i64) -> Error {
    Error::insufficient_funds("wallet balance does not cover the consultation fee")
        .with_details(json!({ "balance": balance, "required": required }))
}

fn currency_mismatch(wallet: &str, fee: &str) -> Error {
    Error::invalid_request("wallet currency does not match the consultation fee").with_details(
        json!({
            "field": "wallet",
            "value": wallet,
            "code": "currency_mismatch",
            "feeCurrency": fee,
        }),
    )
}

fn map_ledger_error(error: BookingLedgerError, request: &BookingRequest) -> Error {
    match error {
        BookingLedgerError::PatientMissing => Error::not_found("patient not found"),
        BookingLedgerError::SlotTaken => slot_unavailable(request),
        BookingLedgerError::InsufficientFunds { balance, required } => {
            insufficient_funds(balance, required)
        }
        BookingLedgerError::CurrencyMismatch { wallet, fee } => currency_mismatch(&wallet, &fee),
        BookingLedgerError::DuplicateIdempotencyKey => {
            Error::conflict("idempotency key already used")
        }
        BookingLedgerError::Connection { message } => {
            Error::service_unavailable(format!("booking ledger unavailable: {message}"))
        }
        BookingLedgerError::Query { message } => {
            Error::internal(format!("booking ledger error: {message}"))
        }
    }
}

/// Check the wallet covers `required`, reporting minor-unit amounts.
fn ensure_funds(wallet: &Money, required: &Money) -> Result<(), Error> {
    match wallet.covers(required) {
        Ok(true) => Ok(()),
        Ok(false) => Err(insufficient_funds(wallet.amount(), required.amount())),
        Err(MoneyError::CurrencyMismatch { left, right }) => {
            Err(currency_mismatch(left.as_str(), right.as_str()))
        }
        Err(other) => Err(Error::internal(format!("funds check failed: {other}"))),
    }
}

/// Rejections a loser sees once a concurrent request holding the same
/// idempotency key has committed.
fn lost_idempotency_race(error: &Error) -> bool {
    matches!(
        error.code(),
        ErrorCode::SlotUnavailable | ErrorCode::InsufficientFunds | ErrorCode::Conflict
    )
}

impl<D, P, A, L, I> AppointmentBookingService<D, P, A, L, I>
where
    D: DoctorRepository,
    P: PatientRepository,
    A: AppointmentRepository,
    L: BookingLedger,
    I: IdempotencyRepository,
{
    async fn load_doctor(&self, request: &BookingRequest) -> Result<Doctor, Error> {
        self.ports
            .doctors
            .find_by_id(&request.doctor_id)
            .await
            .map_err(map_doctor_error)?
            .ok_or_else(|| {
                Error::not_found("doctor not found")
                    .with_details(json!({ "doctorId": request.doctor_id }))
            })
    }

    async fn load_patient(&self, request: &BookingRequest) -> Result<Patient, Error> {
        self.ports
            .patients
            .find_by_id(&request.patient_id)
            .await
            .map_err(map_patient_error)?
            .ok_or_else(|| Error::not_found("patient not found"))
    }

    async fn ensure_slot_free(&self, request: &BookingRequest) -> Result<(), Error> {
        let existing = self
            .ports
            .appointments
            .find_active_in_slot(&request.doctor_id, request.date, &request.slot)
            .await
            .map_err(map_appointment_error)?;
        match existing {
            Some(_) => Err(slot_unavailable(request)),
            None => Ok(()),
        }
    }

    async fn book_fresh(
        &self,
        request: &BookingRequest,
        lookup: Option<&IdempotencyLookupQuery>,
    ) -> Result<BookingOutcome, Error> {
        let (doctor, patient) =
            tokio::try_join!(self.load_doctor(request), self.load_patient(request))?;
        self.ensure_slot_free(request).await?;

        let quote = quote_consultation(&doctor, patient.is_first_consultation_with(doctor.id()))
            .map_err(|err| Error::internal(format!("pricing failed: {err}")))?;
        ensure_funds(&patient.wallet, &quote.final_amount)?;

        let draft = BookingDraft {
            appointment_id: AppointmentId::random(),
            transaction_id: TransactionId::random(),
            request: request.clone(),
            doctor,
            idempotency: lookup.map(|query| IdempotencyClaim {
                key: query.key.clone(),
                payload_hash: query.payload_hash,
            }),
            booked_at: self.clock.utc(),
        };

        let receipt = self
            .ports
            .ledger
            .commit(draft)
            .await
            .map_err(|err| map_ledger_error(err, request))?;
        info!(
            appointment_id = %receipt.appointment.id,
            doctor_id = %request.doctor_id,
            patient_id = %request.patient_id,
            final_amount = receipt.appointment.payment.final_amount,
            "appointment booked"
        );
        Ok(BookingOutcome {
            receipt,
            replayed: false,
        })
    }

    /// Replay a stored receipt, reject a conflicting reuse, or report that
    /// the key is unused.
    async fn replay(&self, query: &IdempotencyLookupQuery) -> Result<Option<BookingOutcome>, Error> {
        let lookup = self
            .ports
            .idempotency
            .lookup(query)
            .await
            .map_err(map_idempotency_error)?;
        match lookup {
            IdempotencyLookupResult::NotFound => Ok(None),
            IdempotencyLookupResult::MatchingPayload(record) => {
                let receipt: BookingReceipt = serde_json::from_value(record.response_snapshot)
                    .map_err(|err| {
                        Error::internal(format!("failed to deserialize booking receipt: {err}"))
                    })?;
                Ok(Some(BookingOutcome {
                    receipt,
                    replayed: true,
                }))
            }
            IdempotencyLookupResult::ConflictingPayload(_) => Err(Error::conflict(
                "idempotency key already used for a different booking",
            )
            .with_details(json!({
                "idempotencyKey": query.key,
                "code": "idempotency_key_conflict",
            }))),
        }
    }

    fn claim_for(
        request: &BookingRequest,
        key: IdempotencyKey,
    ) -> Result<IdempotencyLookupQuery, Error> {
        let payload_hash = canonicalize_and_hash(&request.idempotency_payload())
            .map_err(|err| Error::internal(format!("failed to hash booking request: {err}")))?;
        Ok(IdempotencyLookupQuery {
            key,
            patient_id: request.patient_id,
            payload_hash,
        })
    }
}

#[async_trait]
impl<D, P, A, L, I> AppointmentBookingCommand for AppointmentBookingService<D, P, A, L, I>
where
    D: DoctorRepository,
    P: PatientRepository,
    A: AppointmentRepository,
    L: BookingLedger,
    I: IdempotencyRepository,
{
    async fn book(
        &self,
        request: BookingRequest,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<BookingOutcome, Error> {
        let lookup = idempotency_key
            .map(|key| Self::claim_for(&request, key))
            .transpose()?;
        if let Some(query) = &lookup {
            if let Some(outcome) = self.replay(query).await? {
                return Ok(outcome);
            }
        }

        match self.book_fresh(&request, lookup.as_ref()).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => match &lookup {
                Some(query) if lost_idempotency_race(&err) => match self.replay(query).await? {
                    Some(outcome) => {
                        warn!(
                            patient_id = %request.patient_id,
                            code = ?err.code(),
                            "idempotency key raced; replaying winner"
                        );
                        Ok(outcome)
                    }
                    None => Err(err),
                },
                _ => Err(err),
            },
        }
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
