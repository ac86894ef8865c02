//! PostgreSQL-backed `BookingLedger`.
//!
//! One database transaction per booking:
//!
//! 1. lock the patient row (`SELECT ... FOR UPDATE`) and re-price against
//!    its current consultation history;
//! 2. insert the appointment, where `appointments_active_slot_key` rejects a
//!    second live booking for the slot;
//! 3. debit the wallet with a guarded `UPDATE ... WHERE wallet_balance >= $n`;
//! 4. insert the completed payment transaction;
//! 5. record the doctor as consulted on a first visit;
//! 6. store the idempotency record, when the request carried a key.
//!
//! Any failure rolls every step back.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{BookingDraft, BookingLedger, BookingLedgerError, IdempotencyClaim};
use crate::domain::{
    Appointment, AppointmentStatus, BookingReceipt, Money, MoneyError, Patient, PaymentSnapshot,
    PriceQuote, Transaction, TransactionKind, TransactionMetadata, TransactionStatus,
    quote_consultation,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{NewAppointmentRow, NewIdempotencyKeyRow, NewTransactionRow, PatientRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::patient_from_row;
use super::schema::{appointments, idempotency_keys, patients, transactions};

/// Diesel-backed atomic booking writer.
#[derive(Clone)]
pub struct DieselBookingLedger {
    pool: DbPool,
}

impl DieselBookingLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the booking transaction.
#[derive(Debug)]
enum CommitError {
    Diesel(DieselError),
    Rejected(BookingLedgerError),
}

impl From<DieselError> for CommitError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<BookingLedgerError> for CommitError {
    fn from(error: BookingLedgerError) -> Self {
        Self::Rejected(error)
    }
}

fn map_pool_error(error: PoolError) -> BookingLedgerError {
    map_basic_pool_error(error, |message| BookingLedgerError::connection(message))
}

fn map_commit_error(error: CommitError) -> BookingLedgerError {
    match error {
        CommitError::Rejected(rejection) => rejection,
        CommitError::Diesel(error) => map_basic_diesel_error(
            error,
            BookingLedgerError::query,
            BookingLedgerError::connection,
        ),
    }
}

/// Treat a unique violation on the current statement as `rejection`.
fn on_unique_violation(error: DieselError, rejection: BookingLedgerError) -> CommitError {
    match violated_unique_constraint(&error) {
        Some(constraint) => {
            debug!(constraint, %rejection, "unique constraint rejected booking");
            CommitError::Rejected(rejection)
        }
        None => CommitError::Diesel(error),
    }
}

/// Re-derive the price and confirm the wallet can pay it.
fn price_for(draft: &BookingDraft, patient: &Patient) -> Result<PriceQuote, CommitError> {
    let is_first = patient.is_first_consultation_with(draft.doctor.id());
    let quote = quote_consultation(&draft.doctor, is_first)
        .map_err(|err| BookingLedgerError::query(format!("pricing failed: {err}")))?;
    match patient.wallet.covers(&quote.final_amount) {
        Ok(true) => Ok(quote),
        Ok(false) => Err(BookingLedgerError::insufficient_funds(
            patient.wallet.amount(),
            quote.final_amount.amount(),
        )
        .into()),
        Err(MoneyError::CurrencyMismatch { left, right }) => {
            Err(BookingLedgerError::currency_mismatch(left.as_str(), right.as_str()).into())
        }
        Err(other) => Err(BookingLedgerError::query(format!("funds check failed: {other}")).into()),
    }
}

fn build_receipt(draft: &BookingDraft, quote: &PriceQuote) -> BookingReceipt {
    let request = &draft.request;
    let appointment = Appointment {
        id: draft.appointment_id,
        doctor_id: request.doctor_id,
        patient_id: request.patient_id,
        date: request.date,
        slot: request.slot,
        status: AppointmentStatus::Scheduled,
        payment: PaymentSnapshot::from(quote),
        is_first_consultation: quote.is_first_consultation,
        created_at: draft.booked_at,
        updated_at: draft.booked_at,
    };
    let transaction = Transaction {
        id: draft.transaction_id,
        patient_id: request.patient_id,
        doctor_id: Some(request.doctor_id),
        appointment_id: Some(draft.appointment_id),
        kind: TransactionKind::AppointmentPayment,
        amount: quote.final_amount.clone(),
        status: TransactionStatus::Completed,
        metadata: TransactionMetadata::wallet_booking(quote),
        created_at: draft.booked_at,
    };
    BookingReceipt {
        appointment,
        transaction,
    }
}

async fn lock_patient(
    conn: &mut AsyncPgConnection,
    draft: &BookingDraft,
) -> Result<Patient, CommitError> {
    let row: Option<PatientRow> = patients::table
        .find(draft.request.patient_id.as_uuid())
        .select(PatientRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let row = row.ok_or_else(BookingLedgerError::patient_missing)?;
    patient_from_row(row).map_err(|message| BookingLedgerError::query(message).into())
}

async fn insert_appointment(
    conn: &mut AsyncPgConnection,
    appointment: &Appointment,
) -> Result<(), CommitError> {
    let row = NewAppointmentRow {
        id: *appointment.id.as_uuid(),
        doctor_id: *appointment.doctor_id.as_uuid(),
        patient_id: *appointment.patient_id.as_uuid(),
        appointment_date: appointment.date,
        start_time: appointment.slot.start(),
        end_time: appointment.slot.end(),
        status: appointment.status.as_str(),
        original_amount: appointment.payment.original_amount,
        discount_applied: appointment.payment.discount_applied,
        final_amount: appointment.payment.final_amount,
        currency: appointment.payment.currency.as_str(),
        is_first_consultation: appointment.is_first_consultation,
        created_at: appointment.created_at,
        updated_at: appointment.updated_at,
    };
    diesel::insert_into(appointments::table)
        .values(&row)
        .execute(conn)
        .await
        .map_err(|err| on_unique_violation(err, BookingLedgerError::slot_taken()))?;
    Ok(())
}

async fn debit_wallet(
    conn: &mut AsyncPgConnection,
    patient: &Patient,
    amount: &Money,
    draft: &BookingDraft,
) -> Result<(), CommitError> {
    let required = amount.amount();
    let debited = diesel::update(
        patients::table.filter(
            patients::id
                .eq(patient.id.as_uuid())
                .and(patients::wallet_balance.ge(required)),
        ),
    )
    .set((
        patients::wallet_balance.eq(patients::wallet_balance - required),
        patients::updated_at.eq(draft.booked_at),
    ))
    .execute(conn)
    .await?;
    if debited == 0 {
        return Err(
            BookingLedgerError::insufficient_funds(patient.wallet.amount(), required).into(),
        );
    }
    Ok(())
}

async fn insert_transaction(
    conn: &mut AsyncPgConnection,
    transaction: &Transaction,
) -> Result<(), CommitError> {
    let metadata = serde_json::to_value(&transaction.metadata).map_err(|err| {
        BookingLedgerError::query(format!("failed to serialise transaction metadata: {err}"))
    })?;
    let row = NewTransactionRow {
        id: *transaction.id.as_uuid(),
        patient_id: *transaction.patient_id.as_uuid(),
        doctor_id: transaction.doctor_id.map(|id| *id.as_uuid()),
        appointment_id: transaction.appointment_id.map(|id| *id.as_uuid()),
        kind: transaction.kind.as_str(),
        amount: transaction.amount.amount(),
        currency: transaction.amount.currency().as_str(),
        status: transaction.status.as_str(),
        metadata: &metadata,
        created_at: transaction.created_at,
    };
    diesel::insert_into(transactions::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

async fn record_consultation(
    conn: &mut AsyncPgConnection,
    patient: &Patient,
    draft: &BookingDraft,
) -> Result<(), CommitError> {
    let mut consulted: Vec<uuid::Uuid> = patient
        .appointed_doctors
        .iter()
        .map(|id| *id.as_uuid())
        .collect();
    consulted.push(*draft.doctor.id().as_uuid());
    diesel::update(patients::table.find(patient.id.as_uuid()))
        .set((
            patients::appointed_doctors.eq(consulted),
            patients::updated_at.eq(draft.booked_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn store_idempotency_record(
    conn: &mut AsyncPgConnection,
    claim: &IdempotencyClaim,
    draft: &BookingDraft,
    receipt: &BookingReceipt,
) -> Result<(), CommitError> {
    let snapshot = serde_json::to_value(receipt).map_err(|err| {
        BookingLedgerError::query(format!("failed to serialise booking receipt: {err}"))
    })?;
    let row = NewIdempotencyKeyRow {
        key: *claim.key.as_uuid(),
        patient_id: *draft.request.patient_id.as_uuid(),
        payload_hash: claim.payload_hash.as_bytes(),
        response_snapshot: &snapshot,
        created_at: draft.booked_at,
    };
    diesel::insert_into(idempotency_keys::table)
        .values(&row)
        .execute(conn)
        .await
        .map_err(|err| {
            on_unique_violation(err, BookingLedgerError::duplicate_idempotency_key())
        })?;
    Ok(())
}

async fn write_booking(
    conn: &mut AsyncPgConnection,
    draft: &BookingDraft,
) -> Result<BookingReceipt, CommitError> {
    let patient = lock_patient(conn, draft).await?;
    let quote = price_for(draft, &patient)?;
    let receipt = build_receipt(draft, &quote);

    insert_appointment(conn, &receipt.appointment).await?;
    debit_wallet(conn, &patient, &quote.final_amount, draft).await?;
    insert_transaction(conn, &receipt.transaction).await?;
    if quote.is_first_consultation {
        record_consultation(conn, &patient, draft).await?;
    }
    if let Some(claim) = &draft.idempotency {
        store_idempotency_record(conn, claim, draft, &receipt).await?;
    }
    Ok(receipt)
}

#[async_trait]
impl BookingLedger for DieselBookingLedger {
    async fn commit(&self, draft: BookingDraft) -> Result<BookingReceipt, BookingLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let draft = &draft;
        conn.transaction(|conn| {
            async move { write_booking(conn, draft).await }.scope_boxed()
        })
        .await
        .map_err(map_commit_error)
    }
}
