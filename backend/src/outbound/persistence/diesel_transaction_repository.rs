//! PostgreSQL-backed `TransactionRepository`.
//!
//! Transactions are read newest first and decorated with their appointment
//! and counterparty using one `= ANY` lookup per table.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    AppointmentBrief, TransactionListing, TransactionRepository, TransactionRepositoryError,
};
use crate::domain::{Appointment, DoctorId, PatientId, Transaction};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AppointmentRow, DoctorSummaryRow, PatientSummaryRow, TransactionRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{
    appointment_brief, appointment_from_row, doctor_summary_from_row, patient_summary_from_row,
    transaction_from_row,
};
use super::schema::{appointments, doctors, patients, transactions};

/// Diesel-backed transaction history.
#[derive(Clone)]
pub struct DieselTransactionRepository {
    pool: DbPool,
}

impl DieselTransactionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TransactionRepositoryError {
    map_basic_pool_error(error, |message| TransactionRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> TransactionRepositoryError {
    map_basic_diesel_error(
        error,
        TransactionRepositoryError::query,
        TransactionRepositoryError::connection,
    )
}

fn convert_transactions(rows: Vec<TransactionRow>) -> Result<Vec<Transaction>, TransactionRepositoryError> {
    rows.into_iter()
        .map(transaction_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(TransactionRepositoryError::query)
}

fn distinct<I: IntoIterator<Item = Uuid>>(ids: I) -> Vec<Uuid> {
    ids.into_iter().collect::<HashSet<_>>().into_iter().collect()
}

async fn load_appointments(
    conn: &mut AsyncPgConnection,
    transactions: &[Transaction],
) -> Result<HashMap<Uuid, Appointment>, TransactionRepositoryError> {
    let ids = distinct(
        transactions
            .iter()
            .filter_map(|t| t.appointment_id.map(|id| *id.as_uuid())),
    );
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<AppointmentRow> = appointments::table
        .filter(appointments::id.eq_any(ids))
        .select(AppointmentRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    rows.into_iter()
        .map(|row| appointment_from_row(row).map(|a| (*a.id.as_uuid(), a)))
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(TransactionRepositoryError::query)
}

fn brief_for(
    transaction: &Transaction,
    appointments: &HashMap<Uuid, Appointment>,
) -> Option<AppointmentBrief> {
    transaction
        .appointment_id
        .and_then(|id| appointments.get(id.as_uuid()))
        .map(appointment_brief)
}

/// Doctor of the settled appointment, falling back to the transaction's own
/// doctor reference.
fn doctor_uuid(transaction: &Transaction, appointments: &HashMap<Uuid, Appointment>) -> Option<Uuid> {
    transaction
        .appointment_id
        .and_then(|id| appointments.get(id.as_uuid()))
        .map(|a| *a.doctor_id.as_uuid())
        .or_else(|| transaction.doctor_id.map(|id| *id.as_uuid()))
}

#[async_trait]
impl TransactionRepository for DieselTransactionRepository {
    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<TransactionListing>, TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TransactionRow> = transactions::table
            .filter(transactions::patient_id.eq(patient_id.as_uuid()))
            .order(transactions::created_at.desc())
            .select(TransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let transactions = convert_transactions(rows)?;
        let appointments = load_appointments(&mut conn, &transactions).await?;

        let doctor_ids = distinct(
            transactions
                .iter()
                .filter_map(|t| doctor_uuid(t, &appointments)),
        );
        let doctors: HashMap<Uuid, DoctorSummaryRow> = doctors::table
            .filter(doctors::id.eq_any(doctor_ids))
            .select(DoctorSummaryRow::as_select())
            .load::<DoctorSummaryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        Ok(transactions
            .into_iter()
            .map(|transaction| TransactionListing {
                appointment: brief_for(&transaction, &appointments),
                doctor: doctor_uuid(&transaction, &appointments)
                    .and_then(|id| doctors.get(&id).cloned())
                    .map(doctor_summary_from_row),
                patient: None,
                transaction,
            })
            .collect())
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
    ) -> Result<Vec<TransactionListing>, TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TransactionRow> = transactions::table
            .filter(transactions::doctor_id.eq(doctor_id.as_uuid()))
            .order(transactions::created_at.desc())
            .select(TransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let transactions = convert_transactions(rows)?;
        let appointments = load_appointments(&mut conn, &transactions).await?;

        let patient_ids = distinct(transactions.iter().map(|t| *t.patient_id.as_uuid()));
        let patients: HashMap<Uuid, PatientSummaryRow> = patients::table
            .filter(patients::id.eq_any(patient_ids))
            .select(PatientSummaryRow::as_select())
            .load::<PatientSummaryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        Ok(transactions
            .into_iter()
            .map(|transaction| TransactionListing {
                appointment: brief_for(&transaction, &appointments),
                doctor: None,
                patient: patients
                    .get(transaction.patient_id.as_uuid())
                    .cloned()
                    .map(patient_summary_from_row),
                transaction,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AppointmentId, AppointmentStatus, Currency, Money, PaymentSnapshot, TimeSlot,
        TransactionId, TransactionKind, TransactionMetadata, TransactionStatus,
    };
    use chrono::{NaiveDate, Utc};
    use rstest::rstest;

    fn transaction(appointment_id: Option<AppointmentId>, doctor_id: Option<DoctorId>) -> Transaction {
        Transaction {
            id: TransactionId::random(),
            patient_id: PatientId::random(),
            doctor_id,
            appointment_id,
            kind: TransactionKind::AppointmentPayment,
            amount: Money::new(42_000, Currency::inr()).expect("valid amount"),
            status: TransactionStatus::Completed,
            metadata: TransactionMetadata::default(),
            created_at: Utc::now(),
        }
    }

    fn appointment(id: AppointmentId, doctor_id: DoctorId) -> Appointment {
        Appointment {
            id,
            doctor_id,
            patient_id: PatientId::random(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date"),
            slot: TimeSlot::parse("09:00", "09:30").expect("valid slot"),
            status: AppointmentStatus::Scheduled,
            payment: PaymentSnapshot {
                original_amount: 42_000,
                discount_applied: 0,
                final_amount: 42_000,
                currency: Currency::inr(),
            },
            is_first_consultation: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn doctor_comes_from_the_appointment_when_present() {
        let appointment_id = AppointmentId::random();
        let appointment_doctor = DoctorId::random();
        let appointments = HashMap::from([(
            *appointment_id.as_uuid(),
            appointment(appointment_id, appointment_doctor),
        )]);
        let tx = transaction(Some(appointment_id), Some(DoctorId::random()));

        assert_eq!(doctor_uuid(&tx, &appointments), Some(*appointment_doctor.as_uuid()));
        assert_eq!(brief_for(&tx, &appointments).map(|b| b.id), Some(appointment_id));
    }

    #[rstest]
    fn doctor_falls_back_to_the_transaction() {
        let doctor = DoctorId::random();
        let tx = transaction(None, Some(doctor));
        assert_eq!(doctor_uuid(&tx, &HashMap::new()), Some(*doctor.as_uuid()));
        assert!(brief_for(&tx, &HashMap::new()).is_none());
    }

    #[rstest]
    fn distinct_drops_repeats() {
        let id = Uuid::new_v4();
        assert_eq!(distinct([id, id]), vec![id]);
    }
}
