//! Conversions from Diesel rows into domain types.
//!
//! Stored values are validated on the way out; a failure means the database
//! holds data the domain cannot represent, so every error is reported as a
//! message that adapters wrap in their query-error variant.

use crate::domain::ports::AppointmentBrief;
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, Currency, Doctor, DoctorDraft, DoctorId,
    DoctorSummary, FirstTimeDiscount, Money, Patient, PatientId, PatientSummary, PaymentSnapshot,
    TimeSlot, Transaction, TransactionId, TransactionMetadata,
};

use super::models::{
    AppointmentRow, DoctorRow, DoctorSummaryRow, PatientRow, PatientSummaryRow, TransactionRow,
};

fn money(amount: i64, currency: &str) -> Result<Money, String> {
    let currency = Currency::new(currency).map_err(|err| format!("invalid currency: {err}"))?;
    Money::new(amount, currency).map_err(|err| format!("invalid amount: {err}"))
}

pub(crate) fn doctor_from_row(row: DoctorRow) -> Result<Doctor, String> {
    let fee = money(row.fee_amount, &row.fee_currency)?;
    let first_time_discount = match (row.discount_percentage, row.discount_max_amount) {
        (Some(percentage), Some(cap)) => {
            let percentage = u8::try_from(percentage)
                .map_err(|_| format!("discount percentage out of range: {percentage}"))?;
            let cap = money(cap, &row.fee_currency)?;
            Some(
                FirstTimeDiscount::new(percentage, cap)
                    .map_err(|err| format!("invalid discount: {err}"))?,
            )
        }
        (None, None) => None,
        _ => return Err("discount percentage and cap must be set together".to_owned()),
    };
    Doctor::new(DoctorDraft {
        id: DoctorId::from_uuid(row.id),
        name: row.name,
        specialization: row.specialization,
        fee,
        first_time_discount,
    })
    .map_err(|err| format!("invalid doctor record: {err}"))
}

pub(crate) fn patient_from_row(row: PatientRow) -> Result<Patient, String> {
    Ok(Patient {
        id: PatientId::from_uuid(row.id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        wallet: money(row.wallet_balance, &row.wallet_currency)?,
        appointed_doctors: row
            .appointed_doctors
            .into_iter()
            .map(DoctorId::from_uuid)
            .collect(),
    })
}

pub(crate) fn doctor_summary_from_row(row: DoctorSummaryRow) -> DoctorSummary {
    DoctorSummary {
        id: DoctorId::from_uuid(row.id),
        name: row.name,
        specialization: row.specialization,
    }
}

pub(crate) fn patient_summary_from_row(row: PatientSummaryRow) -> PatientSummary {
    PatientSummary {
        id: PatientId::from_uuid(row.id),
        name: row.name,
        email: row.email,
        phone: row.phone,
    }
}

pub(crate) fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, String> {
    let status: AppointmentStatus = row.status.parse().map_err(|err| format!("{err}"))?;
    let slot = TimeSlot::new(row.start_time, row.end_time)
        .map_err(|err| format!("invalid stored slot: {err}"))?;
    let currency =
        Currency::new(row.currency).map_err(|err| format!("invalid currency: {err}"))?;
    Ok(Appointment {
        id: AppointmentId::from_uuid(row.id),
        doctor_id: DoctorId::from_uuid(row.doctor_id),
        patient_id: PatientId::from_uuid(row.patient_id),
        date: row.appointment_date,
        slot,
        status,
        payment: PaymentSnapshot {
            original_amount: row.original_amount,
            discount_applied: row.discount_applied,
            final_amount: row.final_amount,
            currency,
        },
        is_first_consultation: row.is_first_consultation,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn appointment_brief(appointment: &Appointment) -> AppointmentBrief {
    AppointmentBrief {
        id: appointment.id,
        date: appointment.date,
        slot: appointment.slot,
        status: appointment.status,
    }
}

pub(crate) fn transaction_from_row(row: TransactionRow) -> Result<Transaction, String> {
    let metadata: TransactionMetadata = serde_json::from_value(row.metadata)
        .map_err(|err| format!("invalid transaction metadata: {err}"))?;
    Ok(Transaction {
        id: TransactionId::from_uuid(row.id),
        patient_id: PatientId::from_uuid(row.patient_id),
        doctor_id: row.doctor_id.map(DoctorId::from_uuid),
        appointment_id: row.appointment_id.map(AppointmentId::from_uuid),
        kind: row.kind.parse().map_err(|err| format!("{err}"))?,
        amount: money(row.amount, &row.currency)?,
        status: row.status.parse().map_err(|err| format!("{err}"))?,
        metadata,
        created_at: row.created_at,
    })
}
