//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live in
//! `row_conversions.rs`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{access_tokens, appointments, doctors, idempotency_keys, patients, transactions};

/// Doctor columns needed to price a consultation.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DoctorRow {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub fee_amount: i64,
    pub fee_currency: String,
    pub discount_percentage: Option<i16>,
    pub discount_max_amount: Option<i64>,
}

/// Doctor columns shown next to listings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DoctorSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
}

/// Patient columns needed to book.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub wallet_balance: i64,
    pub wallet_currency: String,
    pub appointed_doctors: Vec<Uuid>,
}

/// Patient columns shown next to listings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

// ---------------------------------------------------------------------------
// Appointment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the appointments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub original_amount: i64,
    pub discount_applied: i64,
    pub final_amount: i64,
    pub currency: String,
    pub is_first_consultation: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for booking an appointment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub(crate) struct NewAppointmentRow<'a> {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: &'a str,
    pub original_amount: i64,
    pub discount_applied: i64,
    pub final_amount: i64,
    pub currency: &'a str,
    pub is_first_consultation: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Transaction models
// ---------------------------------------------------------------------------

/// Row struct for reading from the transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub kind: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for recording a transaction.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub(crate) struct NewTransactionRow<'a> {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub kind: &'a str,
    pub amount: i64,
    pub currency: &'a str,
    pub status: &'a str,
    pub metadata: &'a serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Access token models
// ---------------------------------------------------------------------------

/// Principal columns of a live access token.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = access_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccessTokenRow {
    pub principal_id: Uuid,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Idempotency key models
// ---------------------------------------------------------------------------

/// Row struct for reading from the idempotency_keys table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = idempotency_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdempotencyKeyRow {
    pub key: Uuid,
    pub patient_id: Uuid,
    pub payload_hash: Vec<u8>,
    pub response_snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for storing a booking receipt under its key.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = idempotency_keys)]
pub(crate) struct NewIdempotencyKeyRow<'a> {
    pub key: Uuid,
    pub patient_id: Uuid,
    pub payload_hash: &'a [u8],
    pub response_snapshot: &'a serde_json::Value,
    pub created_at: DateTime<Utc>,
}
