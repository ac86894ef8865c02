//! Appointment DTOs and parsing helpers.

use pagination::{PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{AppointmentFilter, AppointmentScope, AppointmentView};
use crate::domain::{
    Appointment, BookingReceipt, BookingRequest, DATE_FORMAT, DoctorId, DoctorSummary, Error,
    PatientId, PatientSummary, PaymentSnapshot, TimeSlot, Transaction, TransactionMetadata,
};
use crate::inbound::http::validation::{
    DATE, DOCTOR_ID, END_TIME, FROM_DATE, SLOT, START_TIME, TO_DATE, parse_date, parse_doctor_id,
    parse_optional_date, parse_page, parse_slot, parse_status, require,
};

/// Requested consultation window.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    /// Start time, `HH:MM`.
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    /// End time, `HH:MM`.
    #[schema(example = "09:30")]
    pub end_time: Option<String>,
}

/// Request payload for booking a consultation.
///
/// The booking patient is always the authenticated caller.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    /// Doctor to book.
    #[schema(format = "uuid")]
    pub doctor_id: Option<String>,
    /// Consultation date, `YYYY-MM-DD`.
    #[schema(format = "date", example = "2024-06-10")]
    pub date: Option<String>,
    /// Consultation window.
    pub slot: Option<SlotRequest>,
}

/// Filters shared by appointment list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AppointmentListQuery {
    /// One-based page number. Defaults to 1.
    #[param(minimum = 1)]
    pub page: Option<u32>,
    /// Page size between 1 and 100. Defaults to 10.
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<u32>,
    /// `scheduled`, `completed` or `cancelled`.
    pub status: Option<String>,
    /// Earliest consultation date, inclusive.
    #[param(format = "date")]
    pub from_date: Option<String>,
    /// Latest consultation date, inclusive.
    #[param(format = "date")]
    pub to_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DoctorPath {
    pub(super) doctor_id: String,
}

/// Consultation window as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "09:30")]
    pub end_time: String,
}

impl From<TimeSlot> for SlotResponse {
    fn from(slot: TimeSlot) -> Self {
        Self {
            start_time: slot.start_time(),
            end_time: slot.end_time(),
        }
    }
}

/// Price breakdown frozen at booking time, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub original_amount: i64,
    pub discount_applied: i64,
    pub final_amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
}

impl From<PaymentSnapshot> for PaymentResponse {
    fn from(payment: PaymentSnapshot) -> Self {
        Self {
            original_amount: payment.original_amount,
            discount_applied: payment.discount_applied,
            final_amount: payment.final_amount,
            currency: payment.currency.as_str().to_owned(),
        }
    }
}

/// Doctor display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummaryResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub specialization: String,
}

impl From<DoctorSummary> for DoctorSummaryResponse {
    fn from(doctor: DoctorSummary) -> Self {
        Self {
            id: doctor.id.to_string(),
            name: doctor.name,
            specialization: doctor.specialization,
        }
    }
}

/// Patient profile fields shown to doctors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummaryResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<PatientSummary> for PatientSummaryResponse {
    fn from(patient: PatientSummary) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name,
            email: patient.email,
            phone: patient.phone,
        }
    }
}

/// A booked consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub doctor_id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "date", example = "2024-06-10")]
    pub date: String,
    pub slot: SlotResponse,
    #[schema(example = "scheduled")]
    pub status: String,
    pub payment: PaymentResponse,
    pub is_first_consultation: bool,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            doctor_id: appointment.doctor_id.to_string(),
            patient_id: appointment.patient_id.to_string(),
            date: appointment.date.format(DATE_FORMAT).to_string(),
            slot: appointment.slot.into(),
            status: appointment.status.as_str().to_owned(),
            payment: appointment.payment.into(),
            is_first_consultation: appointment.is_first_consultation,
            created_at: appointment.created_at.to_rfc3339(),
            updated_at: appointment.updated_at.to_rfc3339(),
        }
    }
}

/// Money movement as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "uuid")]
    pub doctor_id: Option<String>,
    #[schema(format = "uuid")]
    pub appointment_id: Option<String>,
    /// `appointment_payment`, `wallet_credit` or `wallet_debit`.
    #[serde(rename = "type")]
    #[schema(example = "appointment_payment")]
    pub kind: String,
    /// Amount in minor units.
    pub amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
    #[schema(example = "completed")]
    pub status: String,
    #[schema(value_type = Object)]
    pub metadata: TransactionMetadata,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id.to_string(),
            patient_id: transaction.patient_id.to_string(),
            doctor_id: transaction.doctor_id.map(|id| id.to_string()),
            appointment_id: transaction.appointment_id.map(|id| id.to_string()),
            kind: transaction.kind.as_str().to_owned(),
            amount: transaction.amount.amount(),
            currency: transaction.amount.currency().as_str().to_owned(),
            status: transaction.status.as_str().to_owned(),
            metadata: transaction.metadata,
            created_at: transaction.created_at.to_rfc3339(),
        }
    }
}

/// Response payload for a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentResponse {
    #[schema(example = "Appointment booked successfully")]
    pub message: String,
    pub appointment: AppointmentResponse,
    pub transaction: TransactionResponse,
}

impl BookAppointmentResponse {
    pub(super) fn from_receipt(receipt: BookingReceipt) -> Self {
        Self {
            message: "Appointment booked successfully".to_owned(),
            appointment: receipt.appointment.into(),
            transaction: receipt.transaction.into(),
        }
    }
}

/// Appointment decorated with scheduling flags and its counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListItem {
    #[serde(flatten)]
    pub appointment: AppointmentResponse,
    /// The consultation date is before today.
    pub is_past: bool,
    /// More than 24 hours remain before the consultation day starts.
    pub can_cancel: bool,
    /// Same rule as `canCancel`.
    pub can_reschedule: bool,
    /// Present on patient listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorSummaryResponse>,
    /// Present on doctor listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientSummaryResponse>,
}

impl From<AppointmentView> for AppointmentListItem {
    fn from(view: AppointmentView) -> Self {
        Self {
            appointment: view.appointment.into(),
            is_past: view.timing.is_past,
            can_cancel: view.timing.can_cancel,
            can_reschedule: view.timing.can_reschedule,
            doctor: view.doctor.map(Into::into),
            patient: view.patient.map(Into::into),
        }
    }
}

/// Page coordinates for appointment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_appointments: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl From<PageInfo> for AppointmentPagination {
    fn from(info: PageInfo) -> Self {
        Self {
            current_page: info.current_page,
            total_pages: info.total_pages,
            total_appointments: info.total_items,
            has_next_page: info.has_next_page,
            has_prev_page: info.has_prev_page,
        }
    }
}

/// Appointments and their page coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AppointmentListData {
    pub appointments: Vec<AppointmentListItem>,
    pub pagination: AppointmentPagination,
}

/// Response payload for appointment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AppointmentListResponse {
    #[schema(example = "Appointments retrieved successfully")]
    pub message: String,
    pub data: AppointmentListData,
}

pub(super) fn parse_booking_request(
    patient_id: PatientId,
    payload: BookAppointmentRequest,
) -> Result<BookingRequest, Error> {
    let doctor_id = parse_doctor_id(&require(payload.doctor_id, DOCTOR_ID)?)?;
    let date = parse_date(&require(payload.date, DATE)?, DATE)?;
    let slot = require(payload.slot, SLOT)?;
    let start = require(slot.start_time, START_TIME)?;
    let end = require(slot.end_time, END_TIME)?;
    let slot = parse_slot(&start, &end)?;
    Ok(BookingRequest {
        patient_id,
        doctor_id,
        date,
        slot,
    })
}

pub(super) fn parse_list_query(
    scope: AppointmentScope,
    query: &AppointmentListQuery,
) -> Result<(AppointmentFilter, PageRequest), Error> {
    let page = parse_page(query.page, query.limit)?;
    let filter = AppointmentFilter {
        status: parse_status(query.status.as_deref())?,
        from: parse_optional_date(query.from_date.as_deref(), FROM_DATE)?,
        to: parse_optional_date(query.to_date.as_deref(), TO_DATE)?,
        ..AppointmentFilter::for_scope(scope)
    };
    Ok((filter, page))
}

pub(super) fn parse_doctor_path(path: &DoctorPath) -> Result<DoctorId, Error> {
    parse_doctor_id(&path.doctor_id)
}
