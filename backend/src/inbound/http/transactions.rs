//! Transaction API handlers.
//!
//! ```text
//! GET /api/transactions                      The caller's payment history
//! GET /api/transactions/doctor/{doctorId}    A doctor's revenue ledger
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DATE_FORMAT;
use crate::domain::ports::{AppointmentBrief, TransactionListing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

use super::appointments_dto::{
    DoctorPath, DoctorSummaryResponse, PatientSummaryResponse, SlotResponse, TransactionResponse,
    parse_doctor_path,
};

/// Reduced appointment projection attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBriefResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "date", example = "2024-06-10")]
    pub date: String,
    pub slot: SlotResponse,
    #[schema(example = "scheduled")]
    pub status: String,
}

impl From<AppointmentBrief> for AppointmentBriefResponse {
    fn from(brief: AppointmentBrief) -> Self {
        Self {
            id: brief.id.to_string(),
            date: brief.date.format(DATE_FORMAT).to_string(),
            slot: brief.slot.into(),
            status: brief.status.as_str().to_owned(),
        }
    }
}

/// Transaction joined with its appointment and counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListItem {
    #[serde(flatten)]
    pub transaction: TransactionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<AppointmentBriefResponse>,
    /// Present on patient listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorSummaryResponse>,
    /// Present on doctor listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientSummaryResponse>,
}

impl From<TransactionListing> for TransactionListItem {
    fn from(listing: TransactionListing) -> Self {
        Self {
            transaction: listing.transaction.into(),
            appointment: listing.appointment.map(Into::into),
            doctor: listing.doctor.map(Into::into),
            patient: listing.patient.map(Into::into),
        }
    }
}

/// Size of an unpaginated transaction listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransactionPagination {
    pub total: u64,
}

/// Transactions and their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransactionListData {
    pub transactions: Vec<TransactionListItem>,
    pub pagination: TransactionPagination,
}

/// Response payload for transaction listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransactionListResponse {
    #[schema(example = "Transactions retrieved successfully")]
    pub message: String,
    pub data: TransactionListData,
}

impl From<Vec<TransactionListing>> for TransactionListResponse {
    fn from(listings: Vec<TransactionListing>) -> Self {
        let transactions: Vec<TransactionListItem> =
            listings.into_iter().map(Into::into).collect();
        let total = u64::try_from(transactions.len()).unwrap_or(u64::MAX);
        Self {
            message: "Transactions retrieved successfully".to_owned(),
            data: TransactionListData {
                transactions,
                pagination: TransactionPagination { total },
            },
        }
    }
}

/// The calling patient's payment history, newest first.
#[utoipa::path(
    get,
    path = "/api/transactions",
    responses(
        (status = 200, description = "Transactions", body = TransactionListResponse),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 403, description = "Caller is not a patient", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    security(("BearerAuth" = [])),
    tags = ["transactions"],
    operation_id = "listMyTransactions"
)]
#[get("/transactions")]
pub async fn my_transactions(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<TransactionListResponse>> {
    let patient_id = auth.require_patient()?;
    let listings = state.transactions.patient_transactions(patient_id).await?;
    Ok(web::Json(listings.into()))
}

/// A doctor's revenue ledger, newest first. Doctors may only read their own.
#[utoipa::path(
    get,
    path = "/api/transactions/doctor/{doctorId}",
    params(("doctorId" = String, Path, description = "Doctor identifier (UUID)")),
    responses(
        (status = 200, description = "Transactions", body = TransactionListResponse),
        (status = 400, description = "Invalid doctor id", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 403, description = "Caller is not this doctor", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    security(("BearerAuth" = [])),
    tags = ["transactions"],
    operation_id = "listDoctorTransactions"
)]
#[get("/transactions/doctor/{doctorId}")]
pub async fn doctor_transactions(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<DoctorPath>,
) -> ApiResult<web::Json<TransactionListResponse>> {
    let doctor_id = auth.require_doctor(parse_doctor_path(&path)?)?;
    let listings = state.transactions.doctor_transactions(doctor_id).await?;
    Ok(web::Json(listings.into()))
}
