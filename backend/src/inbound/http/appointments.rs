//! Appointment API handlers.
//!
//! ```text
//! POST /api/appointments                      Book a consultation
//! GET  /api/appointments/my-appointments      List the caller's appointments
//! GET  /api/appointments/doctor/{doctorId}    List a doctor's appointments
//! ```
//!
//! Booking supports safe retries via the `Idempotency-Key` header.

use actix_web::{HttpRequest, HttpResponse, get, post, web};

use crate::domain::ports::AppointmentScope;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::idempotency::{extract_idempotency_key, map_idempotency_key_error};
use crate::inbound::http::state::HttpState;

use super::appointments_dto::{
    AppointmentListData, DoctorPath, parse_booking_request, parse_doctor_path, parse_list_query,
};
pub use super::appointments_dto::{
    AppointmentListQuery, AppointmentListResponse, BookAppointmentRequest, BookAppointmentResponse,
};

/// Response header set when a booking is replayed for a retried request.
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "Idempotent-Replayed";

/// Book a consultation and pay for it from the caller's wallet.
///
/// # Idempotency
///
/// Clients may send an `Idempotency-Key` header (UUID) for safe retries:
///
/// - First request: `201 Created` with the new appointment.
/// - Retry with the same payload: `201 Created` with the stored response and
///   an `Idempotent-Replayed: true` header. The wallet is charged once.
/// - Retry with a different payload: `409 Conflict`.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = BookAppointmentResponse),
        (status = 400, description = "Invalid request, slot unavailable or insufficient funds", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 403, description = "Caller is not a patient", body = crate::domain::Error),
        (status = 404, description = "Doctor or patient not found", body = crate::domain::Error),
        (status = 409, description = "Idempotency key conflict", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "UUID for idempotent booking")
    ),
    security(("BearerAuth" = [])),
    tags = ["appointments"],
    operation_id = "bookAppointment"
)]
#[post("/appointments")]
pub async fn book_appointment(
    state: web::Data<HttpState>,
    auth: Authenticated,
    request: HttpRequest,
    payload: web::Json<BookAppointmentRequest>,
) -> ApiResult<HttpResponse> {
    let patient_id = auth.require_patient()?;
    let idempotency_key =
        extract_idempotency_key(request.headers()).map_err(map_idempotency_key_error)?;
    let booking = parse_booking_request(patient_id, payload.into_inner())?;

    let outcome = state.booking.book(booking, idempotency_key).await?;

    let mut response = HttpResponse::Created();
    if outcome.replayed {
        response.insert_header((IDEMPOTENT_REPLAYED_HEADER, "true"));
    }
    Ok(response.json(BookAppointmentResponse::from_receipt(outcome.receipt)))
}

async fn list_appointments(
    state: &HttpState,
    scope: AppointmentScope,
    query: &AppointmentListQuery,
) -> ApiResult<web::Json<AppointmentListResponse>> {
    let (filter, page) = parse_list_query(scope, query)?;
    let result = state.appointments.list_appointments(filter, page).await?;
    Ok(web::Json(AppointmentListResponse {
        message: "Appointments retrieved successfully".to_owned(),
        data: AppointmentListData {
            appointments: result.items.into_iter().map(Into::into).collect(),
            pagination: result.info.into(),
        },
    }))
}

/// List the calling patient's appointments, newest first.
#[utoipa::path(
    get,
    path = "/api/appointments/my-appointments",
    params(AppointmentListQuery),
    responses(
        (status = 200, description = "Appointments", body = AppointmentListResponse),
        (status = 400, description = "Invalid filter or paging", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 403, description = "Caller is not a patient", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    security(("BearerAuth" = [])),
    tags = ["appointments"],
    operation_id = "listMyAppointments"
)]
#[get("/appointments/my-appointments")]
pub async fn my_appointments(
    state: web::Data<HttpState>,
    auth: Authenticated,
    query: web::Query<AppointmentListQuery>,
) -> ApiResult<web::Json<AppointmentListResponse>> {
    let patient_id = auth.require_patient()?;
    list_appointments(&state, AppointmentScope::Patient(patient_id), &query).await
}

/// List a doctor's schedule, newest first. Doctors may only read their own.
#[utoipa::path(
    get,
    path = "/api/appointments/doctor/{doctorId}",
    params(
        ("doctorId" = String, Path, description = "Doctor identifier (UUID)"),
        AppointmentListQuery
    ),
    responses(
        (status = 200, description = "Appointments", body = AppointmentListResponse),
        (status = 400, description = "Invalid doctor id, filter or paging", body = crate::domain::Error),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 403, description = "Caller is not this doctor", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    security(("BearerAuth" = [])),
    tags = ["appointments"],
    operation_id = "listDoctorAppointments"
)]
#[get("/appointments/doctor/{doctorId}")]
pub async fn doctor_appointments(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<DoctorPath>,
    query: web::Query<AppointmentListQuery>,
) -> ApiResult<web::Json<AppointmentListResponse>> {
    let doctor_id = auth.require_doctor(parse_doctor_path(&path)?)?;
    list_appointments(&state, AppointmentScope::Doctor(doctor_id), &query).await
}

#[cfg(test)]
#[path = "appointments_tests.rs"]
mod tests;
