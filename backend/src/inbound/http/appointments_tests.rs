//! Handler tests for the appointment endpoints.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use pagination::Page;
use rstest::rstest;
use serde_json::{Value, json};

use super::IDEMPOTENT_REPLAYED_HEADER;
use crate::domain::ports::{
    AppointmentScope, AppointmentView, MockAppointmentBookingCommand, MockAppointmentQuery,
};
use crate::domain::{
    AppointmentTiming, BookingOutcome, BookingReceipt, DoctorId, DoctorSummary, Error, PatientId,
    PatientSummary, Principal, TRACE_ID_HEADER,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{
    BEARER, api_app, sample_appointment, sample_transaction, verifier_for,
};

fn booking_body(doctor_id: DoctorId) -> Value {
    json!({
        "doctorId": doctor_id.to_string(),
        "date": "2024-06-10",
        "slot": {"startTime": "09:00", "endTime": "09:30"}
    })
}

fn outcome(doctor_id: DoctorId, patient_id: PatientId, replayed: bool) -> BookingOutcome {
    let appointment = sample_appointment(doctor_id, patient_id);
    let transaction = sample_transaction(&appointment);
    BookingOutcome {
        receipt: BookingReceipt {
            appointment,
            transaction,
        },
        replayed,
    }
}

fn view(doctor_id: DoctorId, patient_id: PatientId) -> AppointmentView {
    AppointmentView {
        appointment: sample_appointment(doctor_id, patient_id),
        timing: AppointmentTiming {
            is_past: false,
            can_cancel: true,
            can_reschedule: true,
        },
        doctor: Some(DoctorSummary {
            id: doctor_id,
            name: "Dr. Rao".to_owned(),
            specialization: "cardiology".to_owned(),
        }),
        patient: None,
    }
}

#[actix_web::test]
async fn booking_returns_created_with_receipt() {
    let patient_id = PatientId::random();
    let doctor_id = DoctorId::random();
    let mut booking = MockAppointmentBookingCommand::new();
    booking
        .expect_book()
        .withf(move |request, key| {
            request.patient_id == patient_id
                && request.doctor_id == doctor_id
                && request.slot.start_time() == "09:00"
                && key.is_none()
        })
        .times(1)
        .return_once(move |_, _| Ok(outcome(doctor_id, patient_id, false)));
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(patient_id))))
        .with_booking(Arc::new(booking));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header((AUTHORIZATION, BEARER))
            .set_json(booking_body(doctor_id))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().get(IDEMPOTENT_REPLAYED_HEADER).is_none());
    assert!(res.headers().get(TRACE_ID_HEADER).is_some());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Appointment booked successfully");
    assert_eq!(body["appointment"]["doctorId"], json!(doctor_id.to_string()));
    assert_eq!(body["appointment"]["payment"]["finalAmount"], 42_000);
    assert_eq!(body["transaction"]["type"], "appointment_payment");
    assert_eq!(body["transaction"]["amount"], 42_000);
    assert_eq!(
        body["transaction"]["appointmentId"],
        body["appointment"]["id"]
    );
}

#[actix_web::test]
async fn replayed_booking_is_flagged() {
    let patient_id = PatientId::random();
    let doctor_id = DoctorId::random();
    let key = "550e8400-e29b-41d4-a716-446655440000";
    let mut booking = MockAppointmentBookingCommand::new();
    booking
        .expect_book()
        .withf(move |_, idempotency_key| {
            idempotency_key
                .as_ref()
                .is_some_and(|k| k.to_string() == key)
        })
        .return_once(move |_, _| Ok(outcome(doctor_id, patient_id, true)));
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(patient_id))))
        .with_booking(Arc::new(booking));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header((AUTHORIZATION, BEARER))
            .insert_header(("Idempotency-Key", key))
            .set_json(booking_body(doctor_id))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        res.headers()
            .get(IDEMPOTENT_REPLAYED_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[rstest]
#[case(json!({"date": "2024-06-10", "slot": {"startTime": "09:00", "endTime": "09:30"}}), "doctorId", "missing_field")]
#[case(json!({"doctorId": "nope", "date": "2024-06-10", "slot": {"startTime": "09:00", "endTime": "09:30"}}), "doctorId", "invalid_uuid")]
#[case(json!({"doctorId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "date": "10-06-2024", "slot": {"startTime": "09:00", "endTime": "09:30"}}), "date", "invalid_date")]
#[case(json!({"doctorId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "date": "2024-06-10", "slot": {"startTime": "9", "endTime": "09:30"}}), "startTime", "invalid_time")]
#[case(json!({"doctorId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "date": "2024-06-10", "slot": {"startTime": "10:00", "endTime": "09:30"}}), "slot", "invalid_slot")]
#[actix_web::test]
async fn invalid_booking_payloads_are_rejected_before_booking(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut booking = MockAppointmentBookingCommand::new();
    booking.expect_book().times(0);
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(PatientId::random()))))
        .with_booking(Arc::new(booking));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header((AUTHORIZATION, BEARER))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn malformed_json_uses_error_envelope() {
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(PatientId::random()))));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header((AUTHORIZATION, BEARER))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"doctorId\": ")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_body");
}

#[actix_web::test]
async fn doctors_cannot_book() {
    let mut booking = MockAppointmentBookingCommand::new();
    booking.expect_book().times(0);
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Doctor(DoctorId::random()))))
        .with_booking(Arc::new(booking));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header((AUTHORIZATION, BEARER))
            .set_json(booking_body(DoctorId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case(Error::slot_unavailable("taken"), StatusCode::BAD_REQUEST, "slot_unavailable")]
#[case(Error::insufficient_funds("broke"), StatusCode::BAD_REQUEST, "insufficient_funds")]
#[case(Error::not_found("doctor not found"), StatusCode::NOT_FOUND, "not_found")]
#[case(Error::conflict("key reused"), StatusCode::CONFLICT, "conflict")]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")]
#[actix_web::test]
async fn booking_failures_map_to_statuses(
    #[case] failure: Error,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let mut booking = MockAppointmentBookingCommand::new();
    booking.expect_book().return_once(move |_, _| Err(failure));
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(PatientId::random()))))
        .with_booking(Arc::new(booking));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header((AUTHORIZATION, BEARER))
            .set_json(booking_body(DoctorId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), status);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], code);
}

#[actix_web::test]
async fn my_appointments_lists_the_callers_page() {
    let patient_id = PatientId::random();
    let doctor_id = DoctorId::random();
    let mut query = MockAppointmentQuery::new();
    query
        .expect_list_appointments()
        .withf(move |filter, page| {
            filter.scope == AppointmentScope::Patient(patient_id)
                && filter.status.is_none()
                && page.page() == 2
                && page.limit() == 1
        })
        .times(1)
        .return_once(move |_, page| Ok(Page::new(vec![view(doctor_id, patient_id)], page, 3)));
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(patient_id))))
        .with_appointments(Arc::new(query));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/appointments/my-appointments?page=2&limit=1")
            .insert_header((AUTHORIZATION, BEARER))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Appointments retrieved successfully");
    let item = &body["data"]["appointments"][0];
    assert_eq!(item["isPast"], false);
    assert_eq!(item["canCancel"], true);
    assert_eq!(item["doctor"]["name"], "Dr. Rao");
    assert!(item.get("patient").is_none());
    assert_eq!(item["slot"]["startTime"], "09:00");
    assert_eq!(
        body["data"]["pagination"],
        json!({
            "currentPage": 2,
            "totalPages": 3,
            "totalAppointments": 3,
            "hasNextPage": true,
            "hasPrevPage": true
        })
    );
}

#[rstest]
#[case("/api/appointments/my-appointments?limit=101", "limit")]
#[case("/api/appointments/my-appointments?page=0", "page")]
#[case("/api/appointments/my-appointments?status=pending", "status")]
#[case("/api/appointments/my-appointments?fromDate=yesterday", "fromDate")]
#[actix_web::test]
async fn invalid_list_filters_are_rejected(#[case] uri: &str, #[case] field: &str) {
    let mut query = MockAppointmentQuery::new();
    query.expect_list_appointments().times(0);
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Patient(PatientId::random()))))
        .with_appointments(Arc::new(query));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(uri)
            .insert_header((AUTHORIZATION, BEARER))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn doctor_schedule_carries_patients() {
    let doctor_id = DoctorId::random();
    let patient_id = PatientId::random();
    let mut query = MockAppointmentQuery::new();
    query
        .expect_list_appointments()
        .withf(move |filter, _| filter.scope == AppointmentScope::Doctor(doctor_id))
        .return_once(move |_, page| {
            let mut listing = view(doctor_id, patient_id);
            listing.doctor = None;
            listing.patient = Some(PatientSummary {
                id: patient_id,
                name: "Asha".to_owned(),
                email: "asha@example.com".to_owned(),
                phone: None,
            });
            Ok(Page::new(vec![listing], page, 1))
        });
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Doctor(doctor_id))))
        .with_appointments(Arc::new(query));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/appointments/doctor/{doctor_id}"))
            .insert_header((AUTHORIZATION, BEARER))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let item = &body["data"]["appointments"][0];
    assert_eq!(item["patient"]["email"], "asha@example.com");
    assert!(item.get("doctor").is_none());
    assert_eq!(body["data"]["pagination"]["hasNextPage"], false);
}

#[rstest]
#[case(Principal::Doctor(DoctorId::random()))]
#[case(Principal::Patient(PatientId::random()))]
#[actix_web::test]
async fn doctor_schedule_is_private(#[case] caller: Principal) {
    let mut query = MockAppointmentQuery::new();
    query.expect_list_appointments().times(0);
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(caller)))
        .with_appointments(Arc::new(query));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/appointments/doctor/{}", DoctorId::random()))
            .insert_header((AUTHORIZATION, BEARER))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn malformed_doctor_path_is_a_validation_error() {
    let state = HttpState::fixtures()
        .with_tokens(Arc::new(verifier_for(Principal::Doctor(DoctorId::random()))));
    let app = test::init_service(api_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/appointments/doctor/not-a-uuid")
            .insert_header((AUTHORIZATION, BEARER))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn listing_requires_a_token() {
    let app = test::init_service(api_app(HttpState::fixtures())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/appointments/my-appointments")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
