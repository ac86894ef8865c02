//! Test helpers for inbound HTTP components.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::Trace;
use crate::domain::ports::MockTokenVerifier;
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, Currency, DoctorId, Money, PatientId,
    PaymentSnapshot, Principal, TimeSlot, Transaction, TransactionId, TransactionKind,
    TransactionMetadata, TransactionStatus,
};

use super::state::HttpState;
use super::validation::{json_config, query_config};
use super::{appointments, transactions};

/// Header value accepted by [`verifier_for`].
pub const BEARER: &str = "Bearer test-token";

/// Token verifier that resolves any token to `principal`.
pub fn verifier_for(principal: Principal) -> MockTokenVerifier {
    let mut verifier = MockTokenVerifier::new();
    verifier
        .expect_verify()
        .returning(move |_| Ok(Some(principal)));
    verifier
}

/// App serving every `/api` route over `state`, wrapped in the trace
/// middleware.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .service(
            web::scope("/api")
                .service(appointments::book_appointment)
                .service(appointments::my_appointments)
                .service(appointments::doctor_appointments)
                .service(transactions::my_transactions)
                .service(transactions::doctor_transactions),
        )
}

/// Fixed instant used by sample records.
pub fn booked_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Scheduled appointment on 2024-06-10, 09:00-09:30, paid 42 000 after a
/// first-visit discount.
pub fn sample_appointment(doctor_id: DoctorId, patient_id: PatientId) -> Appointment {
    Appointment {
        id: AppointmentId::random(),
        doctor_id,
        patient_id,
        date: NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date"),
        slot: TimeSlot::parse("09:00", "09:30").expect("valid slot"),
        status: AppointmentStatus::Scheduled,
        payment: PaymentSnapshot {
            original_amount: 50_000,
            discount_applied: 8_000,
            final_amount: 42_000,
            currency: Currency::inr(),
        },
        is_first_consultation: true,
        created_at: booked_at(),
        updated_at: booked_at(),
    }
}

/// Completed payment settling `appointment`.
pub fn sample_transaction(appointment: &Appointment) -> Transaction {
    Transaction {
        id: TransactionId::random(),
        patient_id: appointment.patient_id,
        doctor_id: Some(appointment.doctor_id),
        appointment_id: Some(appointment.id),
        kind: TransactionKind::AppointmentPayment,
        amount: Money::new(appointment.payment.final_amount, Currency::inr())
            .expect("valid amount"),
        status: TransactionStatus::Completed,
        metadata: TransactionMetadata {
            discount_applied: Some(appointment.payment.discount_applied),
            original_amount: Some(appointment.payment.original_amount),
            payment_method: Some("wallet".to_owned()),
        },
        created_at: booked_at(),
    }
}
