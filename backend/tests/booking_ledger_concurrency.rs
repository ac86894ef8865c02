//! Booking flow against embedded PostgreSQL.
//!
//! Drives `AppointmentBookingService` over the Diesel adapters to check the
//! guarantees only the database can give: one live booking per slot under
//! concurrent requests, an all-or-nothing write when the wallet cannot cover
//! a booking, and a single charge when retries sharing an idempotency key
//! race each other.
//!
//! Each test owns a Tokio runtime and blocks on it; cluster bootstrap and
//! seeding use blocking clients that must not run inside the runtime.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use telecare::domain::ports::{
    AppointmentBookingCommand, BookingDraft, BookingLedger, BookingLedgerError, DoctorRepository,
};
use telecare::domain::{
    AppointmentBookingService, AppointmentId, BookingOutcome, BookingPorts, BookingRequest,
    DoctorId, Error, ErrorCode, IdempotencyKey, PatientId, TimeSlot, TransactionId,
};
use telecare::outbound::persistence::{
    DbPool, DieselAppointmentRepository, DieselBookingLedger, DieselDoctorRepository,
    DieselIdempotencyRepository, DieselPatientRepository, PoolConfig,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

mod support;

use support::embedded_postgres::DOCTOR_FEE;
use support::{BookingDatabase, handle_cluster_setup_failure};

type DieselBookingService = AppointmentBookingService<
    DieselDoctorRepository,
    DieselPatientRepository,
    DieselAppointmentRepository,
    DieselBookingLedger,
    DieselIdempotencyRepository,
>;

struct TestContext {
    runtime: Runtime,
    pool: DbPool,
    service: Arc<DieselBookingService>,
    database: BookingDatabase,
}

impl TestContext {
    fn book_concurrently(
        &self,
        requests: Vec<BookingRequest>,
        key: Option<&IdempotencyKey>,
    ) -> Vec<Result<BookingOutcome, Error>> {
        self.runtime.block_on(async {
            let handles: Vec<_> = requests
                .into_iter()
                .map(|request| {
                    let service = Arc::clone(&self.service);
                    let key = key.cloned();
                    tokio::spawn(async move { service.book(request, key).await })
                })
                .collect();
            let mut results = Vec::with_capacity(handles.len());
            for handle in handles {
                results.push(handle.await.expect("booking task completes"));
            }
            results
        })
    }
}

fn setup_test_context() -> Result<TestContext, String> {
    let database = BookingDatabase::provision()?;
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let config = PoolConfig::new(database.url())
        .with_max_size(8)
        .with_min_idle(Some(1));
    let pool = runtime.block_on(DbPool::new(config)).map_err(|err| err.to_string())?;

    let service = AppointmentBookingService::new(
        BookingPorts {
            doctors: Arc::new(DieselDoctorRepository::new(pool.clone())),
            patients: Arc::new(DieselPatientRepository::new(pool.clone())),
            appointments: Arc::new(DieselAppointmentRepository::new(pool.clone())),
            ledger: Arc::new(DieselBookingLedger::new(pool.clone())),
            idempotency: Arc::new(DieselIdempotencyRepository::new(pool.clone())),
        },
        Arc::new(DefaultClock),
    );

    Ok(TestContext {
        runtime,
        pool,
        service: Arc::new(service),
        database,
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn consultation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 3, 10).expect("valid date")
}

fn request(patient: Uuid, doctor: Uuid, start: &str, end: &str) -> BookingRequest {
    BookingRequest {
        patient_id: PatientId::from_uuid(patient),
        doctor_id: DoctorId::from_uuid(doctor),
        date: consultation_date(),
        slot: TimeSlot::parse(start, end).expect("valid slot"),
    }
}

#[rstest]
fn concurrent_requests_for_one_slot_book_it_once(context: Option<TestContext>) {
    let Some(ctx) = context else {
        return;
    };
    let doctor = Uuid::new_v4();
    ctx.database.insert_doctor(doctor);
    let patients: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    for patient in &patients {
        ctx.database.insert_patient(*patient, 2 * DOCTOR_FEE);
    }

    let results = ctx.book_concurrently(
        patients
            .iter()
            .map(|patient| request(*patient, doctor, "10:00", "10:30"))
            .collect(),
        None,
    );

    let booked: Vec<&BookingOutcome> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(booked.len(), 1, "exactly one request wins the slot");
    for error in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(error.code(), ErrorCode::SlotUnavailable);
    }
    assert_eq!(ctx.database.doctor_appointment_count(doctor), 1);

    let winner = *booked[0].receipt.appointment.patient_id.as_uuid();
    for patient in &patients {
        let expected = if *patient == winner {
            DOCTOR_FEE
        } else {
            2 * DOCTOR_FEE
        };
        assert_eq!(ctx.database.wallet_balance(*patient), expected);
    }
}

#[rstest]
fn concurrent_bookings_never_overdraw_the_wallet(context: Option<TestContext>) {
    let Some(ctx) = context else {
        return;
    };
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();
    ctx.database.insert_doctor(doctor);
    ctx.database.insert_patient(patient, DOCTOR_FEE + DOCTOR_FEE / 2);

    let results = ctx.book_concurrently(
        vec![
            request(patient, doctor, "09:00", "09:30"),
            request(patient, doctor, "11:00", "11:30"),
        ],
        None,
    );

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one booking is refused");
    assert_eq!(failure.code(), ErrorCode::InsufficientFunds);
    assert_eq!(ctx.database.wallet_balance(patient), DOCTOR_FEE / 2);
    assert_eq!(ctx.database.patient_appointment_count(patient), 1);
    assert_eq!(ctx.database.patient_transaction_count(patient), 1);
}

#[rstest]
fn rejected_commit_leaves_no_partial_booking(context: Option<TestContext>) {
    let Some(ctx) = context else {
        return;
    };
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();
    ctx.database.insert_doctor(doctor);
    ctx.database.insert_patient(patient, DOCTOR_FEE - 1);

    let result = ctx.runtime.block_on(async {
        let doctor_profile = DieselDoctorRepository::new(ctx.pool.clone())
            .find_by_id(&DoctorId::from_uuid(doctor))
            .await
            .expect("doctor lookup")
            .expect("doctor seeded");
        DieselBookingLedger::new(ctx.pool.clone())
            .commit(BookingDraft {
                appointment_id: AppointmentId::random(),
                transaction_id: TransactionId::random(),
                request: request(patient, doctor, "14:00", "14:30"),
                doctor: doctor_profile,
                idempotency: None,
                booked_at: chrono::Utc::now(),
            })
            .await
    });

    assert_eq!(
        result.expect_err("wallet cannot cover the fee"),
        BookingLedgerError::InsufficientFunds {
            balance: DOCTOR_FEE - 1,
            required: DOCTOR_FEE,
        }
    );
    assert_eq!(ctx.database.wallet_balance(patient), DOCTOR_FEE - 1);
    assert_eq!(ctx.database.patient_appointment_count(patient), 0);
    assert_eq!(ctx.database.patient_transaction_count(patient), 0);
}

#[rstest]
fn retried_booking_replays_without_charging_twice(context: Option<TestContext>) {
    let Some(ctx) = context else {
        return;
    };
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();
    ctx.database.insert_doctor(doctor);
    ctx.database.insert_patient(patient, 3 * DOCTOR_FEE);
    let key = IdempotencyKey::random();

    let (first, second) = ctx.runtime.block_on(async {
        let first = ctx
            .service
            .book(request(patient, doctor, "16:00", "16:30"), Some(key.clone()))
            .await;
        let second = ctx
            .service
            .book(request(patient, doctor, "16:00", "16:30"), Some(key.clone()))
            .await;
        (first, second)
    });

    let first = first.expect("first booking succeeds");
    let second = second.expect("retry replays");
    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(first.receipt.appointment.id, second.receipt.appointment.id);
    assert_eq!(ctx.database.wallet_balance(patient), 2 * DOCTOR_FEE);
    assert_eq!(ctx.database.patient_transaction_count(patient), 1);
}

#[rstest]
fn concurrent_retries_with_one_key_charge_once_and_replay(context: Option<TestContext>) {
    let Some(ctx) = context else {
        return;
    };
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();
    ctx.database.insert_doctor(doctor);
    ctx.database.insert_patient(patient, 3 * DOCTOR_FEE);
    let key = IdempotencyKey::random();

    let results = ctx.book_concurrently(
        (0..4)
            .map(|_| request(patient, doctor, "12:00", "12:30"))
            .collect(),
        Some(&key),
    );

    let outcomes: Vec<&BookingOutcome> = results
        .iter()
        .map(|result| result.as_ref().expect("every retry resolves to the booking"))
        .collect();
    assert_eq!(outcomes.iter().filter(|outcome| !outcome.replayed).count(), 1);
    let appointment_id = outcomes[0].receipt.appointment.id;
    for outcome in &outcomes {
        assert_eq!(outcome.receipt.appointment.id, appointment_id);
    }
    assert_eq!(ctx.database.wallet_balance(patient), 2 * DOCTOR_FEE);
    assert_eq!(ctx.database.patient_appointment_count(patient), 1);
    assert_eq!(ctx.database.patient_transaction_count(patient), 1);
}
