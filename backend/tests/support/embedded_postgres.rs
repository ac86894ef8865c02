//! Per-test PostgreSQL databases with the booking schema applied.
//!
//! Database creation and seeding use the synchronous `postgres` client so
//! they run outside the Tokio runtime that drives the adapters. The schema
//! comes from the migrations embedded in the library.

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use telecare::domain::BearerToken;
use telecare::outbound::persistence::apply_migrations;
use uuid::Uuid;

use super::format_postgres_error;
use super::pg_embed::test_cluster;

/// Fee charged by seeded doctors, in paise.
pub const DOCTOR_FEE: i64 = 50_000;

/// Row values for [`BookingDatabase::insert_appointment`].
pub struct AppointmentSeed<'a> {
    pub doctor: Uuid,
    pub patient: Uuid,
    pub date: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub status: &'a str,
}

/// A migrated database on a private embedded cluster.
pub struct BookingDatabase {
    url: String,
    _cluster: TestCluster,
}

impl BookingDatabase {
    /// Start a cluster, create a fresh database and migrate it.
    pub fn provision() -> Result<Self, String> {
        let cluster = test_cluster()?;
        let name = format!("test_{}", Uuid::new_v4().simple());

        let admin_url = cluster.connection().database_url("postgres");
        let mut admin =
            Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
        admin
            .batch_execute(&format!("CREATE DATABASE \"{name}\""))
            .map_err(|err| format_postgres_error(&err))?;

        let url = cluster.connection().database_url(&name);
        apply_migrations(&url).map_err(|err| err.to_string())?;
        Ok(Self {
            url,
            _cluster: cluster,
        })
    }

    /// Connection string for the test database.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn client(&self) -> Client {
        Client::connect(&self.url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)))
    }

    fn execute(&self, sql: &str, params: &[&(dyn postgres::types::ToSql + Sync)]) {
        self.client()
            .execute(sql, params)
            .unwrap_or_else(|err| panic!("seed: {}", format_postgres_error(&err)));
    }

    fn count(&self, sql: &str, id: Uuid) -> i64 {
        self.client()
            .query_one(sql, &[&id])
            .unwrap_or_else(|err| panic!("count: {}", format_postgres_error(&err)))
            .get(0)
    }

    /// Insert a doctor charging [`DOCTOR_FEE`] INR with no first-visit
    /// discount.
    pub fn insert_doctor(&self, id: Uuid) {
        self.execute(
            "INSERT INTO doctors (id, email, password_hash, name, specialization, fee_amount, fee_currency)
             VALUES ($1, $2, 'x', 'Dr. Mehta', 'dermatology', $3, 'INR')",
            &[&id, &format!("{id}@doctors.test"), &DOCTOR_FEE],
        );
    }

    /// Insert a patient holding `balance` paise in an INR wallet.
    pub fn insert_patient(&self, id: Uuid, balance: i64) {
        self.execute(
            "INSERT INTO patients (id, email, password_hash, name, wallet_balance)
             VALUES ($1, $2, 'x', 'Ravi', $3)",
            &[&id, &format!("{id}@patients.test"), &balance],
        );
    }

    /// Store a bearer token for `principal` that expires in an hour.
    pub fn insert_token(&self, token: &str, principal: Uuid, role: &str) {
        let digest = BearerToken::from_header(&format!("Bearer {token}"))
            .expect("valid bearer token")
            .digest()
            .to_hex();
        self.execute(
            "INSERT INTO access_tokens (token_hash, principal_id, role, expires_at)
             VALUES (decode($1, 'hex'), $2, $3, now() + interval '1 hour')",
            &[&digest, &principal, &role],
        );
    }

    /// Insert a paid, non-discounted appointment. `date` is `YYYY-MM-DD`
    /// and the slot bounds are `HH:MM`.
    pub fn insert_appointment(&self, seed: AppointmentSeed<'_>) {
        self.execute(
            "INSERT INTO appointments (
                 id, doctor_id, patient_id, appointment_date, start_time, end_time, status,
                 original_amount, discount_applied, final_amount, currency, is_first_consultation
             )
             VALUES (
                 $1, $2, $3, $4::text::date, $5::text::time, $6::text::time, $7,
                 $8, 0, $8, 'INR', false
             )",
            &[
                &Uuid::new_v4(),
                &seed.doctor,
                &seed.patient,
                &seed.date,
                &seed.start,
                &seed.end,
                &seed.status,
                &DOCTOR_FEE,
            ],
        );
    }

    /// Current wallet balance for a patient.
    pub fn wallet_balance(&self, patient: Uuid) -> i64 {
        self.client()
            .query_one("SELECT wallet_balance FROM patients WHERE id = $1", &[&patient])
            .unwrap_or_else(|err| panic!("balance: {}", format_postgres_error(&err)))
            .get(0)
    }

    /// Live appointments held by a doctor.
    pub fn doctor_appointment_count(&self, doctor: Uuid) -> i64 {
        self.count(
            "SELECT count(*) FROM appointments WHERE doctor_id = $1 AND status <> 'cancelled'",
            doctor,
        )
    }

    /// Appointments booked by a patient.
    pub fn patient_appointment_count(&self, patient: Uuid) -> i64 {
        self.count("SELECT count(*) FROM appointments WHERE patient_id = $1", patient)
    }

    /// Transactions recorded against a patient.
    pub fn patient_transaction_count(&self, patient: Uuid) -> i64 {
        self.count("SELECT count(*) FROM transactions WHERE patient_id = $1", patient)
    }
}
