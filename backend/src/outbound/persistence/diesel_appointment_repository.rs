//! PostgreSQL-backed `AppointmentRepository`.
//!
//! Listings run two statements over the same filter: a count for the
//! pagination envelope and the page itself, ordered newest date first and
//! then latest start time first. Counterparty summaries are fetched in one
//! extra query per page.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    AppointmentFilter, AppointmentListing, AppointmentRepository, AppointmentRepositoryError,
    AppointmentScope,
};
use crate::domain::{Appointment, AppointmentStatus, DoctorId, TimeSlot};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AppointmentRow, DoctorSummaryRow, PatientSummaryRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{
    appointment_from_row, doctor_summary_from_row, patient_summary_from_row,
};
use super::schema::{appointments, doctors, patients};

/// Diesel-backed appointment reads.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AppointmentRepositoryError {
    map_basic_pool_error(error, |message| AppointmentRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> AppointmentRepositoryError {
    map_basic_diesel_error(
        error,
        AppointmentRepositoryError::query,
        AppointmentRepositoryError::connection,
    )
}

fn filtered(filter: &AppointmentFilter) -> appointments::BoxedQuery<'static, Pg> {
    let mut query = appointments::table.into_boxed();
    query = match filter.scope {
        AppointmentScope::Patient(id) => query.filter(appointments::patient_id.eq(*id.as_uuid())),
        AppointmentScope::Doctor(id) => query.filter(appointments::doctor_id.eq(*id.as_uuid())),
    };
    if let Some(status) = filter.status {
        query = query.filter(appointments::status.eq(status.as_str()));
    }
    if let Some(from) = filter.from {
        query = query.filter(appointments::appointment_date.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(appointments::appointment_date.le(to));
    }
    query
}

fn to_i64(value: u64, what: &str) -> Result<i64, AppointmentRepositoryError> {
    i64::try_from(value)
        .map_err(|_| AppointmentRepositoryError::query(format!("{what} out of range: {value}")))
}

impl DieselAppointmentRepository {
    async fn doctor_summaries(
        conn: &mut AsyncPgConnection,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, DoctorSummaryRow>, AppointmentRepositoryError> {
        let rows: Vec<DoctorSummaryRow> = doctors::table
            .filter(doctors::id.eq_any(ids))
            .select(DoctorSummaryRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    async fn patient_summaries(
        conn: &mut AsyncPgConnection,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, PatientSummaryRow>, AppointmentRepositoryError> {
        let rows: Vec<PatientSummaryRow> = patients::table
            .filter(patients::id.eq_any(ids))
            .select(PatientSummaryRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    async fn attach_counterparties(
        conn: &mut AsyncPgConnection,
        scope: AppointmentScope,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentListing>, AppointmentRepositoryError> {
        match scope {
            AppointmentScope::Patient(_) => {
                let ids = appointments.iter().map(|a| *a.doctor_id.as_uuid()).collect();
                let summaries = Self::doctor_summaries(conn, ids).await?;
                Ok(appointments
                    .into_iter()
                    .map(|appointment| {
                        let doctor = summaries
                            .get(appointment.doctor_id.as_uuid())
                            .cloned()
                            .map(doctor_summary_from_row);
                        AppointmentListing {
                            appointment,
                            doctor,
                            patient: None,
                        }
                    })
                    .collect())
            }
            AppointmentScope::Doctor(_) => {
                let ids = appointments.iter().map(|a| *a.patient_id.as_uuid()).collect();
                let summaries = Self::patient_summaries(conn, ids).await?;
                Ok(appointments
                    .into_iter()
                    .map(|appointment| {
                        let patient = summaries
                            .get(appointment.patient_id.as_uuid())
                            .cloned()
                            .map(patient_summary_from_row);
                        AppointmentListing {
                            appointment,
                            doctor: None,
                            patient,
                        }
                    })
                    .collect())
            }
        }
    }
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn find_active_in_slot(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        slot: &TimeSlot,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AppointmentRow> = appointments::table
            .filter(
                appointments::doctor_id
                    .eq(doctor_id.as_uuid())
                    .and(appointments::appointment_date.eq(date))
                    .and(appointments::start_time.eq(slot.start()))
                    .and(appointments::end_time.eq(slot.end()))
                    .and(appointments::status.ne(AppointmentStatus::Cancelled.as_str())),
            )
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(appointment_from_row)
            .transpose()
            .map_err(AppointmentRepositoryError::query)
    }

    async fn list(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<AppointmentListing>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let total = u64::try_from(total).map_err(|_| {
            AppointmentRepositoryError::query(format!("negative appointment count: {total}"))
        })?;

        let rows: Vec<AppointmentRow> = filtered(filter)
            .order((
                appointments::appointment_date.desc(),
                appointments::start_time.desc(),
            ))
            .limit(i64::from(page.limit()))
            .offset(to_i64(page.offset(), "page offset")?)
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let appointments = rows
            .into_iter()
            .map(appointment_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppointmentRepositoryError::query)?;
        let listings = Self::attach_counterparties(&mut conn, filter.scope, appointments).await?;
        Ok(Page::new(listings, page, total))
    }
}
