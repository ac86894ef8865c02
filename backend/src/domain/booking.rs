//! Booking requests and receipts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Appointment, DoctorId, PatientId, TimeSlot, Transaction};

/// Calendar date format accepted and emitted for appointments.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated request to book `slot` on `date` with `doctor_id`.
///
/// The patient always comes from the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Booking patient.
    pub patient_id: PatientId,
    /// Requested doctor.
    pub doctor_id: DoctorId,
    /// Consultation date.
    pub date: NaiveDate,
    /// Requested window.
    pub slot: TimeSlot,
}

impl BookingRequest {
    /// Body fields that identify the booking for idempotency hashing.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use telecare::domain::{BookingRequest, DoctorId, PatientId, TimeSlot};
    ///
    /// let request = BookingRequest {
    ///     patient_id: PatientId::random(),
    ///     doctor_id: DoctorId::random(),
    ///     date: NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date"),
    ///     slot: TimeSlot::parse("09:00", "10:00").expect("valid slot"),
    /// };
    /// let payload = request.idempotency_payload();
    /// assert_eq!(payload["date"], "2024-06-10");
    /// assert_eq!(payload["slot"]["startTime"], "09:00");
    /// ```
    pub fn idempotency_payload(&self) -> Value {
        json!({
            "doctorId": self.doctor_id,
            "date": self.date.format(DATE_FORMAT).to_string(),
            "slot": {
                "startTime": self.slot.start_time(),
                "endTime": self.slot.end_time(),
            },
        })
    }
}

/// Appointment and its settling transaction, created together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    /// Created appointment.
    pub appointment: Appointment,
    /// Settling payment.
    pub transaction: Transaction,
}

/// Receipt plus whether it was replayed from an earlier request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingOutcome {
    /// Booking result.
    pub receipt: BookingReceipt,
    /// Whether this response was replayed for a retried request.
    pub replayed: bool,
}
