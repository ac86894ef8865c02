//! Appointment ledger entries and their derived scheduling flags.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{AppointmentId, Currency, DoctorId, PatientId, PriceQuote, TimeSlot};

/// Minimum lead time before an appointment may still be cancelled or moved.
pub const CHANGE_WINDOW_HOURS: i64 = 24;

/// Lifecycle of an appointment: `scheduled → completed | cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked and upcoming.
    Scheduled,
    /// Consultation took place.
    Completed,
    /// Cancelled; the slot is free again.
    Cancelled,
}

impl AppointmentStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the appointment still occupies its slot.
    pub const fn holds_slot(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown appointment status: {0}")]
pub struct ParseAppointmentStatusError(pub String);

impl FromStr for AppointmentStatus {
    type Err = ParseAppointmentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseAppointmentStatusError(other.to_owned())),
        }
    }
}

/// Price breakdown frozen onto the appointment at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSnapshot {
    /// Fee before discount, in minor units.
    pub original_amount: i64,
    /// Discount waived, in minor units.
    pub discount_applied: i64,
    /// Amount charged, in minor units.
    pub final_amount: i64,
    /// Currency of all three amounts.
    pub currency: Currency,
}

impl From<&PriceQuote> for PaymentSnapshot {
    fn from(quote: &PriceQuote) -> Self {
        Self {
            original_amount: quote.original_amount.amount(),
            discount_applied: quote.discount_applied.amount(),
            final_amount: quote.final_amount.amount(),
            currency: quote.final_amount.currency().clone(),
        }
    }
}

/// A booked consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// Consulting doctor.
    pub doctor_id: DoctorId,
    /// Booking patient.
    pub patient_id: PatientId,
    /// Calendar date of the consultation.
    pub date: NaiveDate,
    /// Wall-clock window.
    pub slot: TimeSlot,
    /// Lifecycle status.
    pub status: AppointmentStatus,
    /// Price breakdown at booking time.
    pub payment: PaymentSnapshot,
    /// Whether this was the patient's first booking with the doctor.
    pub is_first_consultation: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Flags derived from an appointment's date relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentTiming {
    /// The appointment date is before today (UTC).
    pub is_past: bool,
    /// The appointment may still be cancelled.
    pub can_cancel: bool,
    /// The appointment may still be rescheduled.
    pub can_reschedule: bool,
}

impl Appointment {
    /// Derive scheduling flags at `now`.
    ///
    /// An appointment is past once its date is before today's UTC date. It
    /// may be cancelled or rescheduled while it is still scheduled and its
    /// date starts more than [`CHANGE_WINDOW_HOURS`] hours after `now`.
    pub fn timing(&self, now: DateTime<Utc>) -> AppointmentTiming {
        let starts_at = self.date.and_time(NaiveTime::MIN).and_utc();
        let changeable = self.status == AppointmentStatus::Scheduled
            && starts_at - now > TimeDelta::hours(CHANGE_WINDOW_HOURS);
        AppointmentTiming {
            is_past: self.date < now.date_naive(),
            can_cancel: changeable,
            can_reschedule: changeable,
        }
    }
}
