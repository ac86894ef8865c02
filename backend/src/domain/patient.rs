//! Patient accounts and wallets.

use serde::{Deserialize, Serialize};

use super::{DoctorId, Money, PatientId};

/// Patient account as seen by the booking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Patient identifier.
    pub id: PatientId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Optional contact phone.
    pub phone: Option<String>,
    /// Current wallet balance.
    pub wallet: Money,
    /// Doctors this patient has already booked with.
    pub appointed_doctors: Vec<DoctorId>,
}

impl Patient {
    /// Whether a booking with `doctor` would be this patient's first.
    pub fn is_first_consultation_with(&self, doctor: DoctorId) -> bool {
        !self.appointed_doctors.contains(&doctor)
    }

    /// Display projection used by doctor-facing listings.
    pub fn summary(&self) -> PatientSummary {
        PatientSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Patient profile fields attached to doctor-facing listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    /// Patient identifier.
    pub id: PatientId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Optional contact phone.
    pub phone: Option<String>,
}
