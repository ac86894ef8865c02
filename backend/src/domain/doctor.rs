//! Doctor directory entries.

use serde::{Deserialize, Serialize};

use super::{DoctorId, Money, MoneyError};

/// Discount granted on a patient's first consultation with a doctor.
///
/// ## Invariants
/// - `percentage` is within `0..=100`.
/// - `max_amount` shares the currency of the doctor's fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstTimeDiscount {
    percentage: u8,
    max_amount: Money,
}

impl FirstTimeDiscount {
    /// Validate a discount policy.
    pub fn new(percentage: u8, max_amount: Money) -> Result<Self, MoneyError> {
        if percentage > 100 {
            return Err(MoneyError::InvalidPercentage(percentage));
        }
        Ok(Self {
            percentage,
            max_amount,
        })
    }

    /// Percentage of the fee waived.
    pub const fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Cap on the waived amount.
    pub const fn max_amount(&self) -> &Money {
        &self.max_amount
    }
}

/// Errors raised when assembling a [`Doctor`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DoctorValidationError {
    /// Display name was blank.
    #[error("doctor name must not be empty")]
    EmptyName,
    /// Discount cap currency differs from the fee currency.
    #[error("discount cap currency {cap} does not match fee currency {fee}")]
    DiscountCurrencyMismatch {
        /// Fee currency.
        fee: String,
        /// Discount cap currency.
        cap: String,
    },
}

/// Bookable doctor profile as seen by the booking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    id: DoctorId,
    name: String,
    specialization: String,
    fee: Money,
    first_time_discount: Option<FirstTimeDiscount>,
}

/// Input bundle for [`Doctor::new`].
#[derive(Debug, Clone)]
pub struct DoctorDraft {
    /// Doctor identifier.
    pub id: DoctorId,
    /// Display name.
    pub name: String,
    /// Specialization tag, e.g. `cardiology`.
    pub specialization: String,
    /// Consultation fee.
    pub fee: Money,
    /// Optional first-visit discount policy.
    pub first_time_discount: Option<FirstTimeDiscount>,
}

impl Doctor {
    /// Validate and build a doctor profile.
    pub fn new(draft: DoctorDraft) -> Result<Self, DoctorValidationError> {
        let DoctorDraft {
            id,
            name,
            specialization,
            fee,
            first_time_discount,
        } = draft;
        if name.trim().is_empty() {
            return Err(DoctorValidationError::EmptyName);
        }
        if let Some(discount) = &first_time_discount {
            let cap = discount.max_amount().currency();
            if cap != fee.currency() {
                return Err(DoctorValidationError::DiscountCurrencyMismatch {
                    fee: fee.currency().to_string(),
                    cap: cap.to_string(),
                });
            }
        }
        Ok(Self {
            id,
            name,
            specialization,
            fee,
            first_time_discount,
        })
    }

    /// Doctor identifier.
    pub const fn id(&self) -> DoctorId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Specialization tag.
    pub fn specialization(&self) -> &str {
        self.specialization.as_str()
    }

    /// Consultation fee.
    pub const fn fee(&self) -> &Money {
        &self.fee
    }

    /// First-visit discount policy, if the doctor offers one.
    pub const fn first_time_discount(&self) -> Option<&FirstTimeDiscount> {
        self.first_time_discount.as_ref()
    }

    /// Display projection used by list endpoints.
    pub fn summary(&self) -> DoctorSummary {
        DoctorSummary {
            id: self.id,
            name: self.name.clone(),
            specialization: self.specialization.clone(),
        }
    }
}

/// Doctor display data attached to appointment and transaction listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    /// Doctor identifier.
    pub id: DoctorId,
    /// Display name.
    pub name: String,
    /// Specialization tag.
    pub specialization: String,
}
