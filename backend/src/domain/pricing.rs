//! Consultation pricing.
//!
//! Pricing is a pure function of the doctor's fee policy and whether the
//! patient has consulted the doctor before. The booking service quotes the
//! price up front for its funds check and the persistence adapter quotes it
//! again under the patient row lock, so both must agree.

use serde::{Deserialize, Serialize};

use super::{Doctor, Money, MoneyError};

/// Price breakdown for a single consultation.
///
/// ## Invariants
/// - `final_amount == original_amount - discount_applied`
/// - `discount_applied` is zero unless `is_first_consultation` holds and the
///   doctor offers a first-time discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Doctor's consultation fee.
    pub original_amount: Money,
    /// Amount waived.
    pub discount_applied: Money,
    /// Amount charged to the wallet.
    pub final_amount: Money,
    /// Whether this is the patient's first booking with the doctor.
    pub is_first_consultation: bool,
}

/// Quote a consultation with `doctor`.
///
/// The discount is `min(fee * percentage / 100, max_amount)`, applied only on
/// a first consultation.
///
/// # Examples
/// ```
/// use telecare::domain::{
///     Currency, Doctor, DoctorDraft, DoctorId, FirstTimeDiscount, Money, quote_consultation,
/// };
///
/// let inr = |amount| Money::new(amount, Currency::inr()).expect("valid amount");
/// let doctor = Doctor::new(DoctorDraft {
///     id: DoctorId::random(),
///     name: "Dr. Mehta".to_owned(),
///     specialization: "dermatology".to_owned(),
///     fee: inr(50_000),
///     first_time_discount: Some(FirstTimeDiscount::new(20, inr(8_000)).expect("valid policy")),
/// })
/// .expect("valid doctor");
///
/// let quote = quote_consultation(&doctor, true).expect("quote succeeds");
/// assert_eq!(quote.discount_applied.amount(), 8_000);
/// assert_eq!(quote.final_amount.amount(), 42_000);
/// ```
pub fn quote_consultation(
    doctor: &Doctor,
    is_first_consultation: bool,
) -> Result<PriceQuote, MoneyError> {
    let original_amount = doctor.fee().clone();
    let discount_applied = match (is_first_consultation, doctor.first_time_discount()) {
        (true, Some(policy)) => original_amount
            .percent(policy.percentage())?
            .min(policy.max_amount())?,
        _ => Money::zero(original_amount.currency().clone()),
    };
    let final_amount = original_amount.checked_sub(&discount_applied)?;
    Ok(PriceQuote {
        original_amount,
        discount_applied,
        final_amount,
        is_first_consultation,
    })
}
