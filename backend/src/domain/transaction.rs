//! Transaction ledger entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppointmentId, DoctorId, Money, PatientId, PriceQuote, TransactionId};

/// Payment method recorded for wallet-settled bookings.
pub const WALLET_PAYMENT_METHOD: &str = "wallet";

/// Kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Settles an appointment booking.
    AppointmentPayment,
    /// Adds funds to a wallet.
    WalletCredit,
    /// Removes funds from a wallet outside a booking.
    WalletDebit,
}

/// Settlement state of a transaction: `pending → completed | failed | refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting settlement.
    Pending,
    /// Settled.
    Completed,
    /// Settlement failed.
    Failed,
    /// Returned to the payer.
    Refunded,
}

/// Raised when parsing an unknown enum string from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseTransactionFieldError {
    /// Which field failed.
    pub kind: &'static str,
    /// Raw input.
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Stable storage and wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseTransactionFieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseTransactionFieldError {
                        kind: $label,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

string_enum!(TransactionKind, "transaction kind", {
    AppointmentPayment => "appointment_payment",
    WalletCredit => "wallet_credit",
    WalletDebit => "wallet_debit",
});

string_enum!(TransactionStatus, "transaction status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

/// Free-form context stored alongside a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    /// Discount waived on the settled appointment, in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_applied: Option<i64>,
    /// Fee before discount, in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<i64>,
    /// How the payment was funded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl TransactionMetadata {
    /// Metadata for a wallet-funded booking.
    pub fn wallet_booking(quote: &PriceQuote) -> Self {
        Self {
            discount_applied: Some(quote.discount_applied.amount()),
            original_amount: Some(quote.original_amount.amount()),
            payment_method: Some(WALLET_PAYMENT_METHOD.to_owned()),
        }
    }
}

/// A single money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Paying or receiving patient.
    pub patient_id: PatientId,
    /// Doctor paid, when the movement settles a booking.
    pub doctor_id: Option<DoctorId>,
    /// Appointment settled, for [`TransactionKind::AppointmentPayment`].
    pub appointment_id: Option<AppointmentId>,
    /// Kind of movement.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount moved.
    pub amount: Money,
    /// Settlement state.
    pub status: TransactionStatus,
    /// Extra context.
    pub metadata: TransactionMetadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
