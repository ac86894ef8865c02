//! Monetary amounts in integer minor units.
//!
//! Amounts are stored as `i64` counts of the currency's minor unit (paise for
//! INR) so pricing arithmetic stays exact. Operations never mix currencies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation and arithmetic errors for [`Money`] and [`Currency`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// Currency codes are three uppercase ASCII letters.
    #[error("currency must be a three-letter ISO 4217 code, got {0:?}")]
    InvalidCurrency(String),
    /// Amounts in this domain are never negative.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(i64),
    /// Discount percentages are bounded by 100.
    #[error("percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(u8),
    /// Both operands must share a currency.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: Currency,
        /// Currency of the right operand.
        right: Currency,
    },
    /// Subtraction would drop below zero.
    #[error("cannot subtract {subtrahend} from {minuend}")]
    Underflow {
        /// Amount subtracted from.
        minuend: i64,
        /// Amount subtracted.
        subtrahend: i64,
    },
}

/// ISO 4217 alphabetic currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Validate a currency code.
    ///
    /// # Examples
    /// ```
    /// use telecare::domain::Currency;
    ///
    /// assert!(Currency::new("INR").is_ok());
    /// assert!(Currency::new("inr").is_err());
    /// ```
    pub fn new(code: impl Into<String>) -> Result<Self, MoneyError> {
        let code = code.into();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(MoneyError::InvalidCurrency(code))
        }
    }

    /// Indian rupee, the platform's default wallet currency.
    pub fn inr() -> Self {
        Self("INR".to_owned())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

/// Non-negative amount of money in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyDto", into = "MoneyDto")]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Construct a validated amount.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, MoneyError> {
        if amount < 0 {
            return Err(MoneyError::NegativeAmount(amount));
        }
        Ok(Self { amount, currency })
    }

    /// Zero in the given currency.
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Amount in minor units.
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Currency of the amount.
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Whether the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            })
        }
    }

    /// Subtract `other`, failing on currency mismatch or underflow.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        if other.amount > self.amount {
            return Err(MoneyError::Underflow {
                minuend: self.amount,
                subtrahend: other.amount,
            });
        }
        Ok(Self {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Whether this amount covers `other`.
    pub fn covers(&self, other: &Self) -> Result<bool, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount >= other.amount)
    }

    /// The smaller of two amounts in the same currency.
    pub fn min(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(if other.amount < self.amount {
            other.clone()
        } else {
            self.clone()
        })
    }

    /// `percentage`% of this amount, truncated toward zero.
    ///
    /// # Examples
    /// ```
    /// use telecare::domain::{Currency, Money};
    ///
    /// let fee = Money::new(50_000, Currency::inr()).expect("valid amount");
    /// assert_eq!(fee.percent(20).expect("valid percentage").amount(), 10_000);
    /// ```
    pub fn percent(&self, percentage: u8) -> Result<Self, MoneyError> {
        if percentage > 100 {
            return Err(MoneyError::InvalidPercentage(percentage));
        }
        // Amounts are non-negative, so Euclidean division truncates.
        let scaled = (i128::from(self.amount) * i128::from(percentage)).div_euclid(100);
        // Never larger than `self.amount`, so the conversion cannot fail.
        let amount = i64::try_from(scaled).unwrap_or(self.amount);
        Ok(Self {
            amount,
            currency: self.currency.clone(),
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[derive(Serialize, Deserialize)]
struct MoneyDto {
    amount: i64,
    currency: Currency,
}

impl TryFrom<MoneyDto> for Money {
    type Error = MoneyError;

    fn try_from(value: MoneyDto) -> Result<Self, Self::Error> {
        Self::new(value.amount, value.currency)
    }
}

impl From<Money> for MoneyDto {
    fn from(value: Money) -> Self {
        Self {
            amount: value.amount,
            currency: value.currency,
        }
    }
}
