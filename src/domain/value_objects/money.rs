//! # Money Value Object
//!
//! A non-negative decimal amount paired with an ISO currency code.
//!
//! Amounts are never carried as bare numbers. Construction rejects negative
//! values, and deserialization goes through the same check.
//!
//! # Examples
//!
//! ```
//! use carrier_gateway::domain::value_objects::money::Money;
//! use rust_decimal::Decimal;
//!
//! let base = Money::cad(Decimal::new(1599, 2)).unwrap();
//! let fuel = Money::cad(Decimal::new(192, 2)).unwrap();
//! let sum = base.checked_add(&fuel).unwrap();
//! assert_eq!(sum.amount(), Decimal::new(1791, 2));
//!
//! assert!(Money::cad(Decimal::new(-1, 0)).is_err());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default currency for every carrier in the gateway.
pub const DEFAULT_CURRENCY: &str = "CAD";

/// Errors raised when constructing or combining [`Money`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount was negative.
    #[error("money amount must not be negative: {0}")]
    Negative(Decimal),

    /// Two amounts in different currencies were combined.
    #[error("currency mismatch: {0} vs {1}")]
    CurrencyMismatch(String, String),

    /// Decimal arithmetic overflowed.
    #[error("money arithmetic overflow")]
    Overflow,
}

#[derive(Deserialize)]
struct RawMoney {
    amount: Decimal,
    #[serde(default)]
    currency: String,
}

/// A monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    /// Creates a new amount.
    ///
    /// An empty currency is normalized to [`DEFAULT_CURRENCY`].
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        let currency = currency.into();
        let currency = if currency.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            currency.trim().to_uppercase()
        };
        Ok(Self { amount, currency })
    }

    /// Creates an amount in Canadian dollars.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount` is below zero.
    pub fn cad(amount: Decimal) -> Result<Self, MoneyError> {
        Self::new(amount, DEFAULT_CURRENCY)
    }

    /// Creates an amount from whole cents; cannot be negative.
    #[must_use]
    pub fn from_cents(cents: u32, currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            amount: Decimal::new(i64::from(cents), 2),
            currency: if currency.trim().is_empty() {
                DEFAULT_CURRENCY.to_string()
            } else {
                currency.trim().to_uppercase()
            },
        }
    }

    /// Returns a zero amount in the given currency.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            amount: Decimal::ZERO,
            currency: if currency.is_empty() {
                DEFAULT_CURRENCY.to_string()
            } else {
                currency
            },
        }
    }

    /// Returns the amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the ISO currency code.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Adds two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] for differing currencies and
    /// [`MoneyError::Overflow`] if the sum does not fit.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.clone(),
                other.currency.clone(),
            ));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            amount,
            currency: self.currency.clone(),
        })
    }
}

impl TryFrom<RawMoney> for Money {
    type Error = MoneyError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Self::new(raw.amount, raw.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}
