use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of minor units in one major unit for every currency the provider accepts.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount {0} has more than two decimal places")]
    SubMinorPrecision(String),
    #[error("amount {0} is negative")]
    Negative(String),
    #[error("amount {0} does not fit in minor units")]
    Overflow(String),
}

/// Normalize a monetary value to 2 decimal places.
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale(2)
}

/// Convert a major-unit amount (e.g. `12.34`) to integer minor units (`1234`).
///
/// Fractions of a minor unit are rejected rather than rounded: the provider
/// would otherwise charge a different amount than the invoice shows.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, MoneyError> {
    if amount < &BigDecimal::from(0) {
        return Err(MoneyError::Negative(amount.to_string()));
    }
    let scaled = amount.clone() * BigDecimal::from(MINOR_UNITS_PER_MAJOR);
    let whole = scaled.with_scale(0);
    if whole != scaled {
        return Err(MoneyError::SubMinorPrecision(amount.to_string()));
    }
    whole
        .to_i64()
        .ok_or_else(|| MoneyError::Overflow(amount.to_string()))
}

/// Convert integer minor units back to a major-unit amount at scale 2.
pub fn from_minor_units(minor: i64) -> BigDecimal {
    normalize_scale(&(BigDecimal::from(minor) / BigDecimal::from(MINOR_UNITS_PER_MAJOR)))
}

/// An amount held in provider minor units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub fn new(value: i64) -> Self {
        Self(value)
    }
    pub fn from_major(amount: &BigDecimal) -> Result<Self, MoneyError> {
        to_minor_units(amount).map(Self)
    }
    pub fn get(self) -> i64 {
        self.0
    }
    pub fn to_major(self) -> BigDecimal {
        from_minor_units(self.0)
    }
}

impl std::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
