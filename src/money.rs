//! Exact decimal amounts of money.

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// An exact amount of money with two decimal places, e.g. `12.30`.
///
/// Amounts have at most 12 digits, 10 before and 2 after the decimal point.
/// In the database they are stored as an integer number of cents so that
/// SQLite can sum them without rounding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The number of digits after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;

    /// The total number of digits an amount may have.
    pub const MAX_DIGITS: u32 = 12;

    /// An amount of zero, i.e. `0.00`.
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, Self::DECIMAL_PLACES));

    /// Create an amount from a decimal number.
    ///
    /// Values with fewer than two decimal places are padded, e.g. `5` becomes `5.00`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `value` has more than two
    /// significant decimal places or more than [Amount::MAX_DIGITS] digits.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let normalized = value.normalize();

        if normalized.scale() > Self::DECIMAL_PLACES {
            return Err(Error::InvalidAmount(format!(
                "{value} has more than {} decimal places",
                Self::DECIMAL_PLACES
            )));
        }

        let mut amount = normalized;
        amount.rescale(Self::DECIMAL_PLACES);

        if amount.mantissa().unsigned_abs() >= 10u128.pow(Self::MAX_DIGITS) {
            return Err(Error::InvalidAmount(format!(
                "{value} has more than {} digits",
                Self::MAX_DIGITS
            )));
        }

        Ok(Self(amount))
    }

    /// Create an amount from a whole number of cents, e.g. `1230` is `12.30`.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::DECIMAL_PLACES))
    }

    /// The amount as a whole number of cents.
    pub fn cents(&self) -> i64 {
        // The scale is always two and the digits are bounded, so the mantissa
        // is the number of cents and fits in an i64.
        self.0.mantissa() as i64
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
