//! Non-negative menu prices in Egyptian pounds.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Currency label shown after every amount ("Egyptian pound").
pub const CURRENCY_LABEL: &str = "ج.م";

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price is not a number: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A menu price.
///
/// Stored as an exact decimal so that `price × quantity` sums never drift.
/// The backend returns prices as JSON numbers; they are written back as
/// decimal strings, which a `numeric` column accepts.
///
/// ```
/// use baladi_core::Price;
///
/// let price = Price::parse("12.5").unwrap();
/// assert_eq!(price.to_string(), "12.50");
/// assert_eq!(price.display(), "12.50 ج.م");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero pounds.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a price from user input such as `"50"` or `"12.75"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        let amount =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;
        Self::new(amount)
    }

    /// This price multiplied by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Amount with two decimals followed by the currency label.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{self} {CURRENCY_LABEL}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl core::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize<'de>>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        assert_eq!(Price::parse("50").unwrap().to_string(), "50.00");
        assert_eq!(Price::parse("7.005").unwrap().to_string(), "7.00");
        assert_eq!(Price::parse("0").unwrap().display(), "0.00 ج.م");
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert_eq!(Price::parse("-3"), Err(PriceError::Negative));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn multiplies_exactly() {
        let price = Price::parse("0.10").unwrap();
        assert_eq!(price.times(3), Price::parse("0.30").unwrap());
    }

    #[test]
    fn deserializes_backend_numbers() {
        let price: Price = serde_json::from_str("49.5").unwrap();
        assert_eq!(price.to_string(), "49.50");

        let price: Price = serde_json::from_str("\"12.25\"").unwrap();
        assert_eq!(price.to_string(), "12.25");

        assert!(serde_json::from_str::<Price>("-1").is_err());
    }
}
