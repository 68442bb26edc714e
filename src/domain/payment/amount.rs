//! Monetary amount value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Number of decimal places in the smallest currency unit.
pub const CURRENCY_SCALE: u32 = 2;

/// Largest accepted amount, 9,999,999,999.99 in major units.
///
/// Matches the `NUMERIC(12,2)` column and keeps fee arithmetic and minor
/// unit conversion far from `Decimal` overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// A strictly positive payment amount expressed in major currency units.
///
/// Amounts carry at most two decimal places so that every amount maps
/// exactly onto processor minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PaymentAmount(Decimal);

impl PaymentAmount {
    /// Creates a validated payment amount.
    ///
    /// # Errors
    ///
    /// - `NotPositive` if the amount is zero or negative
    /// - `TooLarge` if the amount exceeds [`MAX_AMOUNT`]
    /// - `InvalidFormat` if the amount has more than two decimal places
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::not_positive("amount", value));
        }
        if value > MAX_AMOUNT {
            return Err(ValidationError::too_large("amount", MAX_AMOUNT, value));
        }
        let normalized = value.normalize();
        if normalized.scale() > CURRENCY_SCALE {
            return Err(ValidationError::invalid_format(
                "amount",
                format!("at most {} decimal places allowed", CURRENCY_SCALE),
            ));
        }
        Ok(Self(normalized))
    }

    /// Returns the amount as a decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Converts the amount into processor minor units (e.g. cents).
    pub fn to_minor_units(&self) -> Result<i64, ValidationError> {
        self.0
            .checked_mul(Decimal::from(10_i64.pow(CURRENCY_SCALE)))
            .and_then(|minor| i64::try_from(minor).ok())
            .ok_or_else(|| ValidationError::too_large("amount", MAX_AMOUNT, self.0))
    }
}

impl<'de> Deserialize<'de> for PaymentAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        PaymentAmount::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn accepts_positive_amount() {
        let amount = PaymentAmount::new(dec("1200.00")).unwrap();
        assert_eq!(amount.as_decimal(), dec("1200"));
        assert_eq!(amount.to_string(), "1200.00");
    }

    #[test]
    fn rejects_zero() {
        let result = PaymentAmount::new(Decimal::ZERO);
        assert!(matches!(result, Err(ValidationError::NotPositive { .. })));
    }

    #[test]
    fn rejects_negative() {
        let result = PaymentAmount::new(dec("-10.50"));
        assert!(matches!(result, Err(ValidationError::NotPositive { .. })));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        let result = PaymentAmount::new(dec("10.005"));
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert!(PaymentAmount::new(dec("10.5000")).is_ok());
    }

    #[test]
    fn max_amount_is_the_largest_two_place_value_of_twelve_digits() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));
    }

    #[test]
    fn rejects_amount_above_maximum() {
        let result = PaymentAmount::new(dec("79228162514264337593543950335"));
        assert!(matches!(result, Err(ValidationError::TooLarge { .. })));

        let result = PaymentAmount::new(MAX_AMOUNT + dec("0.01"));
        assert!(matches!(result, Err(ValidationError::TooLarge { .. })));
    }

    #[test]
    fn maximum_amount_converts_to_minor_units() {
        let amount = PaymentAmount::new(MAX_AMOUNT).unwrap();
        assert_eq!(amount.to_minor_units().unwrap(), 999_999_999_999);
    }

    #[test]
    fn converts_to_minor_units() {
        let amount = PaymentAmount::new(dec("1200.50")).unwrap();
        assert_eq!(amount.to_minor_units().unwrap(), 120050);
    }

    #[test]
    fn deserialization_enforces_positivity() {
        let ok: Result<PaymentAmount, _> = serde_json::from_str("\"99.99\"");
        assert!(ok.is_ok());

        let err: Result<PaymentAmount, _> = serde_json::from_str("\"0\"");
        assert!(err.is_err());

        let huge: Result<PaymentAmount, _> =
            serde_json::from_str("\"79228162514264337593543950335\"");
        assert!(huge.is_err());
    }
}
