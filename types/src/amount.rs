//! Token amount type.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid
//! floating-point errors. The smallest unit is 1 raw; one whole token is
//! 10^18 raw. User-facing decimal text is converted with integer
//! arithmetic only.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A balance or transfer amount in raw smallest units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

/// Errors from parsing decimal amount text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is negative")]
    Negative,
    #[error("amount is not a valid decimal number")]
    InvalidNumber,
    #[error("amount has more than {max} decimal places")]
    TooManyDecimals { max: u32 },
    #[error("amount exceeds the representable range")]
    Overflow,
}

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Decimal places per whole token.
    pub const DECIMALS: u32 = 18;

    /// Raw units in one whole token.
    pub const UNITS_PER_TOKEN: u128 = 10u128.pow(Self::DECIMALS);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Parse decimal token text (e.g. `"1.5"`) into raw smallest units.
    ///
    /// Accepts an optional fractional part of up to [`Self::DECIMALS`]
    /// digits. Rejects signs, empty input, and anything non-numeric.
    pub fn parse_decimal(text: &str) -> Result<Self, AmountError> {
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        if text.starts_with('-') {
            return Err(AmountError::Negative);
        }
        let (whole_text, frac_text) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole_text.is_empty() || !whole_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidNumber);
        }
        if text.contains('.') && frac_text.is_empty() {
            return Err(AmountError::InvalidNumber);
        }
        if !frac_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidNumber);
        }
        if frac_text.len() as u32 > Self::DECIMALS {
            return Err(AmountError::TooManyDecimals {
                max: Self::DECIMALS,
            });
        }

        let whole: u128 = whole_text
            .parse()
            .map_err(|_| AmountError::Overflow)?;
        let frac: u128 = if frac_text.is_empty() {
            0
        } else {
            let scale = 10u128.pow(Self::DECIMALS - frac_text.len() as u32);
            let digits: u128 = frac_text.parse().map_err(|_| AmountError::Overflow)?;
            digits * scale
        };

        whole
            .checked_mul(Self::UNITS_PER_TOKEN)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Format raw units as decimal token text, trimming trailing zeros.
    pub fn format_decimal(&self) -> String {
        let whole = self.0 / Self::UNITS_PER_TOKEN;
        let frac = self.0 % Self::UNITS_PER_TOKEN;
        if frac == 0 {
            return whole.to_string();
        }
        let frac_text = format!("{:0width$}", frac, width = Self::DECIMALS as usize);
        format!("{}.{}", whole, frac_text.trim_end_matches('0'))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_tokens() {
        let amount = Amount::parse_decimal("2").unwrap();
        assert_eq!(amount.raw(), 2 * Amount::UNITS_PER_TOKEN);
    }

    #[test]
    fn parse_fractional_tokens() {
        let amount = Amount::parse_decimal("1.5").unwrap();
        assert_eq!(amount.raw(), 15 * Amount::UNITS_PER_TOKEN / 10);
    }

    #[test]
    fn parse_smallest_unit() {
        let amount = Amount::parse_decimal("0.000000000000000001").unwrap();
        assert_eq!(amount.raw(), 1);
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Amount::parse_decimal(""), Err(AmountError::Empty));
    }

    #[test]
    fn parse_rejects_negative() {
        assert_eq!(Amount::parse_decimal("-1"), Err(AmountError::Negative));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(
            Amount::parse_decimal("abc"),
            Err(AmountError::InvalidNumber)
        );
        assert_eq!(
            Amount::parse_decimal("1.2.3"),
            Err(AmountError::InvalidNumber)
        );
        assert_eq!(Amount::parse_decimal("."), Err(AmountError::InvalidNumber));
        assert_eq!(Amount::parse_decimal("5."), Err(AmountError::InvalidNumber));
    }

    #[test]
    fn parse_rejects_too_many_decimals() {
        let result = Amount::parse_decimal("0.0000000000000000001");
        assert!(matches!(result, Err(AmountError::TooManyDecimals { .. })));
    }

    #[test]
    fn parse_rejects_overflow() {
        let result = Amount::parse_decimal(&u128::MAX.to_string());
        assert_eq!(result, Err(AmountError::Overflow));
    }

    #[test]
    fn format_trims_trailing_zeros() {
        let amount = Amount::new(15 * Amount::UNITS_PER_TOKEN / 10);
        assert_eq!(amount.format_decimal(), "1.5");
    }

    #[test]
    fn format_whole_amount_has_no_point() {
        let amount = Amount::new(3 * Amount::UNITS_PER_TOKEN);
        assert_eq!(amount.format_decimal(), "3");
    }

    #[test]
    fn format_zero() {
        assert_eq!(Amount::ZERO.format_decimal(), "0");
    }
}
