//! Pure validation of user-entered amounts and names.
//!
//! Synchronous and side-effect free, so every rejection path can be
//! unit-tested without a network.

use coffer_types::{Amount, BankName};

use crate::error::ValidationError;

/// Parse user-entered decimal token text into raw smallest units.
///
/// Rejects empty, non-numeric, negative, and zero values.
pub fn parse_amount(text: &str) -> Result<Amount, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAmount);
    }
    let amount = Amount::parse_decimal(trimmed)?;
    if amount.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(amount)
}

/// Encode user-entered name text into the contract's fixed 32-byte slot.
pub fn parse_name(text: &str) -> Result<BankName, ValidationError> {
    Ok(BankName::encode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_round_trips_positive_integers() {
        let amount = parse_amount("5").unwrap();
        assert_eq!(amount.raw(), 5 * Amount::UNITS_PER_TOKEN);
        assert_eq!(amount.format_decimal(), "5");
    }

    #[test]
    fn parse_amount_accepts_fractions() {
        let amount = parse_amount("0.25").unwrap();
        assert_eq!(amount.raw(), Amount::UNITS_PER_TOKEN / 4);
    }

    #[test]
    fn parse_amount_trims_whitespace() {
        assert_eq!(parse_amount(" 1 ").unwrap(), parse_amount("1").unwrap());
    }

    #[test]
    fn parse_amount_rejects_empty() {
        assert_eq!(parse_amount(""), Err(ValidationError::EmptyAmount));
        assert_eq!(parse_amount("   "), Err(ValidationError::EmptyAmount));
    }

    #[test]
    fn parse_amount_rejects_negative() {
        assert_eq!(parse_amount("-1"), Err(ValidationError::Negative));
    }

    #[test]
    fn parse_amount_rejects_zero() {
        assert_eq!(parse_amount("0"), Err(ValidationError::ZeroAmount));
        assert_eq!(parse_amount("0.0"), Err(ValidationError::ZeroAmount));
    }

    #[test]
    fn parse_amount_rejects_non_numeric() {
        assert_eq!(parse_amount("abc"), Err(ValidationError::InvalidNumber));
        assert_eq!(parse_amount("1,5"), Err(ValidationError::InvalidNumber));
    }

    #[test]
    fn parse_amount_rejects_excess_precision() {
        assert!(matches!(
            parse_amount("0.0000000000000000001"),
            Err(ValidationError::TooManyDecimals { .. })
        ));
    }

    #[test]
    fn parse_name_encodes_and_round_trips() {
        let name = parse_name("MyBank").unwrap();
        assert_eq!(name.decode().unwrap(), "MyBank");
    }

    #[test]
    fn parse_name_accepts_empty() {
        assert!(parse_name("").unwrap().is_empty());
    }

    #[test]
    fn parse_name_rejects_over_capacity() {
        let long = "x".repeat(33);
        assert_eq!(
            parse_name(&long),
            Err(ValidationError::NameTooLong { len: 33, max: 32 })
        );
    }
}
