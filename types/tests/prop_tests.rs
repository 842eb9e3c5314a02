use proptest::prelude::*;

use coffer_types::{Amount, BankName, TxHash};

proptest! {
    /// TxHash roundtrip: new -> as_bytes produces identical bytes.
    #[test]
    fn tx_hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// TxHash::is_zero is true only for all-zero bytes.
    #[test]
    fn tx_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// TxHash hex roundtrip: Display -> from_hex produces identical hash.
    #[test]
    fn tx_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let parsed = TxHash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// Amount: raw roundtrip.
    #[test]
    fn amount_raw_roundtrip(raw in 0u128..u128::MAX / 2) {
        let amount = Amount::new(raw);
        prop_assert_eq!(amount.raw(), raw);
    }

    /// Amount: decimal format -> parse roundtrip for any raw value.
    #[test]
    fn amount_decimal_roundtrip(raw in 0u128..u128::MAX / 2) {
        let amount = Amount::new(raw);
        let parsed = Amount::parse_decimal(&amount.format_decimal()).unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Amount: parsing a whole-token count scales by 10^18.
    #[test]
    fn amount_whole_token_parse(tokens in 0u128..1_000_000_000) {
        let amount = Amount::parse_decimal(&tokens.to_string()).unwrap();
        prop_assert_eq!(amount.raw(), tokens * Amount::UNITS_PER_TOKEN);
    }

    /// Amount: checked_add(a, b) == Some(a + b) when no overflow.
    #[test]
    fn amount_checked_add(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        let sum = Amount::new(a).checked_add(Amount::new(b));
        prop_assert_eq!(sum, Some(Amount::new(a + b)));
    }

    /// Amount: checked_sub returns None exactly when b > a.
    #[test]
    fn amount_checked_sub_underflow(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = Amount::new(a).checked_sub(Amount::new(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(Amount::new(a - b)));
        }
    }

    /// Amount: saturating_sub never panics and returns ZERO on underflow.
    #[test]
    fn amount_saturating_sub(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = Amount::new(a).saturating_sub(Amount::new(b));
        if b > a {
            prop_assert_eq!(result, Amount::ZERO);
        } else {
            prop_assert_eq!(result, Amount::new(a - b));
        }
    }

    /// Amount: is_zero matches raw == 0.
    #[test]
    fn amount_is_zero(raw in 0u128..1_000) {
        let amount = Amount::new(raw);
        prop_assert_eq!(amount.is_zero(), raw == 0);
    }

    /// BankName: encode/decode roundtrip for any text that fits the slot.
    #[test]
    fn bank_name_roundtrip(text in "[a-zA-Z0-9 ]{0,32}") {
        let name = BankName::encode(&text).unwrap();
        prop_assert_eq!(name.decode().unwrap(), text);
    }

    /// BankName: hex wire roundtrip.
    #[test]
    fn bank_name_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let name = BankName::from_bytes(bytes);
        let parsed = BankName::from_hex(&name.to_hex()).unwrap();
        prop_assert_eq!(parsed.as_bytes(), name.as_bytes());
    }

    /// BankName: encoding always rejects text longer than the slot.
    #[test]
    fn bank_name_rejects_oversized(text in "[a-z]{33,64}") {
        prop_assert!(BankName::encode(&text).is_err());
    }
}
