//! Transaction hash type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

/// Error from parsing a hash's hex wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction hash must be 64 hex characters")]
pub struct HashParseError;

impl TxHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse the hex wire representation (with or without `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| HashParseError)?;
        if bytes.len() != 32 {
            return Err(HashParseError);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        let hash = TxHash::new([7u8; 32]);
        let parsed = TxHash::from_hex(&hash.to_string()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn from_hex_accepts_0x_prefix() {
        let hash = TxHash::new([1u8; 32]);
        let parsed = TxHash::from_hex(&format!("0x{hash}")).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert_eq!(TxHash::from_hex("abcd"), Err(HashParseError));
    }

    #[test]
    fn debug_is_truncated() {
        let hash = TxHash::new([0xab; 32]);
        assert_eq!(format!("{hash:?}"), "TxHash(abababab)");
    }
}
