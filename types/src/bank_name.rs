//! Fixed-width bank-name slot.
//!
//! The remote contract stores the bank name in a single 32-byte slot.
//! Encoding zero-pads UTF-8 text into the slot; decoding strips the
//! trailing padding back off.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A bank name encoded into the contract's fixed 32-byte text slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankName([u8; 32]);

/// Errors from encoding or decoding the name slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is {len} bytes, exceeds the {max}-byte slot")]
    TooLong { len: usize, max: usize },
    #[error("name slot does not contain valid UTF-8")]
    InvalidUtf8,
    #[error("name slot hex must be {expected} characters, got {got}")]
    InvalidHex { expected: usize, got: usize },
}

impl BankName {
    /// Byte capacity of the contract's name slot.
    pub const CAPACITY: usize = 32;

    /// Encode text into the slot, zero-padded on the right.
    pub fn encode(text: &str) -> Result<Self, NameError> {
        let bytes = text.as_bytes();
        if bytes.len() > Self::CAPACITY {
            return Err(NameError::TooLong {
                len: bytes.len(),
                max: Self::CAPACITY,
            });
        }
        let mut slot = [0u8; 32];
        slot[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(slot))
    }

    /// Decode the slot back to text, stripping trailing zero padding.
    pub fn decode(&self) -> Result<String, NameError> {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        std::str::from_utf8(&self.0[..end])
            .map(str::to_owned)
            .map_err(|_| NameError::InvalidUtf8)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether the slot is entirely padding (no name configured yet).
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Hex wire representation of the raw slot.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the hex wire representation back into a slot.
    pub fn from_hex(s: &str) -> Result<Self, NameError> {
        let bytes = hex::decode(s).map_err(|_| NameError::InvalidHex {
            expected: Self::CAPACITY * 2,
            got: s.len(),
        })?;
        if bytes.len() != Self::CAPACITY {
            return Err(NameError::InvalidHex {
                expected: Self::CAPACITY * 2,
                got: s.len(),
            });
        }
        let mut slot = [0u8; 32];
        slot.copy_from_slice(&bytes);
        Ok(Self(slot))
    }
}

impl fmt::Debug for BankName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok(text) => write!(f, "BankName({:?})", text),
            Err(_) => write!(f, "BankName(0x{})", hex::encode(&self.0[..4])),
        }
    }
}
