//! Account address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A ledger account address: `0x` followed by 40 hex characters.
///
/// Addresses are normalised to lowercase on parse so equality checks do
/// not depend on the casing the provider happened to return.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

/// Errors from parsing an account address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must be {expected} characters, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("address contains a non-hex character")]
    InvalidHex,
}

impl Address {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "0x";

    /// Total string length of a well-formed address (`0x` + 40 hex chars).
    pub const LEN: usize = 42;

    /// Parse and validate a raw address string.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        if !raw.starts_with(Self::PREFIX) {
            return Err(AddressError::MissingPrefix);
        }
        if raw.len() != Self::LEN {
            return Err(AddressError::InvalidLength {
                expected: Self::LEN,
                got: raw.len(),
            });
        }
        if !raw[2..].chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex);
        }
        Ok(Self(raw.to_lowercase()))
    }

    /// The all-zero address (unconfigured owner slot on the contract).
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated display form: first 6 and last 4 characters.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
