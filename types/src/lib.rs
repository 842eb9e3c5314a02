//! Fundamental types for the coffer bank-contract client.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: account addresses, token amounts, the fixed-width bank-name
//! slot, transaction hashes, and transaction state enums.

pub mod address;
pub mod amount;
pub mod bank_name;
pub mod hash;
pub mod tx;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError};
pub use bank_name::{BankName, NameError};
pub use hash::{HashParseError, TxHash};
pub use tx::{TxKind, TxStatus};
