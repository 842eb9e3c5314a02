//! Error taxonomy for the controller.
//!
//! Validation errors never reach the network layer; read failures are
//! field-scoped and never abort sibling reads; submission failures
//! terminate their transaction and are surfaced verbatim. No error here
//! is fatal to the controller: the session and read-model remain usable
//! after any single failure.

use std::fmt;
use thiserror::Error;

use coffer_types::{Amount, AmountError, NameError, TxHash, TxKind};

/// Failures from the external account provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no wallet provider is configured")]
    Missing,

    #[error("wallet connection rejected: {0}")]
    Rejected(String),

    #[error("provider RPC error: {0}")]
    Rpc(String),
}

/// Which cached read-model field a read failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadField {
    BankName,
    BankOwner,
    Balance,
}

impl fmt::Display for ReadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BankName => "bank name",
            Self::BankOwner => "bank owner",
            Self::Balance => "balance",
        };
        write!(f, "{name}")
    }
}

/// Failures from the remote ledger contract gateway.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("ledger RPC error: {0}")]
    Rpc(String),

    #[error("failed to read {field}: {reason}")]
    Read { field: ReadField, reason: String },

    #[error("submission failed: {reason}")]
    Submission { reason: String },

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

/// Failures from parsing user-entered amounts and names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount is empty")]
    EmptyAmount,

    #[error("amount is not a valid number")]
    InvalidNumber,

    #[error("amount cannot be negative")]
    Negative,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount has more than {max} decimal places")]
    TooManyDecimals { max: u32 },

    #[error("amount is too large")]
    AmountOverflow,

    #[error("name is {len} bytes, exceeds the {max}-byte slot")]
    NameTooLong { len: usize, max: usize },

    #[error("invalid name: {0}")]
    InvalidName(String),
}

impl From<AmountError> for ValidationError {
    fn from(e: AmountError) -> Self {
        match e {
            AmountError::Empty => Self::EmptyAmount,
            AmountError::Negative => Self::Negative,
            AmountError::InvalidNumber => Self::InvalidNumber,
            AmountError::TooManyDecimals { max } => Self::TooManyDecimals { max },
            AmountError::Overflow => Self::AmountOverflow,
        }
    }
}

impl From<NameError> for ValidationError {
    fn from(e: NameError) -> Self {
        match e {
            NameError::TooLong { len, max } => Self::NameTooLong { len, max },
            other => Self::InvalidName(other.to_string()),
        }
    }
}

/// Failures surfaced to callers of the write path.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("a {kind} transaction is already in flight")]
    ConcurrentSubmission { kind: TxKind },

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("submission failed: {reason}")]
    Submission { reason: String },

    #[error("confirmation of {kind} transaction {hash} is taking longer than expected")]
    ConfirmationTimeout { kind: TxKind, hash: TxHash },

    #[error("wallet is not connected")]
    NotConnected,

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),
}
