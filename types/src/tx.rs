//! Transaction kind and status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a balance-changing operation against the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    /// Attach value to the contract, crediting the caller's account.
    Deposit,
    /// Withdraw from the caller's account to a destination address.
    Withdraw,
    /// Set the bank's display name (owner-restricted remotely).
    SetName,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::SetName => "set_name",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The lifecycle status of a submitted transaction.
///
/// Transitions are one-directional: `Submitted` moves to exactly one of
/// the terminal states and never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    /// Sent to the network; inclusion not yet observed.
    Submitted,
    /// Included and finalized; its effect can be trusted.
    Confirmed,
    /// Rejected by the network or reverted by the contract.
    Reverted,
}

impl TxStatus {
    /// Whether this status ends the transaction's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Reverted)
    }
}
