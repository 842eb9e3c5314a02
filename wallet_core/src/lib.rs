//! Wallet-session and transaction-lifecycle controller.
//!
//! This crate is the core of the coffer client: it tracks the identity
//! connection (`connector`), speaks to the remote bank contract through a
//! gateway seam (`ledger`), keeps a locally cached read-model of the
//! contract's observable state (`read_model`), and serializes in-flight
//! write operations (`orchestrator`). Rendering surfaces only read the
//! cached snapshot and invoke controller operations; they hold no state
//! of their own.

pub mod connector;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod provider;
pub mod read_model;
pub mod validate;

pub use connector::{ConnectionState, WalletConnector, WalletSession};
pub use error::{ControllerError, LedgerError, ProviderError, ReadField, ValidationError};
pub use ledger::{LedgerClient, LedgerGateway};
pub use orchestrator::{
    PendingTransaction, TransactionOrchestrator, TxReceipt, WriteRequest,
};
pub use provider::{AccountProvider, ProviderEvent, RpcProvider};
pub use read_model::{ReadModelStore, Snapshot};
