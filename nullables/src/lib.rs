//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! The external dependencies (account provider, ledger contract) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return scripted values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod ledger;
pub mod provider;

pub use ledger::{NullLedger, SubmittedOp};
pub use provider::NullProvider;
