//! Shared utilities for the coffer client.

pub mod logging;

pub use logging::{init_logging, LogFormat};
