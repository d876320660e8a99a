//! stellar-tx library
//!
//! Components behind the `stellar-tx` binary, exposed for integration tests:
//! input validation, the Horizon client, transaction assembly, broadcasting
//! and the interactive session that drives them.

pub mod broadcast;
pub mod config;
pub mod horizon;
pub mod prompt;
pub mod session;
pub mod structured_logging;
pub mod test_utils;
pub mod tx_builder;
pub mod types;
pub mod validation;
