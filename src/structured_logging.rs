//! Structured logging for a single tool invocation
//!
//! Every event emitted during one run carries the same `context_id`, so a
//! build or broadcast can be followed through JSON logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation ID shared by all events of one invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Structured logger for session events
#[derive(Debug, Clone, Default)]
pub struct SessionLogger {
    context_id: CorrelationId,
}

impl SessionLogger {
    pub fn new(context_id: CorrelationId) -> Self {
        Self { context_id }
    }

    pub fn context_id(&self) -> &CorrelationId {
        &self.context_id
    }

    pub fn log_network_selected(&self, network: &str, horizon_url: &str) {
        tracing::info!(
            context_id = %self.context_id,
            network = %network,
            horizon_url = %horizon_url,
            "Network selected"
        );
    }

    pub fn log_account_loaded(&self, account: &str, sequence: i64) {
        tracing::debug!(
            context_id = %self.context_id,
            account = %account,
            sequence = %sequence,
            "Source account loaded"
        );
    }

    pub fn log_operation_chosen(&self, destination: &str, operation: &str, destination_exists: Option<bool>) {
        tracing::info!(
            context_id = %self.context_id,
            destination = %destination,
            operation = %operation,
            destination_exists = ?destination_exists,
            "Operation chosen"
        );
    }

    pub fn log_build_success(&self, hash: &str, sequence: i64, fee: u32) {
        tracing::info!(
            context_id = %self.context_id,
            hash = %hash,
            sequence = %sequence,
            fee = %fee,
            "Transaction built"
        );
    }

    pub fn log_submit_attempt(&self, hash: &str, signatures: usize) {
        tracing::info!(
            context_id = %self.context_id,
            hash = %hash,
            signatures = %signatures,
            "Submitting transaction"
        );
    }

    pub fn log_submit_success(&self, hash: &str, ledger: u32) {
        tracing::info!(
            context_id = %self.context_id,
            hash = %hash,
            ledger = %ledger,
            "Transaction accepted"
        );
    }

    pub fn log_submit_rejected(&self, transaction_code: &str, operation_codes: &[String]) {
        tracing::warn!(
            context_id = %self.context_id,
            transaction_code = %transaction_code,
            operation_codes = ?operation_codes,
            "Transaction rejected"
        );
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            message = %message,
            "Warning"
        );
    }

    pub fn error(&self, message: &str) {
        tracing::error!(
            context_id = %self.context_id,
            message = %message,
            "Error"
        );
    }
}
