//! Horizon response payloads

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw `GET /accounts/{id}` body; Horizon encodes the sequence as a string.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountResponse {
    pub account_id: String,
    pub sequence: String,
}

/// The part of an account the builder needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account_id: String,
    /// Current sequence number; the next transaction uses `sequence + 1`
    pub sequence: i64,
}

/// Successful `POST /transactions` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
    pub ledger: u32,
    #[serde(default)]
    pub successful: Option<bool>,
}

/// Horizon problem document (RFC 7807 style error body)
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Problem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub extras: Option<ProblemExtras>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProblemExtras {
    #[serde(default)]
    pub result_codes: Option<ResultCodes>,
    #[serde(default)]
    pub result_xdr: Option<String>,
}

/// Structured result codes of a rejected transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    /// Transaction-level code, e.g. `tx_failed` or `tx_bad_seq`
    pub transaction: String,
    /// One code per operation, e.g. `op_underfunded`
    #[serde(default)]
    pub operations: Vec<String>,
}

impl fmt::Display for ResultCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transaction: {}", self.transaction)?;
        if !self.operations.is_empty() {
            write!(f, ", operations: [{}]", self.operations.iter().join(", "))?;
        }
        Ok(())
    }
}

impl Problem {
    /// Human readable summary: detail, then title, then the raw body.
    pub fn message(&self, raw_body: &str) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| raw_body.trim().to_string())
    }
}
