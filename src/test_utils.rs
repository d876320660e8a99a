//! Test Utilities Module
//!
//! In-memory Horizon used by unit tests and, with the `test_utils` feature,
//! by integration tests. Nothing here touches the network.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::horizon::{AccountRecord, Horizon, HorizonError, SubmitResponse};

#[derive(Debug, Default)]
struct MockState {
    accounts: HashMap<String, i64>,
    load_error: Option<HorizonError>,
    submit_result: Option<Result<SubmitResponse, HorizonError>>,
    load_calls: usize,
    submitted: Vec<String>,
}

/// Deterministic Horizon stand-in
///
/// Accounts not registered with [`MockHorizon::with_account`] are reported
/// as missing. Clones share state, so a test can keep a handle for
/// inspection after handing one to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockHorizon {
    state: Arc<Mutex<MockState>>,
}

impl MockHorizon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a funded account with its current sequence number
    pub fn with_account(self, account_id: &str, sequence: i64) -> Self {
        self.lock().accounts.insert(account_id.to_string(), sequence);
        self
    }

    /// Make every `load_account` call fail with `err`
    pub fn with_load_error(self, err: HorizonError) -> Self {
        self.lock().load_error = Some(err);
        self
    }

    /// Result returned by `submit_transaction`
    pub fn with_submit_result(self, result: Result<SubmitResponse, HorizonError>) -> Self {
        self.lock().submit_result = Some(result);
        self
    }

    pub fn load_calls(&self) -> usize {
        self.lock().load_calls
    }

    /// Envelopes passed to `submit_transaction`, in order
    pub fn submitted(&self) -> Vec<String> {
        self.lock().submitted.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Horizon for MockHorizon {
    async fn load_account(&self, account_id: &str) -> Result<AccountRecord, HorizonError> {
        let mut state = self.lock();
        state.load_calls += 1;
        if let Some(err) = &state.load_error {
            return Err(err.clone());
        }
        state
            .accounts
            .get(account_id)
            .map(|&sequence| AccountRecord {
                account_id: account_id.to_string(),
                sequence,
            })
            .ok_or_else(|| HorizonError::AccountNotFound {
                account: account_id.to_string(),
            })
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmitResponse, HorizonError> {
        let mut state = self.lock();
        state.submitted.push(envelope_xdr.to_string());
        state.submit_result.clone().unwrap_or_else(|| {
            Ok(SubmitResponse {
                hash: "00".repeat(32),
                ledger: 1,
                successful: Some(true),
            })
        })
    }
}
