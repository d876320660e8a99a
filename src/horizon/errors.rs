use thiserror::Error;

use super::models::ResultCodes;

/// Errors returned by the Horizon client
#[derive(Debug, Clone, Error)]
pub enum HorizonError {
    /// Transport-level errors (DNS, connection refused, TLS)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Request exceeded the configured timeout
    #[error("Timeout after {timeout_secs}s (endpoint: {endpoint})")]
    Timeout { endpoint: String, timeout_secs: u64 },

    /// Account does not exist on the network (HTTP 404)
    #[error("Account not found: {account}")]
    AccountNotFound { account: String },

    /// Any non-success status without structured result codes
    #[error("Horizon returned HTTP {status}: {message} (endpoint: {endpoint})")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Body could not be decoded into the expected shape
    #[error("Invalid response from Horizon: {message} (endpoint: {endpoint})")]
    Decode { endpoint: String, message: String },

    /// Transaction rejected with structured result codes
    #[error("Transaction rejected: {title} ({codes})")]
    SubmissionRejected {
        title: String,
        codes: ResultCodes,
        result_xdr: Option<String>,
    },
}

impl HorizonError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::AccountNotFound { .. } => "not_found",
            Self::UnexpectedStatus { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::SubmissionRejected { .. } => "rejected",
        }
    }

    /// True for failures of the request itself rather than a Horizon answer
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Timeout { endpoint, .. }
            | Self::UnexpectedStatus { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
            Self::AccountNotFound { .. } | Self::SubmissionRejected { .. } => None,
        }
    }

    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error, endpoint: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
                timeout_secs,
            }
        } else if err.is_decode() {
            Self::Decode {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }
}
