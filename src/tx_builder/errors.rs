//! Error types for transaction assembly
//!
//! Every failure between "inputs validated" and "envelope printed" ends up
//! here, so the caller sees one descriptive error per failed build.

use thiserror::Error;

use crate::horizon::HorizonError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum TransactionBuilderError {
    /// The configured source account has never been funded
    #[error(
        "Source account {account} does not exist on the network. \
         Fund it first (on testnet: https://friendbot.stellar.org/?addr={account})"
    )]
    SourceAccountNotFound { account: String },

    /// No source account configured
    #[error("No source account configured: set source_account in the config file, STELLAR_SOURCE_ACCOUNT or --source-account")]
    MissingSourceAccount,

    /// Input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Horizon request failed while building
    #[error("Failed to build transaction: {0}")]
    Horizon(#[from] HorizonError),

    /// XDR encoding or decoding failed
    #[error("XDR error: {0}")]
    Xdr(String),

    /// Configuration or policy error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransactionBuilderError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::SourceAccountNotFound { .. } => "source_account",
            Self::MissingSourceAccount => "config",
            Self::InvalidInput(_) => "validation",
            Self::Horizon(_) => "horizon",
            Self::Xdr(_) => "xdr",
            Self::Configuration(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    pub fn xdr(err: impl std::fmt::Display) -> Self {
        Self::Xdr(err.to_string())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

impl From<stellar_xdr::curr::Error> for TransactionBuilderError {
    fn from(err: stellar_xdr::curr::Error) -> Self {
        Self::xdr(err)
    }
}
