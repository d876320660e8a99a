//! Broadcasting of signed envelopes
//!
//! A signed envelope is decoded locally first, so malformed input is caught
//! before anything is sent and the hash can be shown while submitting.

use std::fmt;
use std::sync::Arc;
use stellar_xdr::curr::TransactionEnvelope;
use thiserror::Error;

use crate::config::NetworkProfile;
use crate::horizon::{Horizon, HorizonError, ResultCodes};
use crate::structured_logging::SessionLogger;
use crate::tx_builder::envelope;
use crate::tx_builder::TransactionBuilderError;

#[derive(Debug, Error)]
pub enum BroadcastError {
    /// Input is not a decodable transaction envelope
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Horizon rejected the transaction with result codes
    #[error("Transaction rejected by the network ({codes})")]
    Rejected { title: String, codes: ResultCodes },

    /// Any other submission failure
    #[error("Submission failed: {0}")]
    Horizon(HorizonError),
}

impl From<HorizonError> for BroadcastError {
    fn from(err: HorizonError) -> Self {
        match err {
            HorizonError::SubmissionRejected { title, codes, .. } => Self::Rejected { title, codes },
            other => Self::Horizon(other),
        }
    }
}

impl From<TransactionBuilderError> for BroadcastError {
    fn from(err: TransactionBuilderError) -> Self {
        match err {
            TransactionBuilderError::Xdr(msg) => Self::InvalidEnvelope(msg),
            other => Self::InvalidEnvelope(other.to_string()),
        }
    }
}

/// A decoded envelope ready for submission
#[derive(Debug, Clone)]
pub struct PreparedEnvelope {
    /// Normalised base64 (whitespace removed)
    pub xdr: String,
    pub envelope: TransactionEnvelope,
    /// Hash under the broadcaster's network passphrase
    pub hash: [u8; 32],
    pub signatures: usize,
}

impl PreparedEnvelope {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn is_signed(&self) -> bool {
        self.signatures > 0
    }
}

/// Accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub hash: String,
    pub ledger: u32,
}

impl fmt::Display for BroadcastReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction submitted successfully")?;
        writeln!(f, "  Hash:   {}", self.hash)?;
        write!(f, "  Ledger: {}", self.ledger)
    }
}

/// Render rejection codes the way they are printed to the user
pub fn describe_rejection(title: &str, codes: &ResultCodes) -> String {
    let mut text = format!("Transaction rejected: {}\n  Result codes:\n    transaction: {}", title, codes.transaction);
    for (index, code) in codes.operations.iter().enumerate() {
        text.push_str(&format!("\n    operation[{}]: {}", index, code));
    }
    text
}

pub struct Broadcaster {
    horizon: Arc<dyn Horizon>,
    network: NetworkProfile,
    logger: SessionLogger,
}

impl Broadcaster {
    pub fn new(horizon: Arc<dyn Horizon>, network: NetworkProfile, logger: SessionLogger) -> Self {
        Self {
            horizon,
            network,
            logger,
        }
    }

    /// Decode and hash an envelope against this network.
    pub fn prepare(&self, input: &str) -> Result<PreparedEnvelope, BroadcastError> {
        let envelope = envelope::decode_envelope(input)?;
        let hash = envelope::envelope_hash(&envelope, &self.network.network_id())?;
        let xdr = envelope::encode_envelope(&envelope)?;
        Ok(PreparedEnvelope {
            signatures: envelope::signature_count(&envelope),
            xdr,
            envelope,
            hash,
        })
    }

    /// Submit a prepared envelope; rejections come back as [`BroadcastError::Rejected`].
    pub async fn submit(&self, prepared: &PreparedEnvelope) -> Result<BroadcastReceipt, BroadcastError> {
        if !prepared.is_signed() {
            self.logger.warn("envelope carries no signatures; Horizon will reject it");
        }
        self.logger
            .log_submit_attempt(&prepared.hash_hex(), prepared.signatures);

        match self.horizon.submit_transaction(&prepared.xdr).await {
            Ok(resp) => {
                self.logger.log_submit_success(&resp.hash, resp.ledger);
                Ok(BroadcastReceipt {
                    hash: resp.hash,
                    ledger: resp.ledger,
                })
            }
            Err(err) => {
                let err = BroadcastError::from(err);
                match &err {
                    BroadcastError::Rejected { codes, .. } => {
                        self.logger
                            .log_submit_rejected(&codes.transaction, &codes.operations)
                    }
                    other => self.logger.error(&other.to_string()),
                }
                Err(err)
            }
        }
    }
}
