//! Transaction build output
//!
//! Holds the unsigned envelope together with the request it was built from,
//! so the session can show a summary before printing the XDR.

use std::fmt;
use stellar_xdr::curr::{Preconditions, Transaction};

use super::builder::TransactionRequest;
use crate::types::MemoInput;

#[derive(Debug, Clone)]
pub struct TxBuildOutput {
    /// Validated input the transaction was assembled from
    pub request: TransactionRequest,

    /// The assembled XDR transaction
    pub transaction: Transaction,

    /// Base64 `TransactionEnvelope` with no signatures
    pub envelope_xdr: String,

    /// Transaction hash under the build network's passphrase
    pub hash: [u8; 32],
}

impl TxBuildOutput {
    pub fn new(request: TransactionRequest, transaction: Transaction, envelope_xdr: String, hash: [u8; 32]) -> Self {
        Self {
            request,
            transaction,
            envelope_xdr,
            hash,
        }
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn sequence(&self) -> i64 {
        self.transaction.seq_num.0
    }

    pub fn fee(&self) -> u32 {
        self.transaction.fee
    }

    /// Unix time after which the transaction is invalid, if any
    pub fn expires_at(&self) -> Option<u64> {
        match &self.transaction.cond {
            Preconditions::Time(bounds) if bounds.max_time.0 != 0 => Some(bounds.max_time.0),
            _ => None,
        }
    }
}

impl fmt::Display for TxBuildOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction summary")?;
        writeln!(f, "  Source:      {}", self.request.source.to_string())?;
        writeln!(f, "  Sequence:    {}", self.sequence())?;
        writeln!(f, "  Operation:   {}", self.request.operation)?;
        writeln!(f, "  Destination: {}", self.request.destination.to_string())?;
        writeln!(f, "  Amount:      {} XLM", self.request.amount)?;
        if self.request.memo != MemoInput::None {
            writeln!(f, "  Memo:        {}", self.request.memo)?;
        }
        writeln!(f, "  Fee:         {} stroops", self.fee())?;
        match self.expires_at() {
            Some(ts) => {
                let when = chrono::DateTime::from_timestamp(ts as i64, 0)
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| ts.to_string());
                writeln!(f, "  Valid until: {}", when)?;
            }
            None => writeln!(f, "  Valid until: no expiry")?,
        }
        write!(f, "  Hash:        {}", self.hash_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx_builder::builder::{assemble_transaction, BuildSettings, OperationKind};
    use crate::types::Amount;
    use stellar_strkey::ed25519::PublicKey;

    fn output(timeout_secs: u64, memo: MemoInput) -> TxBuildOutput {
        let request = TransactionRequest {
            source: PublicKey([1; 32]),
            destination: PublicKey([2; 32]),
            operation: OperationKind::Payment,
            amount: Amount::from_stroops(15_000_000),
            memo,
        };
        let settings = BuildSettings {
            timeout_secs,
            ..BuildSettings::default()
        };
        let tx = assemble_transaction(&request, 9, &settings, 1_700_000_000).unwrap();
        TxBuildOutput::new(request, tx, "AAAA".to_string(), [0xcd; 32])
    }

    #[test]
    fn test_accessors() {
        let out = output(30, MemoInput::None);
        assert_eq!(out.sequence(), 10);
        assert_eq!(out.fee(), 100);
        assert_eq!(out.expires_at(), Some(1_700_000_030));
        assert_eq!(out.hash_hex(), "cd".repeat(32));
        assert_eq!(output(0, MemoInput::None).expires_at(), None);
    }

    #[test]
    fn test_summary_rendering() {
        let text = output(0, MemoInput::Text("invoice 12".into())).to_string();
        assert!(text.contains("Operation:   payment"));
        assert!(text.contains("Amount:      1.5000000 XLM"));
        assert!(text.contains("Memo:        text \"invoice 12\""));
        assert!(text.contains("Valid until: no expiry"));
        assert!(text.contains(&PublicKey([2; 32]).to_string()));

        let text = output(30, MemoInput::None).to_string();
        assert!(!text.contains("Memo:"));
        assert!(text.contains("Valid until: 2023-11-14T22:13:50+00:00"));
    }
}
