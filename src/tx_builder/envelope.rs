//! Envelope encoding, decoding and hashing
//!
//! Envelopes travel as base64 of the standard XDR `TransactionEnvelope`.
//! The transaction hash is SHA-256 over the XDR signature payload
//! (network id followed by the tagged transaction), which is what signers
//! sign and what Horizon reports back.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    Hash, Limits, MuxedAccount, Preconditions, ReadXdr, Transaction, TransactionEnvelope,
    TransactionExt, TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    TransactionV0, TransactionV1Envelope, VecM, WriteXdr,
};

use super::errors::TransactionBuilderError;

/// Wrap an unsigned transaction in a V1 envelope and base64 encode it.
pub fn encode_unsigned(tx: &Transaction) -> Result<String, TransactionBuilderError> {
    let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
        tx: tx.clone(),
        signatures: VecM::default(),
    });
    encode_envelope(&envelope)
}

pub fn encode_envelope(envelope: &TransactionEnvelope) -> Result<String, TransactionBuilderError> {
    let bytes = envelope.to_xdr(Limits::none())?;
    Ok(BASE64_STANDARD.encode(bytes))
}

/// Decode a base64 envelope; whitespace anywhere in the input is ignored.
pub fn decode_envelope(input: &str) -> Result<TransactionEnvelope, TransactionBuilderError> {
    let compact: String = input.split_whitespace().collect();
    if compact.is_empty() {
        return Err(TransactionBuilderError::xdr("envelope is empty"));
    }
    let bytes = BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| TransactionBuilderError::xdr(format!("envelope is not valid base64: {}", e)))?;
    TransactionEnvelope::from_xdr(bytes, Limits::none()).map_err(|e| {
        TransactionBuilderError::xdr(format!("not a valid transaction envelope: {}", e))
    })
}

/// Hash of a V1 transaction under the given network id.
pub fn transaction_hash(tx: &Transaction, network_id: &[u8; 32]) -> Result<[u8; 32], TransactionBuilderError> {
    payload_hash(
        network_id,
        TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    )
}

/// Hash of whatever transaction the envelope carries.
pub fn envelope_hash(
    envelope: &TransactionEnvelope,
    network_id: &[u8; 32],
) -> Result<[u8; 32], TransactionBuilderError> {
    let tagged = match envelope {
        TransactionEnvelope::TxV0(env) => {
            TransactionSignaturePayloadTaggedTransaction::Tx(v0_to_v1(&env.tx))
        }
        TransactionEnvelope::Tx(env) => TransactionSignaturePayloadTaggedTransaction::Tx(env.tx.clone()),
        TransactionEnvelope::TxFeeBump(env) => {
            TransactionSignaturePayloadTaggedTransaction::TxFeeBump(env.tx.clone())
        }
    };
    payload_hash(network_id, tagged)
}

/// Number of decorated signatures attached to the envelope.
pub fn signature_count(envelope: &TransactionEnvelope) -> usize {
    match envelope {
        TransactionEnvelope::TxV0(env) => env.signatures.len(),
        TransactionEnvelope::Tx(env) => env.signatures.len(),
        TransactionEnvelope::TxFeeBump(env) => env.signatures.len(),
    }
}

fn payload_hash(
    network_id: &[u8; 32],
    tagged_transaction: TransactionSignaturePayloadTaggedTransaction,
) -> Result<[u8; 32], TransactionBuilderError> {
    let payload = TransactionSignaturePayload {
        network_id: Hash(*network_id),
        tagged_transaction,
    };
    let bytes = payload.to_xdr(Limits::none())?;
    Ok(Sha256::digest(bytes).into())
}

// V0 envelopes are hashed as their V1 equivalent.
fn v0_to_v1(tx: &TransactionV0) -> Transaction {
    Transaction {
        source_account: MuxedAccount::Ed25519(tx.source_account_ed25519.clone()),
        fee: tx.fee,
        seq_num: tx.seq_num.clone(),
        cond: match &tx.time_bounds {
            Some(bounds) => Preconditions::Time(bounds.clone()),
            None => Preconditions::None,
        },
        memo: tx.memo.clone(),
        operations: tx.operations.clone(),
        ext: TransactionExt::V0,
    }
}
