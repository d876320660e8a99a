//! Input validation for addresses, amounts and memos
//!
//! Every check here is pure: no network access, no prompting. Failures carry
//! a message that is shown to the user before the prompt is asked again.

use stellar_strkey::ed25519::PublicKey;
use thiserror::Error;

use crate::types::{Amount, AmountParseError, MemoInput, MemoKind};

/// Maximum size of a text memo in bytes (UTF-8 encoded)
pub const MAX_MEMO_TEXT_BYTES: usize = 28;

/// Length of a hash/return memo in hex characters
pub const MEMO_HASH_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a valid Stellar public key (expected a 56 character G... address)")]
    InvalidAddress(String),

    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("amount {amount} XLM is below the minimum starting balance of {minimum} XLM")]
    BelowMinimumBalance { amount: Amount, minimum: Amount },

    #[error("memo text is {len} bytes, the limit is {} bytes", MAX_MEMO_TEXT_BYTES)]
    MemoTextTooLong { len: usize },

    #[error("invalid memo id '{0}': expected an integer between 0 and 18446744073709551615")]
    InvalidMemoId(String),

    #[error("invalid memo hash: expected exactly {} hex characters ({reason})", MEMO_HASH_HEX_LEN)]
    InvalidMemoHash { reason: String },
}

/// True iff `input` decodes as a strkey ed25519 public key.
pub fn is_valid_address(input: &str) -> bool {
    PublicKey::from_string(input).is_ok()
}

/// Decode an account address, trimming surrounding whitespace.
pub fn parse_address(input: &str) -> Result<PublicKey, ValidationError> {
    let trimmed = input.trim();
    PublicKey::from_string(trimmed)
        .map_err(|_| ValidationError::InvalidAddress(trimmed.to_string()))
}

/// Parse a positive native amount.
pub fn parse_amount(input: &str) -> Result<Amount, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidAmount {
        input: input.trim().to_string(),
        reason: reason.to_string(),
    };

    let amount = input.trim().parse::<Amount>().map_err(|e| match e {
        AmountParseError::Malformed => invalid("must be a positive decimal number"),
        AmountParseError::Overflow => invalid("exceeds the maximum native amount"),
    })?;

    if !amount.is_positive() {
        return Err(invalid("must be greater than zero (smallest unit is 0.0000001)"));
    }
    Ok(amount)
}

/// Parse the starting balance of a create-account operation.
pub fn parse_starting_balance(input: &str, minimum: Amount) -> Result<Amount, ValidationError> {
    let amount = parse_amount(input)?;
    if amount < minimum {
        return Err(ValidationError::BelowMinimumBalance { amount, minimum });
    }
    Ok(amount)
}

/// Validate a memo value for the chosen memo type.
///
/// Text is taken verbatim (not trimmed); the other kinds ignore surrounding
/// whitespace.
pub fn parse_memo(kind: MemoKind, input: &str) -> Result<MemoInput, ValidationError> {
    match kind {
        MemoKind::None => Ok(MemoInput::None),
        MemoKind::Text => {
            let len = input.len();
            if len > MAX_MEMO_TEXT_BYTES {
                return Err(ValidationError::MemoTextTooLong { len });
            }
            Ok(MemoInput::Text(input.to_string()))
        }
        MemoKind::Id => input
            .trim()
            .parse::<u64>()
            .map(MemoInput::Id)
            .map_err(|_| ValidationError::InvalidMemoId(input.trim().to_string())),
        MemoKind::Hash => parse_memo_hash(input).map(MemoInput::Hash),
        MemoKind::Return => parse_memo_hash(input).map(MemoInput::Return),
    }
}

fn parse_memo_hash(input: &str) -> Result<[u8; 32], ValidationError> {
    let input = input.trim();
    if input.len() != MEMO_HASH_HEX_LEN {
        return Err(ValidationError::InvalidMemoHash {
            reason: format!("got {} characters", input.chars().count()),
        });
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(input, &mut hash).map_err(|e| ValidationError::InvalidMemoHash {
        reason: e.to_string(),
    })?;
    Ok(hash)
}
