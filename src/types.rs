//! Common types used throughout the application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stroops per lumen (native asset precision is 7 decimal places)
pub const STROOPS_PER_XLM: i64 = 10_000_000;

const AMOUNT_DECIMALS: usize = 7;

/// Stellar network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// SDF test network
    Testnet,
    /// Public production network
    Mainnet,
}

impl NetworkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKind::Testnet => "testnet",
            NetworkKind::Mainnet => "mainnet",
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, NetworkKind::Mainnet)
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network '{0}' (expected 'testnet' or 'mainnet')")]
pub struct ParseNetworkError(String);

impl FromStr for NetworkKind {
    type Err = ParseNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" | "test" => Ok(NetworkKind::Testnet),
            "mainnet" | "public" | "pubnet" => Ok(NetworkKind::Mainnet),
            other => Err(ParseNetworkError(other.to_string())),
        }
    }
}

/// What the user wants to do in this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Build an unsigned transaction envelope for off-line signing
    Build,
    /// Submit an already-signed envelope to Horizon
    Broadcast,
}

/// Native asset amount stored as a stroop count.
///
/// Parsing accepts plain decimals (`12`, `0.5`, `+3.25`) and rounds anything
/// past the seventh fractional digit half-up. Formatting always emits exactly
/// seven fractional digits, so `format(parse(format(x))) == format(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("not a decimal number")]
    Malformed,
    #[error("too large to represent in stroops")]
    Overflow,
}

impl Amount {
    pub const fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    pub const fn stroops(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = STROOPS_PER_XLM as u64;
        write!(f, "{}{}.{:07}", sign, abs / unit, abs % unit)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('+').unwrap_or(s);
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(AmountParseError::Malformed);
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(AmountParseError::Malformed);
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| AmountParseError::Overflow)?
        };

        let mut digits: Vec<i64> = frac.bytes().map(|b| i64::from(b - b'0')).collect();
        let round_up = digits.get(AMOUNT_DECIMALS).is_some_and(|&d| d >= 5);
        digits.resize(AMOUNT_DECIMALS, 0);
        let fraction = digits.iter().fold(0i64, |acc, d| acc * 10 + d);

        whole
            .checked_mul(STROOPS_PER_XLM)
            .and_then(|v| v.checked_add(fraction))
            .and_then(|v| v.checked_add(i64::from(round_up)))
            .map(Amount)
            .ok_or(AmountParseError::Overflow)
    }
}

/// Memo type offered by the memo menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoKind {
    None,
    Text,
    Id,
    Hash,
    Return,
}

impl MemoKind {
    pub const ALL: [MemoKind; 5] = [
        MemoKind::None,
        MemoKind::Text,
        MemoKind::Id,
        MemoKind::Hash,
        MemoKind::Return,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MemoKind::None => "No memo",
            MemoKind::Text => "Text (up to 28 bytes)",
            MemoKind::Id => "ID (unsigned 64-bit integer)",
            MemoKind::Hash => "Hash (64 hex characters)",
            MemoKind::Return => "Return hash (64 hex characters)",
        }
    }
}

/// A validated memo, ready to be converted to XDR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoInput {
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl MemoInput {
    pub fn kind(&self) -> MemoKind {
        match self {
            MemoInput::None => MemoKind::None,
            MemoInput::Text(_) => MemoKind::Text,
            MemoInput::Id(_) => MemoKind::Id,
            MemoInput::Hash(_) => MemoKind::Hash,
            MemoInput::Return(_) => MemoKind::Return,
        }
    }
}

impl fmt::Display for MemoInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoInput::None => f.write_str("none"),
            MemoInput::Text(text) => write!(f, "text {:?}", text),
            MemoInput::Id(id) => write!(f, "id {}", id),
            MemoInput::Hash(hash) => write!(f, "hash {}", hex::encode(hash)),
            MemoInput::Return(hash) => write!(f, "return {}", hex::encode(hash)),
        }
    }
}
