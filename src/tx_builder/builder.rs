//! Core transaction assembly
//!
//! `TxBuilder` reads the source account's sequence from Horizon, decides
//! between payment and create-account, and hands a single-operation
//! transaction to the envelope encoder. `assemble_transaction` is the pure
//! part and is kept free of I/O.

use std::fmt;
use std::sync::Arc;
use stellar_strkey::ed25519::PublicKey;
use stellar_xdr::curr::{
    AccountId, Asset, CreateAccountOp, Memo, MuxedAccount, Operation, OperationBody, PaymentOp,
    Preconditions, PublicKey as XdrPublicKey, SequenceNumber, StringM, TimeBounds, TimePoint,
    Transaction, TransactionExt, Uint256,
};

use super::envelope;
use super::errors::TransactionBuilderError;
use super::output::TxBuildOutput;
use crate::config::{BuilderConfig, NetworkProfile};
use crate::horizon::{Horizon, HorizonError};
use crate::structured_logging::SessionLogger;
use crate::types::{Amount, MemoInput};
use crate::validation::{self, ValidationError};

/// Assembly policy derived from `[builder]` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Fee per operation in stroops
    pub base_fee: u32,
    /// 0 = no expiry
    pub timeout_secs: u64,
    pub auto_create_account: bool,
    pub min_starting_balance: Amount,
}

impl BuildSettings {
    pub fn from_config(config: &BuilderConfig) -> Result<Self, TransactionBuilderError> {
        if config.base_fee == 0 {
            return Err(TransactionBuilderError::Configuration(
                "base fee must be greater than zero".to_string(),
            ));
        }
        let min_starting_balance = validation::parse_amount(&config.min_starting_balance)
            .map_err(|e| TransactionBuilderError::Configuration(format!("min_starting_balance: {}", e)))?;

        Ok(Self {
            base_fee: config.base_fee,
            timeout_secs: config.timeout_secs,
            auto_create_account: config.auto_create_account,
            min_starting_balance,
        })
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            base_fee: 100,
            timeout_secs: 30,
            auto_create_account: true,
            min_starting_balance: Amount::from_stroops(10_000_000),
        }
    }
}

/// The single operation a built transaction carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Native payment to an existing account
    Payment,
    /// Fund a new account with a starting balance
    CreateAccount,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Payment => "payment",
            OperationKind::CreateAccount => "create_account",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated user input for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub source: PublicKey,
    pub destination: PublicKey,
    pub operation: OperationKind,
    pub amount: Amount,
    pub memo: MemoInput,
}

/// Transaction builder bound to one network
pub struct TxBuilder {
    horizon: Arc<dyn Horizon>,
    network: NetworkProfile,
    settings: BuildSettings,
    logger: SessionLogger,
}

impl TxBuilder {
    pub fn new(
        horizon: Arc<dyn Horizon>,
        network: NetworkProfile,
        settings: BuildSettings,
        logger: SessionLogger,
    ) -> Self {
        Self {
            horizon,
            network,
            settings,
            logger,
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Payment unless auto-creation is on and the destination is unfunded.
    pub async fn choose_operation(&self, destination: &PublicKey) -> Result<OperationKind, TransactionBuilderError> {
        let address = destination.to_string();
        if !self.settings.auto_create_account {
            self.logger
                .log_operation_chosen(&address, OperationKind::Payment.as_str(), None);
            return Ok(OperationKind::Payment);
        }

        let exists = self.horizon.account_exists(&address).await?;
        let kind = if exists {
            OperationKind::Payment
        } else {
            OperationKind::CreateAccount
        };
        self.logger.log_operation_chosen(&address, kind.as_str(), Some(exists));
        Ok(kind)
    }

    /// Load the source sequence and assemble the unsigned envelope.
    pub async fn build(&self, request: &TransactionRequest) -> Result<TxBuildOutput, TransactionBuilderError> {
        let source = request.source.to_string();
        let account = self.horizon.load_account(&source).await.map_err(|e| match e {
            HorizonError::AccountNotFound { account } => {
                TransactionBuilderError::SourceAccountNotFound { account }
            }
            other => TransactionBuilderError::Horizon(other),
        })?;
        self.logger.log_account_loaded(&account.account_id, account.sequence);

        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        let tx = assemble_transaction(request, account.sequence, &self.settings, now)?;
        let envelope_xdr = envelope::encode_unsigned(&tx)?;
        let hash = envelope::transaction_hash(&tx, &self.network.network_id())?;

        let output = TxBuildOutput::new(request.clone(), tx, envelope_xdr, hash);
        self.logger
            .log_build_success(&output.hash_hex(), output.sequence(), output.fee());
        Ok(output)
    }
}

/// Build the XDR transaction for `request`, sequenced after `current_sequence`.
pub fn assemble_transaction(
    request: &TransactionRequest,
    current_sequence: i64,
    settings: &BuildSettings,
    now_unix: u64,
) -> Result<Transaction, TransactionBuilderError> {
    if !request.amount.is_positive() {
        return Err(ValidationError::InvalidAmount {
            input: request.amount.to_string(),
            reason: "must be greater than zero".to_string(),
        }
        .into());
    }
    if request.operation == OperationKind::CreateAccount && request.amount < settings.min_starting_balance {
        return Err(ValidationError::BelowMinimumBalance {
            amount: request.amount,
            minimum: settings.min_starting_balance,
        }
        .into());
    }

    let sequence = current_sequence
        .checked_add(1)
        .ok_or_else(|| TransactionBuilderError::internal("source account sequence number overflow"))?;

    let body = match request.operation {
        OperationKind::Payment => OperationBody::Payment(PaymentOp {
            destination: MuxedAccount::Ed25519(Uint256(request.destination.0)),
            asset: Asset::Native,
            amount: request.amount.stroops(),
        }),
        OperationKind::CreateAccount => OperationBody::CreateAccount(CreateAccountOp {
            destination: AccountId(XdrPublicKey::PublicKeyTypeEd25519(Uint256(request.destination.0))),
            starting_balance: request.amount.stroops(),
        }),
    };
    let operations = vec![Operation {
        source_account: None,
        body,
    }];
    let fee = settings
        .base_fee
        .checked_mul(operations.len() as u32)
        .ok_or_else(|| TransactionBuilderError::Configuration("fee overflow".to_string()))?;

    Ok(Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(request.source.0)),
        fee,
        seq_num: SequenceNumber(sequence),
        cond: time_bounds(settings.timeout_secs, now_unix),
        memo: memo_to_xdr(&request.memo)?,
        operations: operations.try_into()?,
        ext: TransactionExt::V0,
    })
}

fn time_bounds(timeout_secs: u64, now_unix: u64) -> Preconditions {
    let max_time = if timeout_secs == 0 {
        0
    } else {
        now_unix.saturating_add(timeout_secs)
    };
    Preconditions::Time(TimeBounds {
        min_time: TimePoint(0),
        max_time: TimePoint(max_time),
    })
}

fn memo_to_xdr(memo: &MemoInput) -> Result<Memo, TransactionBuilderError> {
    Ok(match memo {
        MemoInput::None => Memo::None,
        MemoInput::Text(text) => {
            let text: StringM<28> = text.as_str().try_into().map_err(|_| {
                ValidationError::MemoTextTooLong { len: text.len() }
            })?;
            Memo::Text(text)
        }
        MemoInput::Id(id) => Memo::Id(*id),
        MemoInput::Hash(hash) => Memo::Hash(stellar_xdr::curr::Hash(*hash)),
        MemoInput::Return(hash) => Memo::Return(stellar_xdr::curr::Hash(*hash)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockHorizon;

    fn key(seed: u8) -> PublicKey {
        PublicKey([seed; 32])
    }

    fn request(operation: OperationKind, amount: i64, memo: MemoInput) -> TransactionRequest {
        TransactionRequest {
            source: key(1),
            destination: key(2),
            operation,
            amount: Amount::from_stroops(amount),
            memo,
        }
    }

    fn builder(horizon: MockHorizon, settings: BuildSettings) -> TxBuilder {
        TxBuilder::new(
            Arc::new(horizon),
            NetworkProfile::testnet(),
            settings,
            SessionLogger::default(),
        )
    }

    #[test]
    fn test_sequence_is_current_plus_one() {
        let tx = assemble_transaction(
            &request(OperationKind::Payment, 5, MemoInput::None),
            41,
            &BuildSettings::default(),
            1_700_000_000,
        )
        .unwrap();
        assert_eq!(tx.seq_num, SequenceNumber(42));
        assert_eq!(tx.fee, 100);
        assert_eq!(tx.operations.len(), 1);
    }

    #[test]
    fn test_payment_operation_body() {
        let tx = assemble_transaction(
            &request(OperationKind::Payment, 12_345, MemoInput::Id(7)),
            0,
            &BuildSettings::default(),
            0,
        )
        .unwrap();
        match &tx.operations[0].body {
            OperationBody::Payment(op) => {
                assert_eq!(op.destination, MuxedAccount::Ed25519(Uint256([2; 32])));
                assert_eq!(op.asset, Asset::Native);
                assert_eq!(op.amount, 12_345);
            }
            other => panic!("Expected payment, got {:?}", other),
        }
        assert_eq!(tx.memo, Memo::Id(7));
        assert_eq!(tx.source_account, MuxedAccount::Ed25519(Uint256([1; 32])));
    }

    #[test]
    fn test_create_account_operation_body() {
        let tx = assemble_transaction(
            &request(OperationKind::CreateAccount, 20_000_000, MemoInput::Hash([3; 32])),
            0,
            &BuildSettings::default(),
            0,
        )
        .unwrap();
        match &tx.operations[0].body {
            OperationBody::CreateAccount(op) => {
                assert_eq!(op.starting_balance, 20_000_000);
                assert_eq!(
                    op.destination,
                    AccountId(XdrPublicKey::PublicKeyTypeEd25519(Uint256([2; 32])))
                );
            }
            other => panic!("Expected create account, got {:?}", other),
        }
        assert_eq!(tx.memo, Memo::Hash(stellar_xdr::curr::Hash([3; 32])));
    }

    #[test]
    fn test_create_account_below_minimum_rejected() {
        let err = assemble_transaction(
            &request(OperationKind::CreateAccount, 9_999_999, MemoInput::None),
            0,
            &BuildSettings::default(),
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransactionBuilderError::InvalidInput(ValidationError::BelowMinimumBalance { .. })
        ));
    }

    #[test]
    fn test_time_bounds() {
        let settings = BuildSettings::default();
        let tx = assemble_transaction(&request(OperationKind::Payment, 1, MemoInput::None), 0, &settings, 1_000).unwrap();
        assert_eq!(
            tx.cond,
            Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(1_030),
            })
        );

        let settings = BuildSettings {
            timeout_secs: 0,
            ..BuildSettings::default()
        };
        let tx = assemble_transaction(&request(OperationKind::Payment, 1, MemoInput::None), 0, &settings, 1_000).unwrap();
        assert_eq!(
            tx.cond,
            Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(0),
            })
        );
    }

    #[test]
    fn test_memo_conversion() {
        assert_eq!(memo_to_xdr(&MemoInput::None).unwrap(), Memo::None);
        let text = memo_to_xdr(&MemoInput::Text("a".repeat(28))).unwrap();
        assert!(matches!(text, Memo::Text(ref s) if s.len() == 28));
        assert!(memo_to_xdr(&MemoInput::Text("a".repeat(29))).is_err());
        assert_eq!(
            memo_to_xdr(&MemoInput::Return([4; 32])).unwrap(),
            Memo::Return(stellar_xdr::curr::Hash([4; 32]))
        );
    }

    #[test]
    fn test_sequence_overflow() {
        let err = assemble_transaction(
            &request(OperationKind::Payment, 1, MemoInput::None),
            i64::MAX,
            &BuildSettings::default(),
            0,
        )
        .unwrap_err();
        assert_eq!(err.category(), "internal");
    }

    #[test]
    fn test_settings_from_config() {
        let settings = BuildSettings::from_config(&BuilderConfig::default()).unwrap();
        assert_eq!(settings, BuildSettings::default());

        let bad = BuilderConfig {
            min_starting_balance: "-1".to_string(),
            ..BuilderConfig::default()
        };
        assert!(BuildSettings::from_config(&bad).is_err());
    }

    #[tokio::test]
    async fn test_build_uses_loaded_sequence() {
        let horizon = MockHorizon::new().with_account(&key(1).to_string(), 100);
        let output = builder(horizon, BuildSettings::default())
            .build(&request(OperationKind::Payment, 10_000_000, MemoInput::None))
            .await
            .unwrap();

        assert_eq!(output.sequence(), 101);
        let decoded = envelope::decode_envelope(&output.envelope_xdr).unwrap();
        assert_eq!(
            envelope::envelope_hash(&decoded, &NetworkProfile::testnet().network_id()).unwrap(),
            output.hash
        );
    }

    #[tokio::test]
    async fn test_build_missing_source_account() {
        let err = builder(MockHorizon::new(), BuildSettings::default())
            .build(&request(OperationKind::Payment, 1, MemoInput::None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionBuilderError::SourceAccountNotFound { account } if account == key(1).to_string()
        ));
    }

    #[tokio::test]
    async fn test_build_wraps_network_errors() {
        let horizon = MockHorizon::new().with_load_error(HorizonError::Transport {
            endpoint: "http://horizon".into(),
            message: "connection reset".into(),
        });
        let err = builder(horizon, BuildSettings::default())
            .build(&request(OperationKind::Payment, 1, MemoInput::None))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionBuilderError::Horizon(HorizonError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_choose_operation_switches_for_missing_destination() {
        let funded = MockHorizon::new().with_account(&key(2).to_string(), 1);
        assert_eq!(
            builder(funded, BuildSettings::default())
                .choose_operation(&key(2))
                .await
                .unwrap(),
            OperationKind::Payment
        );

        assert_eq!(
            builder(MockHorizon::new(), BuildSettings::default())
                .choose_operation(&key(2))
                .await
                .unwrap(),
            OperationKind::CreateAccount
        );
    }

    #[tokio::test]
    async fn test_choose_operation_fixed_payment_skips_lookup() {
        let horizon = MockHorizon::new();
        let settings = BuildSettings {
            auto_create_account: false,
            ..BuildSettings::default()
        };
        let kind = builder(horizon.clone(), settings)
            .choose_operation(&key(2))
            .await
            .unwrap();
        assert_eq!(kind, OperationKind::Payment);
        assert_eq!(horizon.load_calls(), 0);
    }
}
