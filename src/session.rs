//! Interactive session: network → action → build or broadcast
//!
//! The flow is linear. The only loops are per-prompt retries on invalid
//! input; any other failure ends the session with an error.

use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

use crate::broadcast::{self, BroadcastError, BroadcastReceipt, Broadcaster};
use crate::config::{Config, ConfigError, NetworkProfile};
use crate::horizon::{Horizon, HorizonClient, HorizonError};
use crate::prompt::{PromptError, Prompter};
use crate::structured_logging::SessionLogger;
use crate::tx_builder::{
    BuildSettings, OperationKind, TransactionBuilderError, TransactionRequest, TxBuildOutput, TxBuilder,
};
use crate::types::{Action, MemoInput, MemoKind, NetworkKind};
use crate::validation;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] TransactionBuilderError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Horizon(#[from] HorizonError),
}

/// Choices fixed before the session starts (flags, env, config)
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub network: Option<NetworkKind>,
    pub action: Option<Action>,
}

/// How a session ended without error
#[derive(Debug)]
pub enum SessionOutcome {
    Built(Box<TxBuildOutput>),
    Submitted(BroadcastReceipt),
    Cancelled,
}

pub struct Session<R, W> {
    prompter: Prompter<R, W>,
    config: Config,
    logger: SessionLogger,
    horizon_override: Option<Arc<dyn Horizon>>,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(config: Config, prompter: Prompter<R, W>, logger: SessionLogger) -> Self {
        Self {
            prompter,
            config,
            logger,
            horizon_override: None,
        }
    }

    /// Use `horizon` instead of connecting to the profile's URL
    pub fn with_horizon(mut self, horizon: Arc<dyn Horizon>) -> Self {
        self.horizon_override = Some(horizon);
        self
    }

    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }

    /// Run the whole flow. End of input and declined confirmations are
    /// reported as [`SessionOutcome::Cancelled`], not as errors.
    pub async fn run(&mut self, options: SessionOptions) -> Result<SessionOutcome, SessionError> {
        match self.run_inner(options).await {
            Err(SessionError::Prompt(PromptError::Cancelled)) => {
                debug!("Session cancelled");
                Ok(SessionOutcome::Cancelled)
            }
            other => other,
        }
    }

    async fn run_inner(&mut self, options: SessionOptions) -> Result<SessionOutcome, SessionError> {
        let network = match options.network.or(self.config.network) {
            Some(network) => network,
            None => {
                self.prompter
                    .choose(
                        "Select network:",
                        &[("Testnet", NetworkKind::Testnet), ("Mainnet", NetworkKind::Mainnet)],
                    )
                    .await?
            }
        };

        if network.is_mainnet() {
            let confirmed = self
                .prompter
                .confirm("You selected MAINNET. Transactions here move real funds. Continue? [y/N]: ")
                .await?;
            if !confirmed {
                return Err(PromptError::Cancelled.into());
            }
        }

        let profile = self.config.profile(network).clone();
        self.logger.log_network_selected(network.as_str(), &profile.horizon_url);
        let horizon = self.connect(&profile)?;

        let action = match options.action {
            Some(action) => action,
            None => {
                self.prompter
                    .choose(
                        "Select operation:",
                        &[
                            ("Build an unsigned transaction", Action::Build),
                            ("Broadcast a signed transaction", Action::Broadcast),
                        ],
                    )
                    .await?
            }
        };

        match action {
            Action::Build => self.run_build(horizon, profile).await,
            Action::Broadcast => self.run_broadcast(horizon, profile).await,
        }
    }

    fn connect(&self, profile: &NetworkProfile) -> Result<Arc<dyn Horizon>, SessionError> {
        if let Some(horizon) = &self.horizon_override {
            return Ok(Arc::clone(horizon));
        }
        Ok(Arc::new(HorizonClient::from_profile(profile, &self.config.http)?))
    }

    async fn run_build(&mut self, horizon: Arc<dyn Horizon>, profile: NetworkProfile) -> Result<SessionOutcome, SessionError> {
        let source = self
            .config
            .source_account
            .as_deref()
            .ok_or(TransactionBuilderError::MissingSourceAccount)
            .and_then(|s| validation::parse_address(s).map_err(TransactionBuilderError::from))?;

        let settings = BuildSettings::from_config(&self.config.builder)?;
        let builder = TxBuilder::new(horizon, profile, settings.clone(), self.logger.clone());

        let destination = self
            .prompter
            .ask("Destination address: ", validation::parse_address)
            .await?;

        let operation = builder.choose_operation(&destination).await?;
        if operation == OperationKind::CreateAccount {
            self.prompter
                .say(format!(
                    "Destination account is not active yet; a create-account operation will fund it (minimum {} XLM).",
                    settings.min_starting_balance
                ))
                .await?;
        }

        let minimum = settings.min_starting_balance;
        let amount = match operation {
            OperationKind::Payment => self.prompter.ask("Amount (XLM): ", validation::parse_amount).await?,
            OperationKind::CreateAccount => {
                self.prompter
                    .ask("Starting balance (XLM): ", |s| validation::parse_starting_balance(s, minimum))
                    .await?
            }
        };

        let memo = self.collect_memo().await?;

        let output = builder
            .build(&TransactionRequest {
                source,
                destination,
                operation,
                amount,
                memo,
            })
            .await?;

        self.prompter.say("").await?;
        self.prompter.say(&output).await?;
        self.prompter.say("").await?;
        self.prompter.say("Unsigned transaction envelope (XDR):").await?;
        self.prompter.say(&output.envelope_xdr).await?;
        Ok(SessionOutcome::Built(Box::new(output)))
    }

    async fn collect_memo(&mut self) -> Result<MemoInput, SessionError> {
        let options: Vec<(&str, MemoKind)> = MemoKind::ALL.iter().map(|k| (k.label(), *k)).collect();
        let kind = self.prompter.choose("Memo type:", &options).await?;
        let memo = match kind {
            MemoKind::None => MemoInput::None,
            MemoKind::Text => self.prompter.ask("Memo text: ", |s| validation::parse_memo(kind, s)).await?,
            MemoKind::Id => self.prompter.ask("Memo ID: ", |s| validation::parse_memo(kind, s)).await?,
            MemoKind::Hash | MemoKind::Return => {
                self.prompter
                    .ask("Memo hash (64 hex characters): ", |s| validation::parse_memo(kind, s))
                    .await?
            }
        };
        Ok(memo)
    }

    async fn run_broadcast(&mut self, horizon: Arc<dyn Horizon>, profile: NetworkProfile) -> Result<SessionOutcome, SessionError> {
        let broadcaster = Broadcaster::new(horizon, profile, self.logger.clone());

        let prepared = self
            .prompter
            .ask("Signed transaction envelope (base64 XDR): ", |s| {
                if s.trim().is_empty() {
                    return Err(BroadcastError::InvalidEnvelope("envelope is empty".to_string()));
                }
                broadcaster.prepare(s)
            })
            .await?;

        if !prepared.is_signed() {
            self.prompter
                .say("Warning: this envelope has no signatures; the network will reject it.")
                .await?;
        }
        self.prompter
            .say(format!("Submitting transaction {} ...", prepared.hash_hex()))
            .await?;

        match broadcaster.submit(&prepared).await {
            Ok(receipt) => {
                self.prompter.say(&receipt).await?;
                Ok(SessionOutcome::Submitted(receipt))
            }
            Err(BroadcastError::Rejected { title, codes }) => {
                self.prompter
                    .say(broadcast::describe_rejection(&title, &codes))
                    .await?;
                Err(BroadcastError::Rejected { title, codes }.into())
            }
            Err(other) => Err(other.into()),
        }
    }
}
