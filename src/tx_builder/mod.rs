//! Transaction builder
//!
//! This module turns validated user input into an unsigned Stellar
//! transaction envelope:
//! - **errors**: error taxonomy for assembly failures
//! - **builder**: sequence lookup, operation choice and XDR assembly
//! - **envelope**: base64 XDR encoding/decoding and transaction hashing
//! - **output**: the built envelope plus a printable summary
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use stellar_tx::config::{HttpConfig, NetworkProfile};
//! # use stellar_tx::horizon::HorizonClient;
//! # use stellar_tx::structured_logging::SessionLogger;
//! # use stellar_tx::tx_builder::*;
//! # use stellar_tx::types::{Amount, MemoInput};
//! # async fn example() -> Result<(), TransactionBuilderError> {
//! let profile = NetworkProfile::testnet();
//! let horizon = Arc::new(HorizonClient::from_profile(&profile, &HttpConfig::default())?);
//! let builder = TxBuilder::new(horizon, profile, BuildSettings::default(), SessionLogger::default());
//!
//! let source = stellar_strkey::ed25519::PublicKey([1; 32]);
//! let destination = stellar_strkey::ed25519::PublicKey([2; 32]);
//! let operation = builder.choose_operation(&destination).await?;
//! let output = builder
//!     .build(&TransactionRequest {
//!         source,
//!         destination,
//!         operation,
//!         amount: Amount::from_stroops(10_000_000),
//!         memo: MemoInput::None,
//!     })
//!     .await?;
//! println!("{}", output.envelope_xdr);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod envelope;
pub mod errors;
pub mod output;

pub use builder::{assemble_transaction, BuildSettings, OperationKind, TransactionRequest, TxBuilder};
pub use errors::TransactionBuilderError;
pub use output::TxBuildOutput;
