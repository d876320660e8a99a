//! stellar-tx - interactive Stellar transaction builder and broadcaster
//!
//! Builds unsigned payment / create-account envelopes for off-line signing
//! and submits signed envelopes to Horizon. Prompts and results go to
//! stdout; logs go to stderr.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use stellar_tx::config::Config;
use stellar_tx::prompt::Prompter;
use stellar_tx::session::{Session, SessionOptions, SessionOutcome};
use stellar_tx::structured_logging::{CorrelationId, SessionLogger};
use stellar_tx::types::{Action, NetworkKind};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "stellar-tx.toml")]
    config: PathBuf,

    /// Network to use (skips the network menu)
    #[arg(short, long, env = "STELLAR_NETWORK")]
    network: Option<NetworkKind>,

    /// Account that pays for built transactions
    #[arg(short, long, env = "STELLAR_SOURCE_ACCOUNT")]
    source_account: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Build an unsigned transaction envelope
    Build,
    /// Submit a signed transaction envelope
    Broadcast,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Build => Action::Build,
            Command::Broadcast => Action::Broadcast,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // .env must be visible to clap's `env` fallbacks
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.log_json) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    let code = tokio::select! {
        result = run(args) => match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            info!("Interrupted, nothing was submitted after this point");
            0
        }
    };

    // stdin is read on a blocking thread that would otherwise keep the
    // runtime alive until the next newline
    std::process::exit(code);
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = if verbose { "stellar_tx=debug,info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}

/// Load configuration and apply command line overrides
fn load_config(path: &Path, args: &Args) -> Result<Config> {
    let mut config =
        Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(source) = &args.source_account {
        config.source_account = Some(source.trim().to_string());
    }
    if let Some(network) = args.network {
        config.network = Some(network);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args.config, &args)?;

    let logger = SessionLogger::new(CorrelationId::new());
    debug!(context_id = %logger.context_id(), "Starting session");

    let prompter = Prompter::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let mut session = Session::new(config, prompter, logger);
    let options = SessionOptions {
        network: args.network,
        action: args.command.map(Action::from),
    };

    match session.run(options).await? {
        SessionOutcome::Built(output) => info!(hash = %output.hash_hex(), "Unsigned envelope printed"),
        SessionOutcome::Submitted(receipt) => info!(hash = %receipt.hash, ledger = receipt.ledger, "Done"),
        SessionOutcome::Cancelled => info!("Cancelled"),
    }
    Ok(())
}
