//! Configuration module for stellar-tx
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables (a `.env` file is honoured through `dotenvy`),
//! and finally command line flags applied by the binary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{Amount, NetworkKind};
use crate::validation;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
pub const MAINNET_HORIZON_URL: &str = "https://horizon.stellar.org";

/// Environment variable overriding the testnet Horizon URL
pub const ENV_TESTNET_HORIZON_URL: &str = "STELLAR_TESTNET_HORIZON_URL";
/// Environment variable overriding the mainnet Horizon URL
pub const ENV_MAINNET_HORIZON_URL: &str = "STELLAR_MAINNET_HORIZON_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Account that pays for and sequences built transactions
    #[serde(default)]
    pub source_account: Option<String>,

    /// Fixed network; when absent the user is asked
    #[serde(default)]
    pub network: Option<NetworkKind>,

    /// Transaction assembly policy
    #[serde(default)]
    pub builder: BuilderConfig,

    /// Horizon endpoints and passphrases
    #[serde(default)]
    pub networks: NetworksConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Fee per operation in stroops
    #[serde(default = "default_base_fee")]
    pub base_fee: u32,

    /// Validity window in seconds; 0 means the transaction never expires
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Switch to a create-account operation when the destination does not exist
    #[serde(default = "default_true")]
    pub auto_create_account: bool,

    /// Minimum starting balance for create-account, in XLM
    #[serde(default = "default_min_starting_balance")]
    pub min_starting_balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworksConfig {
    #[serde(default = "NetworkProfile::testnet")]
    pub testnet: NetworkProfile,

    #[serde(default = "NetworkProfile::mainnet")]
    pub mainnet: NetworkProfile,
}

/// Everything needed to talk to one Stellar network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Horizon base URL
    pub horizon_url: String,

    /// Network passphrase
    pub passphrase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_base_fee() -> u32 { 100 }
fn default_timeout_secs() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_min_starting_balance() -> String { "1".to_string() }
fn default_request_timeout() -> u64 { 30 }

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            base_fee: default_base_fee(),
            timeout_secs: default_timeout_secs(),
            auto_create_account: default_true(),
            min_starting_balance: default_min_starting_balance(),
        }
    }
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            testnet: NetworkProfile::testnet(),
            mainnet: NetworkProfile::mainnet(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_request_timeout(),
        }
    }
}

impl NetworkProfile {
    pub fn testnet() -> Self {
        Self {
            horizon_url: TESTNET_HORIZON_URL.to_string(),
            passphrase: TESTNET_PASSPHRASE.to_string(),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            horizon_url: MAINNET_HORIZON_URL.to_string(),
            passphrase: MAINNET_PASSPHRASE.to_string(),
        }
    }

    /// Network id: SHA-256 of the passphrase
    pub fn network_id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase.as_bytes()).into()
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load the file if it exists (defaults otherwise) and apply process
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            debug!(path = %path.display(), "Loading configuration file");
            Self::from_file(path)?
        } else {
            warn!("Config file '{}' not found, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_TESTNET_HORIZON_URL).filter(|v| !v.trim().is_empty()) {
            self.networks.testnet.horizon_url = url.trim().to_string();
        }
        if let Some(url) = lookup(ENV_MAINNET_HORIZON_URL).filter(|v| !v.trim().is_empty()) {
            self.networks.mainnet.horizon_url = url.trim().to_string();
        }
    }

    /// Check the merged configuration before any prompt is shown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(source) = &self.source_account {
            if !validation::is_valid_address(source.trim()) {
                return Err(ConfigError::Validation(format!(
                    "source_account '{}' is not a valid Stellar public key",
                    source
                )));
            }
        }

        if self.builder.base_fee == 0 {
            return Err(ConfigError::Validation("builder.base_fee must be greater than zero".into()));
        }
        self.min_starting_balance()?;

        for (name, profile) in [("testnet", &self.networks.testnet), ("mainnet", &self.networks.mainnet)] {
            reqwest::Url::parse(&profile.horizon_url).map_err(|e| {
                ConfigError::Validation(format!(
                    "networks.{}.horizon_url '{}' is not a valid URL: {}",
                    name, profile.horizon_url, e
                ))
            })?;
            if profile.passphrase.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "networks.{}.passphrase must not be empty",
                    name
                )));
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation("http.timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn profile(&self, network: NetworkKind) -> &NetworkProfile {
        match network {
            NetworkKind::Testnet => &self.networks.testnet,
            NetworkKind::Mainnet => &self.networks.mainnet,
        }
    }

    pub fn min_starting_balance(&self) -> Result<Amount, ConfigError> {
        validation::parse_amount(&self.builder.min_starting_balance).map_err(|e| {
            ConfigError::Validation(format!("builder.min_starting_balance: {}", e))
        })
    }
}
