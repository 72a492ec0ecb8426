//! Configuration module for the token launcher
//!
//! This module handles configuration loading from TOML files and `.env`,
//! and provides structured configuration types. CLI flags override the
//! loaded values in `main.rs`.

use crate::types::{FreezeRevocation, Network};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Wallet configuration
    #[serde(default)]
    pub wallet: WalletSettings,

    /// Transaction composer policies
    #[serde(default)]
    pub composer: ComposerSettings,

    /// Logging output
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    /// Cluster to deploy to
    #[serde(default)]
    pub network: Network,

    /// Explicit RPC URL; overrides the cluster's public endpoint
    #[serde(default)]
    pub url: Option<String>,

    /// Commitment used for checkpoint lookup, preflight and confirmation
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,

    /// Delay between signature status polls
    #[serde(default = "default_poll_interval")]
    pub confirm_poll_interval_ms: u64,
}

impl RpcSettings {
    /// URL the RPC client talks to
    pub fn endpoint(&self) -> String {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.network.rpc_url().to_string(),
        }
    }
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            url: None,
            commitment: default_commitment(),
            timeout_secs: default_rpc_timeout(),
            confirm_poll_interval_ms: default_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSettings {
    /// Path to keypair file (`~` is expanded)
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

impl WalletSettings {
    /// Keypair path with a leading `~` replaced by `$HOME`
    pub fn resolved_keypair_path(&self) -> PathBuf {
        expand_home(&self.keypair_path)
    }
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComposerSettings {
    /// How `disable_freeze` is expressed in the transaction
    #[serde(default)]
    pub freeze_revocation: FreezeRevocation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonitoringSettings {
    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

// Default value functions
fn default_commitment() -> String { "confirmed".to_string() }
fn default_rpc_timeout() -> u64 { 30 }
fn default_poll_interval() -> u64 { 500 }
fn default_keypair_path() -> String { "~/.config/solana/id.json".to_string() }

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after applying `.env` to the process environment
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Reject values that cannot work at runtime
    pub fn validate(&self) -> anyhow::Result<()> {
        crate::rpc_manager::rpc_client::parse_commitment(&self.rpc.commitment)?;
        if self.rpc.timeout_secs == 0 {
            anyhow::bail!("rpc.timeout_secs must be greater than zero");
        }
        if self.rpc.confirm_poll_interval_ms == 0 {
            anyhow::bail!("rpc.confirm_poll_interval_ms must be greater than zero");
        }
        if self.wallet.keypair_path.trim().is_empty() {
            anyhow::bail!("wallet.keypair_path must not be empty");
        }
        Ok(())
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
