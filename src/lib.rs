//! Token Launcher - SPL token creation in a single transaction
//!
//! This library exposes the composer and its collaborators for the CLI and
//! for integration tests.
//!
//! - [`tx_builder`]: instruction planning, signing and submission
//! - [`rpc_manager`]: chain access behind the `ChainRpc` trait
//! - [`wallet`]: payer signing behind the `WalletConnector` trait
//! - [`metadata`]: off-chain metadata JSON export
//! - [`app`]: top-level action handlers producing status lines

pub mod app;
pub mod config;
pub mod metadata;
pub mod status;
pub mod structured_logging;
pub mod tx_builder;
pub mod types;
pub mod wallet;

// Directory name carries a space
#[path = "rpc manager/mod.rs"]
pub mod rpc_manager;

pub mod test_utils;

// Re-export commonly used types
pub use app::Launcher;
pub use config::Config;
pub use status::StatusLine;
pub use tx_builder::{DeployOutcome, TokenComposer, TokenLaunchError};
pub use types::{FreezeRevocation, Network, Session, TokenForm, TokenSpec};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
