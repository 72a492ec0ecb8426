//! Token launch transaction builder
//!
//! This module turns a validated token description into one transaction that
//! creates the mint and everything hanging off it.
//!
//! ## Architecture
//!
//! - **errors**: Error taxonomy shared by every action
//! - **instructions**: Stateless instruction planning and order validation
//! - **builder**: `TokenComposer`, which fetches rent and checkpoint, signs
//!   with the one-time mint key, hands off to the wallet and submits
//! - **output**: `DeployOutcome` returned after confirmation
//!
//! ## Instruction order
//!
//! create_account → initialize_mint → create_associated_token_account →
//! [mint_to] → [create_metadata_accounts_v3] → [set_authority ...]
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use token_launcher::rpc_manager::SolanaRpc;
//! use token_launcher::tx_builder::{TokenComposer, TokenLaunchError};
//! use token_launcher::types::{FreezeRevocation, Network, Session, TokenSpec};
//! use token_launcher::wallet::KeypairWallet;
//!
//! # async fn example(rpc: SolanaRpc, wallet: KeypairWallet) -> Result<(), TokenLaunchError> {
//! let composer = TokenComposer::new(
//!     Arc::new(rpc),
//!     Arc::new(wallet),
//!     Network::Devnet,
//!     FreezeRevocation::default(),
//! );
//!
//! let mut session = Session::new();
//! session.set_connected(composer.connect().await?);
//!
//! let mut spec = TokenSpec::new("My Token", "MTK", 9);
//! spec.initial_supply = 1_000_000.0;
//! let outcome = composer.deploy(&spec, &session).await?;
//! println!("mint {} in tx {}", outcome.mint, outcome.signature);
//! # Ok(())
//! # }
//! ```

// Public API - Error types
pub mod errors;
pub use errors::TokenLaunchError;

pub mod builder;
pub mod instructions;
pub mod output;

// Re-export key types for convenience
pub use builder::{finalize_transaction, freeze_policy_warning, TokenComposer};
pub use instructions::{
    classify_instruction, derive_metadata_address, plan_token_instructions, sanity_check_ix_order,
    scale_supply, InstructionPlan, PlanStep,
};
pub use output::DeployOutcome;
