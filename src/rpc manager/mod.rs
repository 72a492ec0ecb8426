//! RPC Manager Module
//!
//! Narrow chain-access surface used by the composer: rent lookup, checkpoint
//! lookup, submission and confirmation polling.

use async_trait::async_trait;
use solana_sdk::{hash::Hash, signature::Signature, transaction::Transaction};

// Submodules
pub mod rpc_client;
pub mod rpc_errors;

// Re-exports for convenience
pub use rpc_client::SolanaRpc;
pub use rpc_errors::RpcClientError;

/// Recent ledger reference bounding a transaction's validity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Chain access needed to launch a token
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Lamports needed to make an account of `account_size` bytes rent-exempt
    async fn minimum_rent_exempt_balance(&self, account_size: usize)
        -> Result<u64, RpcClientError>;

    /// Latest blockhash and the last block height it stays valid for
    async fn latest_checkpoint(&self) -> Result<Checkpoint, RpcClientError>;

    /// Submit a fully signed transaction
    async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, RpcClientError>;

    /// Wait until `signature` is confirmed or the checkpoint expires
    async fn confirm(
        &self,
        checkpoint: &Checkpoint,
        signature: &Signature,
    ) -> Result<(), RpcClientError>;
}
