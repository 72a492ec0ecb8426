//! `ChainRpc` over the nonblocking Solana RPC client

use super::{ChainRpc, Checkpoint, RpcClientError};
use crate::config::RpcSettings;
use async_trait::async_trait;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::Signature,
    transaction::Transaction,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Parse a commitment level name
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig, RpcClientError> {
    match level.trim() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(RpcClientError::Configuration(format!(
            "Unknown commitment level '{}' (expected processed, confirmed or finalized)",
            other
        ))),
    }
}

/// Solana JSON-RPC backed chain access
pub struct SolanaRpc {
    client: Arc<RpcClient>,
    endpoint: String,
    commitment: CommitmentConfig,
    poll_interval: Duration,
}

impl SolanaRpc {
    pub fn new(
        endpoint: impl Into<String>,
        commitment: CommitmentConfig,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        let endpoint = endpoint.into();
        let client = Arc::new(RpcClient::new_with_timeout_and_commitment(
            endpoint.clone(),
            timeout,
            commitment,
        ));
        Self {
            client,
            endpoint,
            commitment,
            poll_interval,
        }
    }

    /// Build from the `[rpc]` config section
    pub fn from_settings(settings: &RpcSettings) -> Result<Self, RpcClientError> {
        let commitment = parse_commitment(&settings.commitment)?;
        Ok(Self::new(
            settings.endpoint(),
            commitment,
            Duration::from_secs(settings.timeout_secs),
            Duration::from_millis(settings.confirm_poll_interval_ms),
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn wrap(&self, err: solana_client::client_error::ClientError) -> RpcClientError {
        RpcClientError::from_client_error(err, &self.endpoint)
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn minimum_rent_exempt_balance(
        &self,
        account_size: usize,
    ) -> Result<u64, RpcClientError> {
        self.client
            .get_minimum_balance_for_rent_exemption(account_size)
            .await
            .map_err(|e| self.wrap(e))
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint, RpcClientError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(|e| self.wrap(e))?;
        debug!(
            blockhash = %blockhash,
            last_valid_block_height,
            "Fetched checkpoint"
        );
        Ok(Checkpoint {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, RpcClientError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment.commitment),
            ..Default::default()
        };
        let signature = self
            .client
            .send_transaction_with_config(tx, config)
            .await
            .map_err(|e| self.wrap(e))?;
        info!(signature = %signature, endpoint = %self.endpoint, "Transaction submitted");
        Ok(signature)
    }

    async fn confirm(
        &self,
        checkpoint: &Checkpoint,
        signature: &Signature,
    ) -> Result<(), RpcClientError> {
        loop {
            let status = self
                .client
                .get_signature_status_with_commitment(signature, self.commitment)
                .await
                .map_err(|e| self.wrap(e))?;

            match status {
                Some(Ok(())) => {
                    info!(signature = %signature, "Transaction confirmed");
                    return Ok(());
                }
                Some(Err(err)) => {
                    return Err(RpcClientError::TransactionFailed {
                        signature: signature.to_string(),
                        message: err.to_string(),
                    });
                }
                None => {}
            }

            let block_height = self
                .client
                .get_block_height_with_commitment(self.commitment)
                .await
                .map_err(|e| self.wrap(e))?;
            if block_height > checkpoint.last_valid_block_height {
                return Err(RpcClientError::TransactionExpired {
                    signature: signature.to_string(),
                    last_valid_block_height: checkpoint.last_valid_block_height,
                });
            }

            debug!(
                signature = %signature,
                block_height,
                last_valid_block_height = checkpoint.last_valid_block_height,
                "Awaiting confirmation"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
