use solana_client::client_error::ClientError;
use thiserror::Error;

use crate::tx_builder::TokenLaunchError;

/// RPC client error types
#[derive(Debug, Clone, Error)]
pub enum RpcClientError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport {
        endpoint: String,
        message: String,
    },

    /// Timeout errors
    #[error("Request timed out: {message} (endpoint: {endpoint})")]
    Timeout {
        endpoint: String,
        message: String,
    },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    #[error("Blockhash not found: {message} (endpoint: {endpoint})")]
    BlockhashNotFound {
        endpoint: String,
        message: String,
    },

    #[error("Insufficient funds: {message} (endpoint: {endpoint})")]
    InsufficientFunds {
        endpoint: String,
        message: String,
    },

    /// Transaction landed but failed on-chain
    #[error("Transaction {signature} failed: {message}")]
    TransactionFailed {
        signature: String,
        message: String,
    },

    /// Block height moved past the checkpoint before confirmation
    #[error("Transaction {signature} expired: block height exceeded {last_valid_block_height}")]
    TransactionExpired {
        signature: String,
        last_valid_block_height: u64,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RpcClientError {
    /// Classify a client error; the node's message is always kept
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        let message = err.to_string();
        let err_str = message.to_lowercase();
        let endpoint = endpoint.to_string();

        if err_str.contains("blockhash not found") {
            RpcClientError::BlockhashNotFound { endpoint, message }
        } else if err_str.contains("insufficient funds")
            || err_str.contains("insufficient lamports")
        {
            RpcClientError::InsufficientFunds { endpoint, message }
        } else if err_str.contains("timeout") || err_str.contains("timed out") {
            RpcClientError::Timeout { endpoint, message }
        } else if err_str.contains("error sending request")
            || err_str.contains("connection refused")
            || err_str.contains("dns error")
        {
            RpcClientError::Transport { endpoint, message }
        } else {
            RpcClientError::RpcResponse {
                endpoint,
                message,
                code: extract_code(&err_str),
            }
        }
    }
}

fn extract_code(err_str: &str) -> Option<i64> {
    err_str
        .split("code:")
        .nth(1)
        .and_then(|s| s.split_whitespace().next())
        .and_then(|s| s.trim_end_matches(',').parse::<i64>().ok())
}

impl From<RpcClientError> for TokenLaunchError {
    fn from(err: RpcClientError) -> Self {
        TokenLaunchError::Rpc(err.to_string())
    }
}
