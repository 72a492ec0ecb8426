//! Structured logging and per-attempt context

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use uuid::Uuid;

use crate::tx_builder::TokenLaunchError;

/// Structured logger for launch events, tagged with an attempt id
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context_id: String,
}

impl StructuredLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_wallet_connected(&self, address: &Pubkey) {
        tracing::info!(
            context_id = %self.context_id,
            address = %address,
            "Wallet connected"
        );
    }

    pub fn log_metadata_export(&self, symbol: &str, path: &str, bytes: usize) {
        tracing::info!(
            context_id = %self.context_id,
            symbol = %symbol,
            path = %path,
            bytes,
            "Metadata JSON exported"
        );
    }

    pub fn log_plan_built(&self, mint: &Pubkey, instruction_count: usize, raw_supply: u64) {
        tracing::debug!(
            context_id = %self.context_id,
            mint = %mint,
            instruction_count,
            raw_supply,
            "Instruction plan built"
        );
    }

    pub fn log_deploy_attempt(&self, mint: &Pubkey, payer: &Pubkey) {
        tracing::info!(
            context_id = %self.context_id,
            mint = %mint,
            payer = %payer,
            "Attempting token deployment"
        );
    }

    pub fn log_deploy_success(&self, mint: &Pubkey, sig: &Signature, latency_ms: u64) {
        tracing::info!(
            context_id = %self.context_id,
            mint = %mint,
            signature = %sig,
            latency_ms,
            "Token deployed"
        );
    }

    pub fn log_deploy_failure(&self, error: &TokenLaunchError, latency_ms: u64) {
        tracing::warn!(
            context_id = %self.context_id,
            category = error.category(),
            recoverable = error.is_user_recoverable(),
            error = %error,
            latency_ms,
            "Token deployment failed"
        );
    }
}

/// Context of one connect / export / deploy attempt
#[derive(Debug, Clone)]
pub struct AttemptContext {
    /// Unique attempt id
    pub attempt_id: String,

    /// Operation name
    pub operation: String,

    /// Start time
    pub started_at: std::time::Instant,

    /// Structured logger instance
    pub logger: StructuredLogger,
}

impl AttemptContext {
    /// Create a new attempt context
    pub fn new(operation: &str) -> Self {
        let attempt_id = Uuid::new_v4().to_string();
        Self {
            attempt_id: attempt_id.clone(),
            operation: operation.to_string(),
            started_at: std::time::Instant::now(),
            logger: StructuredLogger::new(attempt_id),
        }
    }

    /// Milliseconds since the attempt started
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}
