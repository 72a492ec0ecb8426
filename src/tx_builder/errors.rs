//! Error types for the token launch composer
//!
//! Every failure of a connect / export / deploy attempt ends up as one of
//! these variants. The top-level action handler renders them verbatim as the
//! status line; nothing here is retried automatically.

use thiserror::Error;

/// Error type for all token launch operations
///
/// This error type covers the whole attempt lifecycle:
/// - Form validation (name, symbol, supply bounds, metadata limits)
/// - Wallet connection and signing
/// - Instruction construction and ordering checks
/// - RPC submission and confirmation
#[derive(Error, Debug)]
pub enum TokenLaunchError {
    /// Missing or malformed user input
    ///
    /// Recovered locally: shown as status text, no network call is made.
    #[error("{0}")]
    Validation(String),

    /// Deploy requested before a wallet was connected
    #[error("Connect wallet before deploying.")]
    NotConnected,

    /// The wallet refused to sign (user declined)
    #[error("Wallet rejected the request: {0}")]
    WalletRejected(String),

    /// Wallet missing or unusable (no keypair, unreadable file, ...)
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Network submission, checkpoint lookup or confirmation failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A deploy attempt is already running on this composer
    #[error("A deployment is already in progress")]
    DeployInProgress,

    /// The compiled message needs a signature nobody in this attempt can give
    #[error("Missing signer: {0} must sign this transaction but is neither the wallet nor the mint")]
    MissingSigner(String),

    /// Serialized transaction does not fit a single packet
    #[error("Transaction too large: {size} bytes (max {max})")]
    TransactionTooLarge {
        /// Serialized size in bytes
        size: usize,
        /// Packet limit in bytes
        max: usize,
    },

    /// Failed to build an instruction for a specific program
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program the instruction targets
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Plan does not follow the create → init → ATA → optional steps order
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// Local file output failure (metadata export)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violation or unexpected state
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TokenLaunchError {
    /// Whether the user can fix this by editing input or reconnecting
    ///
    /// Network and internal failures return `false`; the user may still
    /// re-trigger the action by hand.
    pub fn is_user_recoverable(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::NotConnected => true,
            Self::WalletRejected(_) => true,
            Self::DeployInProgress => true,
            Self::MissingSigner(_) => true,

            Self::Wallet(_) => false,
            Self::Rpc(_) => false,
            Self::TransactionTooLarge { .. } => false,
            Self::InstructionBuild { .. } => false,
            Self::InvalidInstructionOrder(_) => false,
            Self::Io(_) => false,
            Self::Internal(_) => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotConnected => "not_connected",
            Self::WalletRejected(_) => "wallet_rejected",
            Self::Wallet(_) => "wallet",
            Self::Rpc(_) => "rpc",
            Self::DeployInProgress => "in_flight",
            Self::MissingSigner(_) => "signer",
            Self::TransactionTooLarge { .. } => "size",
            Self::InstructionBuild { .. } => "instruction",
            Self::InvalidInstructionOrder(_) => "order",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

// Convenience constructors for common error scenarios
impl TokenLaunchError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Create an instruction build error for a specific program
    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid instruction order error
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TokenLaunchError::validation("Token name and symbol are required.");
        assert_eq!(err.to_string(), "Token name and symbol are required.");

        let err = TokenLaunchError::InstructionBuild {
            program: "spl_token".to_string(),
            reason: "invalid accounts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Instruction build error (program=spl_token): invalid accounts"
        );

        assert_eq!(
            TokenLaunchError::NotConnected.to_string(),
            "Connect wallet before deploying."
        );
    }

    #[test]
    fn test_error_recoverability() {
        assert!(TokenLaunchError::validation("x").is_user_recoverable());
        assert!(TokenLaunchError::NotConnected.is_user_recoverable());
        assert!(TokenLaunchError::DeployInProgress.is_user_recoverable());

        assert!(!TokenLaunchError::Rpc("x".to_string()).is_user_recoverable());
        assert!(!TokenLaunchError::internal("x").is_user_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(TokenLaunchError::validation("x").category(), "validation");
        assert_eq!(TokenLaunchError::Rpc("x".to_string()).category(), "rpc");
        assert_eq!(
            TokenLaunchError::TransactionTooLarge { size: 2000, max: 1232 }.category(),
            "size"
        );
    }
}
