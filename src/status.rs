//! Single-line, human-readable status text shown after every action

use solana_sdk::pubkey::Pubkey;
use std::fmt;

use crate::tx_builder::{DeployOutcome, TokenLaunchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Connecting,
    Connected(Pubkey),
    ConnectionFailed(String),
    MetadataDownloaded,
    Deploying,
    Success { signature: String },
    DeployFailed(String),
    /// Export errors are shown without a prefix
    ExportFailed(String),
    /// Validation / not-connected messages shown as-is
    Message(String),
}

/// User action a status line reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Export,
    Deploy,
}

impl StatusLine {
    /// Status for a failed export or deploy
    ///
    /// Export failures show the error message alone. Deploy validation and
    /// not-connected errors are shown on their own; every other deploy error
    /// gets the deploy failure prefix.
    pub fn from_error(err: &TokenLaunchError, action: Action) -> Self {
        match (action, err) {
            (Action::Export, _) => StatusLine::ExportFailed(err.to_string()),
            (Action::Deploy, TokenLaunchError::Validation(_) | TokenLaunchError::NotConnected) => {
                StatusLine::Message(err.to_string())
            }
            (Action::Deploy, other) => StatusLine::DeployFailed(other.to_string()),
        }
    }

    /// Whether this line reports a failed action
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusLine::ConnectionFailed(_)
                | StatusLine::DeployFailed(_)
                | StatusLine::ExportFailed(_)
                | StatusLine::Message(_)
        )
    }

    pub fn from_outcome(outcome: &DeployOutcome) -> Self {
        StatusLine::Success {
            signature: outcome.signature.to_string(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Connecting => write!(f, "Connecting wallet..."),
            StatusLine::Connected(address) => write!(f, "Connected: {}", address),
            StatusLine::ConnectionFailed(reason) => write!(f, "Connection failed: {}", reason),
            StatusLine::MetadataDownloaded => write!(f, "Metadata JSON downloaded."),
            StatusLine::Deploying => write!(f, "Deploying token..."),
            StatusLine::Success { signature } => {
                write!(f, "Success. Mint created with tx: {}", signature)
            }
            StatusLine::DeployFailed(reason) => write!(f, "Deployment failed: {}", reason),
            StatusLine::ExportFailed(reason) => f.write_str(reason),
            StatusLine::Message(message) => f.write_str(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(StatusLine::MetadataDownloaded.to_string(), "Metadata JSON downloaded.");
        assert_eq!(
            StatusLine::Success {
                signature: "5xyz".to_string()
            }
            .to_string(),
            "Success. Mint created with tx: 5xyz"
        );
    }

    #[test]
    fn test_error_status() {
        let status = StatusLine::from_error(&TokenLaunchError::NotConnected, Action::Deploy);
        assert_eq!(status.to_string(), "Connect wallet before deploying.");

        let status = StatusLine::from_error(
            &TokenLaunchError::validation("Token name and symbol are required."),
            Action::Deploy,
        );
        assert_eq!(status.to_string(), "Token name and symbol are required.");

        let status =
            StatusLine::from_error(&TokenLaunchError::Rpc("boom".to_string()), Action::Deploy);
        assert_eq!(status.to_string(), "Deployment failed: RPC error: boom");
        assert!(status.is_failure());
    }

    #[test]
    fn test_export_errors_have_no_deploy_prefix() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let status = StatusLine::from_error(&TokenLaunchError::Io(io), Action::Export);
        assert_eq!(status.to_string(), "I/O error: No such file or directory");
        assert!(status.is_failure());
        assert!(!StatusLine::MetadataDownloaded.is_failure());
    }
}
