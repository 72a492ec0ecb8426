//! Wallet connection and signing

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::tx_builder::TokenLaunchError;

#[derive(Debug, Error)]
pub enum WalletError {
    /// The user (or the signer) declined the request
    #[error("{0}")]
    Rejected(String),

    /// No usable wallet behind the connector
    #[error("Wallet unavailable: {0}")]
    Unavailable(String),

    /// Keypair material could not be loaded
    #[error("Invalid keypair: {0}")]
    Keypair(String),

    /// Signing failed for a reason other than rejection
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<WalletError> for TokenLaunchError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected(reason) => TokenLaunchError::WalletRejected(reason),
            other => TokenLaunchError::Wallet(other.to_string()),
        }
    }
}

/// Source of the payer's address and signature
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Connect and return the wallet's public address
    async fn connect(&self) -> Result<Pubkey, WalletError>;

    /// Add the wallet's signature to a partially signed transaction
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, WalletError>;
}

/// Wallet backed by a local keypair file
pub struct KeypairWallet {
    keypair: Arc<Keypair>,
}

impl KeypairWallet {
    /// Load a keypair file (JSON byte array, base58 string or raw 64 bytes)
    pub fn from_file(path: &Path) -> Result<Self, WalletError> {
        let keypair_bytes = std::fs::read(path).map_err(|e| {
            WalletError::Unavailable(format!(
                "Failed to read keypair file {}: {}",
                path.display(),
                e
            ))
        })?;

        let raw = if keypair_bytes.len() == 64 {
            keypair_bytes
        } else if keypair_bytes.trim_ascii_start().starts_with(b"[") {
            serde_json::from_slice::<Vec<u8>>(&keypair_bytes)
                .map_err(|e| WalletError::Keypair(format!("Failed to parse keypair JSON: {}", e)))?
        } else {
            // Base58 secret key, as exported by browser wallets
            let text = String::from_utf8_lossy(&keypair_bytes);
            bs58::decode(text.trim())
                .into_vec()
                .map_err(|e| WalletError::Keypair(format!("Failed to decode base58 key: {}", e)))?
        };

        Self::from_bytes(&raw)
    }

    fn from_bytes(raw: &[u8]) -> Result<Self, WalletError> {
        if raw.len() != 64 {
            return Err(WalletError::Keypair(format!(
                "expected 64 bytes, got {}",
                raw.len()
            )));
        }
        if raw.iter().all(|&b| b == 0) {
            return Err(WalletError::Keypair("all-zero key rejected".to_string()));
        }
        let keypair = Keypair::try_from(raw).map_err(|e| WalletError::Keypair(e.to_string()))?;
        Ok(Self::from_keypair(keypair))
    }

    /// Create a wallet from an in-memory keypair
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Get the public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletConnector for KeypairWallet {
    async fn connect(&self) -> Result<Pubkey, WalletError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[self.keypair.as_ref()], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx)
    }
}

impl Clone for KeypairWallet {
    fn clone(&self) -> Self {
        Self {
            keypair: Arc::clone(&self.keypair),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, system_instruction};
    use std::io::Write;

    #[test]
    fn test_load_json_keypair() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let wallet = KeypairWallet::from_file(file.path()).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_load_raw_keypair() {
        let keypair = Keypair::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&keypair.to_bytes()).unwrap();

        let wallet = KeypairWallet::from_file(file.path()).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_load_base58_keypair() {
        let keypair = Keypair::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", keypair.to_base58_string()).unwrap();

        let wallet = KeypairWallet::from_file(file.path()).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_rejects_zero_and_short_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        assert!(matches!(
            KeypairWallet::from_file(file.path()),
            Err(WalletError::Keypair(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1,2,3]").unwrap();
        assert!(matches!(
            KeypairWallet::from_file(file.path()),
            Err(WalletError::Keypair(_))
        ));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let result = KeypairWallet::from_file(Path::new("/nonexistent/id.json"));
        let err: TokenLaunchError = result.err().unwrap().into();
        assert!(matches!(err, TokenLaunchError::Wallet(_)));
    }

    #[test]
    fn test_rejection_maps_to_wallet_rejected() {
        let err: TokenLaunchError = WalletError::Rejected("User rejected the request.".into()).into();
        assert!(matches!(err, TokenLaunchError::WalletRejected(_)));
    }

    #[tokio::test]
    async fn test_sign_adds_wallet_signature() {
        let wallet = KeypairWallet::from_keypair(Keypair::new());
        let payer = wallet.connect().await.unwrap();
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let mut tx = Transaction::new_with_payer(&[ix], Some(&payer));
        tx.message.recent_blockhash = Hash::new_unique();

        let signed = wallet.sign_transaction(tx).await.unwrap();
        assert!(signed.is_signed());
        assert!(signed.verify().is_ok());
    }
}
