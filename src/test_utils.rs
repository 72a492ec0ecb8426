//! Test Utilities Module
//!
//! Test doubles for the wallet and chain collaborators. They record every
//! call so tests can assert on what reached the "network", and can be told
//! to fail or to hold confirmation until released.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use crate::rpc_manager::{ChainRpc, Checkpoint, RpcClientError};
use crate::wallet::{WalletConnector, WalletError};

/// Rent-exempt balance of an 82-byte mint account
pub const MOCK_MINT_RENT: u64 = 1_461_600;

/// Deterministic chain double
pub struct MockRpc {
    pub checkpoint: Checkpoint,
    /// Message returned by `submit_transaction` when set
    pub submit_error: Option<String>,
    /// Message returned by `confirm` when set
    pub confirm_error: Option<String>,
    /// When set, `confirm` waits for a notification before returning
    pub confirm_gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    submitted: Mutex<Vec<Transaction>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self {
            checkpoint: Checkpoint {
                blockhash: Hash::new_unique(),
                last_valid_block_height: 150,
            },
            submit_error: None,
            confirm_error: None,
            confirm_gate: None,
            calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_submit(message: &str) -> Self {
        let mut rpc = Self::new();
        rpc.submit_error = Some(message.to_string());
        rpc
    }

    pub fn failing_confirm(message: &str) -> Self {
        let mut rpc = Self::new();
        rpc.confirm_error = Some(message.to_string());
        rpc
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        let mut rpc = Self::new();
        rpc.confirm_gate = Some(gate);
        rpc
    }

    /// Total number of calls of any kind
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transactions handed to `submit_transaction`
    pub async fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().await.clone()
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn response_error(message: &str) -> RpcClientError {
        RpcClientError::RpcResponse {
            endpoint: "mock".to_string(),
            message: message.to_string(),
            code: None,
        }
    }
}

impl Default for MockRpc {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn minimum_rent_exempt_balance(
        &self,
        _account_size: usize,
    ) -> Result<u64, RpcClientError> {
        self.record();
        Ok(MOCK_MINT_RENT)
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint, RpcClientError> {
        self.record();
        Ok(self.checkpoint)
    }

    async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, RpcClientError> {
        self.record();
        if let Some(message) = &self.submit_error {
            return Err(Self::response_error(message));
        }
        self.submitted.lock().await.push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn confirm(
        &self,
        _checkpoint: &Checkpoint,
        _signature: &Signature,
    ) -> Result<(), RpcClientError> {
        self.record();
        if let Some(gate) = &self.confirm_gate {
            gate.notified().await;
        }
        match &self.confirm_error {
            Some(message) => Err(Self::response_error(message)),
            None => Ok(()),
        }
    }
}

/// Keypair-backed wallet double that can refuse to sign
pub struct MockWallet {
    keypair: Keypair,
    pub reject: bool,
    /// When set, `connect` waits for a notification before returning
    pub connect_gate: Option<Arc<Notify>>,
    sign_count: AtomicUsize,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
            reject: false,
            connect_gate: None,
            sign_count: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        let mut wallet = Self::new();
        wallet.reject = true;
        wallet
    }

    pub fn gated_connect(gate: Arc<Notify>) -> Self {
        let mut wallet = Self::new();
        wallet.connect_gate = Some(gate);
        wallet
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn sign_count(&self) -> usize {
        self.sign_count.load(Ordering::SeqCst)
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    async fn connect(&self) -> Result<Pubkey, WalletError> {
        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        self.sign_count.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx)
    }
}
