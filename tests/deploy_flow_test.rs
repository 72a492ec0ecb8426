//! End-to-end deploy flow against in-process chain and wallet doubles

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_program,
    transaction::Transaction,
};
use spl_token::instruction::TokenInstruction;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use token_launcher::rpc_manager::{ChainRpc, Checkpoint, RpcClientError};
use token_launcher::tx_builder::derive_metadata_address;
use token_launcher::wallet::{WalletConnector, WalletError};
use token_launcher::{
    FreezeRevocation, Network, Session, TokenComposer, TokenLaunchError, TokenSpec,
};

#[derive(Default)]
struct FakeChain {
    calls: AtomicUsize,
    submitted: Mutex<Vec<Transaction>>,
    submit_error: Option<String>,
    gate: Option<Arc<Notify>>,
}

impl FakeChain {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainRpc for FakeChain {
    async fn minimum_rent_exempt_balance(&self, _size: usize) -> Result<u64, RpcClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1_461_600)
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint, RpcClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Checkpoint {
            blockhash: Hash::new_from_array([7u8; 32]),
            last_valid_block_height: 300,
        })
    }

    async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, RpcClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.submit_error {
            return Err(RpcClientError::RpcResponse {
                endpoint: "fake".to_string(),
                message: message.clone(),
                code: Some(-32002),
            });
        }
        self.submitted.lock().unwrap().push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn confirm(&self, _cp: &Checkpoint, _sig: &Signature) -> Result<(), RpcClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(())
    }
}

struct FakeWallet {
    keypair: Keypair,
    reject: bool,
}

impl FakeWallet {
    fn new(reject: bool) -> Self {
        Self {
            keypair: Keypair::new(),
            reject,
        }
    }
}

#[async_trait]
impl WalletConnector for FakeWallet {
    async fn connect(&self) -> Result<Pubkey, WalletError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        if self.reject {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx)
    }
}

async fn connected(
    chain: Arc<FakeChain>,
    wallet: Arc<FakeWallet>,
) -> (Arc<TokenComposer>, Session) {
    let composer = Arc::new(TokenComposer::new(
        chain,
        wallet,
        Network::Devnet,
        FreezeRevocation::default(),
    ));
    let mut session = Session::new();
    session.set_connected(composer.connect().await.unwrap());
    (composer, session)
}

fn spec() -> TokenSpec {
    let mut spec = TokenSpec::new("Test Coin", "TST", 9);
    spec.initial_supply = 2.5;
    spec.metadata_uri = Some("https://example.com/tst.json".to_string());
    spec
}

#[tokio::test]
async fn test_deploy_submits_one_fully_signed_transaction() {
    let chain = Arc::new(FakeChain::default());
    let wallet = Arc::new(FakeWallet::new(false));
    let payer = wallet.keypair.pubkey();
    let (composer, session) = connected(chain.clone(), wallet).await;

    let outcome = composer.deploy(&spec(), &session).await.unwrap();

    let submitted = chain.submitted();
    assert_eq!(submitted.len(), 1);
    let tx = &submitted[0];
    assert!(tx.verify().is_ok());
    assert_eq!(tx.message.account_keys[0], payer);
    assert_eq!(outcome.signature, tx.signatures[0]);
    assert_eq!(outcome.raw_supply, 2_500_000_000);
    assert_eq!(
        outcome.metadata_account,
        Some(derive_metadata_address(&outcome.mint))
    );
    assert_eq!(
        outcome.explorer_url,
        format!(
            "https://explorer.solana.com/tx/{}?cluster=devnet",
            outcome.signature
        )
    );

    let programs: Vec<Pubkey> = tx
        .message
        .instructions
        .iter()
        .map(|ix| *ix.program_id(&tx.message.account_keys))
        .collect();
    assert_eq!(
        programs.iter().filter(|p| **p == system_program::id()).count(),
        1
    );
    assert_eq!(
        programs
            .iter()
            .filter(|p| **p == spl_associated_token_account::id())
            .count(),
        1
    );
    assert_eq!(
        programs.iter().filter(|p| **p == mpl_token_metadata::ID).count(),
        1
    );

    let minted: Vec<u64> = tx
        .message
        .instructions
        .iter()
        .filter(|ix| *ix.program_id(&tx.message.account_keys) == spl_token::id())
        .filter_map(|ix| match TokenInstruction::unpack(&ix.data) {
            Ok(TokenInstruction::MintTo { amount }) => Some(amount),
            _ => None,
        })
        .collect();
    assert_eq!(minted, vec![2_500_000_000]);
    assert!(!composer.is_deploying());
}

#[tokio::test]
async fn test_empty_name_makes_no_network_calls() {
    let chain = Arc::new(FakeChain::default());
    let (composer, session) = connected(chain.clone(), Arc::new(FakeWallet::new(false))).await;

    let mut bad = spec();
    bad.name = String::new();
    let err = composer.deploy(&bad, &session).await.unwrap_err();

    assert!(matches!(err, TokenLaunchError::Validation(_)));
    assert_eq!(err.to_string(), "Token name and symbol are required.");
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn test_deploy_without_connection_fails() {
    let chain = Arc::new(FakeChain::default());
    let composer = TokenComposer::new(
        chain.clone(),
        Arc::new(FakeWallet::new(false)),
        Network::Devnet,
        FreezeRevocation::default(),
    );

    let err = composer.deploy(&spec(), &Session::new()).await.unwrap_err();
    assert!(matches!(err, TokenLaunchError::NotConnected));
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn test_wallet_rejection_stops_before_submit() {
    let chain = Arc::new(FakeChain::default());
    let (composer, session) = connected(chain.clone(), Arc::new(FakeWallet::new(true))).await;

    let err = composer.deploy(&spec(), &session).await.unwrap_err();
    match err {
        TokenLaunchError::WalletRejected(reason) => {
            assert_eq!(reason, "User rejected the request.")
        }
        other => panic!("Expected WalletRejected, got {:?}", other),
    }
    assert!(chain.submitted().is_empty());
    assert!(!composer.is_deploying());
}

#[tokio::test]
async fn test_rpc_failure_message_is_preserved() {
    let chain = Arc::new(FakeChain {
        submit_error: Some("Attempt to debit an account but found no record of a prior credit.".to_string()),
        ..Default::default()
    });
    let (composer, session) = connected(chain, Arc::new(FakeWallet::new(false))).await;

    let err = composer.deploy(&spec(), &session).await.unwrap_err();
    assert!(matches!(err, TokenLaunchError::Rpc(_)));
    assert!(err
        .to_string()
        .contains("Attempt to debit an account but found no record of a prior credit."));
}

#[tokio::test]
async fn test_second_deploy_while_in_flight_is_rejected() {
    let gate = Arc::new(Notify::new());
    let chain = Arc::new(FakeChain {
        gate: Some(gate.clone()),
        ..Default::default()
    });
    let (composer, session) = connected(chain.clone(), Arc::new(FakeWallet::new(false))).await;

    let first = {
        let composer = composer.clone();
        let session = session.clone();
        tokio::spawn(async move { composer.deploy(&spec(), &session).await })
    };

    // Wait until the first attempt reaches confirmation
    while chain.submitted().is_empty() {
        tokio::task::yield_now().await;
    }
    assert!(composer.is_deploying());

    let err = composer.deploy(&spec(), &session).await.unwrap_err();
    assert!(matches!(err, TokenLaunchError::DeployInProgress));

    gate.notify_one();
    assert!(first.await.unwrap().is_ok());
    assert!(!composer.is_deploying());
    assert_eq!(chain.submitted().len(), 1);
}

#[tokio::test]
async fn test_each_attempt_uses_a_fresh_mint() {
    let chain = Arc::new(FakeChain::default());
    let (composer, session) = connected(chain, Arc::new(FakeWallet::new(false))).await;

    let first = composer.deploy(&spec(), &session).await.unwrap();
    let second = composer.deploy(&spec(), &session).await.unwrap();
    assert_ne!(first.mint, second.mint);
    assert_ne!(first.associated_account, second.associated_account);
}
