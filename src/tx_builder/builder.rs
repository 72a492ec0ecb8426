//! Core TokenComposer implementation
//!
//! This module contains the TokenComposer that turns a validated TokenSpec
//! into one signed, submitted and confirmed transaction.
//!
//! ## Responsibilities
//! - Coordinate between ChainRpc and WalletConnector
//! - Generate the one-time mint keypair and co-sign with it
//! - Enforce a single in-flight deploy per composer
//! - Check signers and packet size before handing off to the wallet

use crate::rpc_manager::{ChainRpc, Checkpoint};
use crate::structured_logging::AttemptContext;
use crate::tx_builder::errors::TokenLaunchError;
use crate::tx_builder::instructions::{
    plan_token_instructions, sanity_check_ix_order, InstructionPlan,
};
use crate::tx_builder::output::DeployOutcome;
use crate::types::{FreezeRevocation, Network, Session, TokenSpec};
use crate::wallet::WalletConnector;
use solana_sdk::{
    packet::PACKET_DATA_SIZE,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use spl_token::solana_program::program_pack::Pack;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds and submits token launch transactions
pub struct TokenComposer {
    rpc: Arc<dyn ChainRpc>,
    wallet: Arc<dyn WalletConnector>,
    network: Network,
    freeze_policy: FreezeRevocation,
    in_flight: AtomicBool,
}

impl TokenComposer {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        wallet: Arc<dyn WalletConnector>,
        network: Network,
        freeze_policy: FreezeRevocation,
    ) -> Self {
        Self {
            rpc,
            wallet,
            network,
            freeze_policy,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a deploy attempt currently holds the in-flight guard
    pub fn is_deploying(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Connect the wallet and return its address
    ///
    /// The caller records the address in its session.
    pub async fn connect(&self) -> Result<Pubkey, TokenLaunchError> {
        Ok(self.wallet.connect().await?)
    }

    /// Run one deploy attempt end to end
    ///
    /// Validation and the connection check happen before any network call.
    /// A second call while one is running fails with `DeployInProgress`.
    pub async fn deploy(
        &self,
        spec: &TokenSpec,
        session: &Session,
    ) -> Result<DeployOutcome, TokenLaunchError> {
        spec.validate()?;
        let payer = session.require_connected()?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TokenLaunchError::DeployInProgress);
        }
        let _guard = scopeguard::guard(&self.in_flight, |flag| {
            flag.store(false, Ordering::Release);
        });

        let ctx = AttemptContext::new("deploy");
        if let Some(note) = freeze_policy_warning(spec, self.freeze_policy) {
            warn!(policy = ?self.freeze_policy, "{}", note);
        }
        let result = self.run_attempt(spec, payer, &ctx).await;
        match &result {
            Ok(outcome) => {
                ctx.logger
                    .log_deploy_success(&outcome.mint, &outcome.signature, ctx.elapsed_ms())
            }
            Err(err) => ctx.logger.log_deploy_failure(err, ctx.elapsed_ms()),
        }
        result
    }

    async fn run_attempt(
        &self,
        spec: &TokenSpec,
        payer: Pubkey,
        ctx: &AttemptContext,
    ) -> Result<DeployOutcome, TokenLaunchError> {
        let mint = Keypair::new();
        ctx.logger.log_deploy_attempt(&mint.pubkey(), &payer);

        let rent_lamports = self
            .rpc
            .minimum_rent_exempt_balance(spl_token::state::Mint::LEN)
            .await?;
        debug!(rent_lamports, "Mint rent-exempt balance");

        let plan = plan_token_instructions(
            spec,
            payer,
            mint.pubkey(),
            rent_lamports,
            self.freeze_policy,
        )?;
        sanity_check_ix_order(&plan.instructions)?;
        ctx.logger
            .log_plan_built(&plan.mint, plan.instructions.len(), plan.raw_supply);

        let checkpoint = self.rpc.latest_checkpoint().await?;
        let tx = finalize_transaction(&plan, payer, &mint, &checkpoint)?;

        let signed = self.wallet.sign_transaction(tx).await?;
        if !signed.is_signed() {
            return Err(TokenLaunchError::Wallet(
                "wallet returned a transaction with missing signatures".to_string(),
            ));
        }

        let signature = self.rpc.submit_transaction(&signed).await?;
        info!(signature = %signature, mint = %plan.mint, "Awaiting confirmation");
        self.rpc.confirm(&checkpoint, &signature).await?;

        Ok(DeployOutcome {
            mint: plan.mint,
            associated_account: plan.associated_account,
            metadata_account: plan.metadata_account,
            signature,
            raw_supply: plan.raw_supply,
            explorer_url: self.network.explorer_tx_url(&signature.to_string()),
        })
    }
}

/// Warning for a freeze policy whose revoke step the token program rejects
///
/// `InitNoneThenRevoke` leaves the mint without a freeze authority and then
/// tries to revoke it, which fails with `MintCannotFreeze`.
pub fn freeze_policy_warning(spec: &TokenSpec, policy: FreezeRevocation) -> Option<&'static str> {
    if spec.disable_freeze && policy == FreezeRevocation::InitNoneThenRevoke {
        Some(
            "freeze_revocation = init-none-then-revoke fails on chain with MintCannotFreeze; \
             use omit-at-init or revoke-after-init",
        )
    } else {
        None
    }
}

/// Compile the plan into a transaction and co-sign with the mint key
///
/// Fee payer is `payer`; the checkpoint blockhash is the recent blockhash.
/// Every required signer must be either the payer (signed later by the
/// wallet) or the mint (signed here).
pub fn finalize_transaction(
    plan: &InstructionPlan,
    payer: Pubkey,
    mint: &Keypair,
    checkpoint: &Checkpoint,
) -> Result<Transaction, TokenLaunchError> {
    let mut tx = Transaction::new_with_payer(&plan.instructions, Some(&payer));
    tx.message.recent_blockhash = checkpoint.blockhash;

    let required = usize::from(tx.message.header.num_required_signatures);
    if let Some(missing) = tx.message.account_keys[..required]
        .iter()
        .find(|key| **key != payer && **key != mint.pubkey())
    {
        return Err(TokenLaunchError::MissingSigner(missing.to_string()));
    }

    let size = bincode::serialized_size(&tx)
        .map_err(|e| TokenLaunchError::internal(format!("transaction serialization: {}", e)))?
        as usize;
    if size > PACKET_DATA_SIZE {
        return Err(TokenLaunchError::TransactionTooLarge {
            size,
            max: PACKET_DATA_SIZE,
        });
    }

    tx.try_partial_sign(&[mint], checkpoint.blockhash)
        .map_err(|e| TokenLaunchError::internal(format!("mint co-signing failed: {}", e)))?;
    Ok(tx)
}
