//! Instruction planning and ordering validation
//!
//! This module builds the instruction list for a token launch with the order
//! the token and metadata programs require:
//! 1. create_account for the mint (system program)
//! 2. initialize_mint (token program)
//! 3. create_associated_token_account (associated token program)
//! 4. mint_to (if an initial supply is requested)
//! 5. create_metadata_accounts_v3 (if a metadata URI is set)
//! 6. set_authority for mint / freeze revocation
//!
//! Steps 1-3 appear exactly once in every plan. Planning is stateless: the
//! rent amount and the mint address come in as arguments, so the same inputs
//! always give the same plan.

use crate::tx_builder::errors::TokenLaunchError;
use crate::types::{FreezeRevocation, TokenSpec};
use mpl_token_metadata::{
    instructions::{CreateMetadataAccountV3, CreateMetadataAccountV3InstructionArgs},
    types::DataV2,
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    system_instruction::{self, SystemInstruction},
    system_program,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use spl_token::{
    instruction::{AuthorityType, TokenInstruction},
    solana_program::program_pack::Pack,
};

/// Seed prefix of metadata accounts
pub const METADATA_SEED: &[u8] = b"metadata";

/// Exclusive upper bound of a raw token amount (2^64)
const RAW_AMOUNT_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Plan of instructions with the addresses derived while building it
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    /// The ordered list of instructions for the transaction
    pub instructions: Vec<Instruction>,

    /// New mint account
    pub mint: Pubkey,

    /// Payer's associated token account for the mint
    pub associated_account: Pubkey,

    /// Metadata account, when a metadata URI was given
    pub metadata_account: Option<Pubkey>,

    /// Supply in raw units (0 when nothing is minted)
    pub raw_supply: u64,
}

impl InstructionPlan {
    /// Number of instructions classified as `step`
    pub fn count(&self, step: PlanStep) -> usize {
        self.instructions
            .iter()
            .filter(|ix| classify_instruction(ix) == Some(step))
            .count()
    }
}

/// Kind of an instruction inside a token launch plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlanStep {
    CreateMintAccount,
    InitializeMint,
    CreateAssociatedAccount,
    MintTo,
    CreateMetadata,
    SetAuthority,
}

/// Scale a human supply to raw units: round(supply * 10^decimals)
///
/// Rounds half away from zero. Fails instead of wrapping when the result
/// does not fit a `u64` token amount.
pub fn scale_supply(supply: f64, decimals: u8) -> Result<u64, TokenLaunchError> {
    if !supply.is_finite() || supply < 0.0 {
        return Err(TokenLaunchError::validation(format!(
            "Initial supply must be a non-negative number, got {}",
            supply
        )));
    }

    let scaled = (supply * 10f64.powi(i32::from(decimals))).round();
    if !scaled.is_finite() || scaled >= RAW_AMOUNT_LIMIT {
        return Err(TokenLaunchError::validation(format!(
            "Initial supply {} with {} decimals exceeds the maximum raw amount {}",
            supply,
            decimals,
            u64::MAX
        )));
    }

    Ok(scaled as u64)
}

/// Derive the metadata account of a mint
///
/// Seeds: `"metadata"`, metadata program id, mint address.
pub fn derive_metadata_address(mint: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[METADATA_SEED, mpl_token_metadata::ID.as_ref(), mint.as_ref()],
        &mpl_token_metadata::ID,
    );
    address
}

/// Plan the full token launch instruction list
///
/// # Arguments
///
/// * `spec` - Validated token description
/// * `payer` - Connected wallet; pays rent/fees and receives the supply
/// * `mint` - Address of the freshly generated mint keypair
/// * `rent_lamports` - Rent-exempt balance for a mint account
/// * `freeze_policy` - How `disable_freeze` turns into instructions
///
/// # Errors
///
/// Returns `TokenLaunchError::Validation` when the `TokenSpec` is incomplete or the
/// supply does not fit, and `InstructionBuild` when an encoder rejects its
/// arguments.
pub fn plan_token_instructions(
    spec: &TokenSpec,
    payer: Pubkey,
    mint: Pubkey,
    rent_lamports: u64,
    freeze_policy: FreezeRevocation,
) -> Result<InstructionPlan, TokenLaunchError> {
    spec.validate()?;

    let token_program = spl_token::id();
    let mint_authority = spec.mint_authority(payer);
    let configured_freeze = spec.freeze_authority(payer);
    let initial_freeze = if spec.disable_freeze {
        freeze_policy.initial_authority(configured_freeze)
    } else {
        Some(configured_freeze)
    };

    // Maximum: create + init + ata + mint_to + metadata + 2 x set_authority
    let mut instructions = Vec::with_capacity(7);

    // 1. Allocate the mint account under the token program
    instructions.push(system_instruction::create_account(
        &payer,
        &mint,
        rent_lamports,
        spl_token::state::Mint::LEN as u64,
        &token_program,
    ));

    // 2. Initialize it as a mint
    instructions.push(
        spl_token::instruction::initialize_mint(
            &token_program,
            &mint,
            &mint_authority,
            initial_freeze.as_ref(),
            spec.decimals,
        )
        .map_err(|e| TokenLaunchError::instruction_failed("spl_token", e.to_string()))?,
    );

    // 3. Payer's associated token account
    let associated_account = get_associated_token_address(&payer, &mint);
    instructions.push(create_associated_token_account(
        &payer,
        &payer,
        &mint,
        &token_program,
    ));

    // 4. Initial supply
    let mut raw_supply = 0;
    if spec.initial_supply > 0.0 {
        raw_supply = scale_supply(spec.initial_supply, spec.decimals)?;
        instructions.push(
            spl_token::instruction::mint_to(
                &token_program,
                &mint,
                &associated_account,
                &mint_authority,
                &[],
                raw_supply,
            )
            .map_err(|e| TokenLaunchError::instruction_failed("spl_token", e.to_string()))?,
        );
    }

    // 5. Metadata account
    let mut metadata_account = None;
    if let Some(uri) = spec.metadata_uri() {
        let metadata = derive_metadata_address(&mint);
        instructions.push(metadata_instruction(
            spec,
            uri,
            metadata,
            mint,
            mint_authority,
            payer,
        ));
        metadata_account = Some(metadata);
    }

    // 6. Authority revocation
    if spec.revoke_mint {
        instructions.push(revoke_instruction(
            &mint,
            AuthorityType::MintTokens,
            &mint_authority,
        )?);
    }
    if spec.disable_freeze {
        if let Some(current) = freeze_policy.revoking_authority(configured_freeze, payer) {
            instructions.push(revoke_instruction(
                &mint,
                AuthorityType::FreezeAccount,
                &current,
            )?);
        }
    }

    Ok(InstructionPlan {
        instructions,
        mint,
        associated_account,
        metadata_account,
        raw_supply,
    })
}

fn metadata_instruction(
    spec: &TokenSpec,
    uri: &str,
    metadata: Pubkey,
    mint: Pubkey,
    mint_authority: Pubkey,
    payer: Pubkey,
) -> Instruction {
    CreateMetadataAccountV3 {
        metadata,
        mint,
        mint_authority,
        payer,
        update_authority: (payer, true),
        system_program: system_program::id(),
        rent: None,
    }
    .instruction(CreateMetadataAccountV3InstructionArgs {
        data: DataV2 {
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            uri: uri.to_string(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        },
        is_mutable: true,
        collection_details: None,
    })
}

fn revoke_instruction(
    mint: &Pubkey,
    authority_type: AuthorityType,
    current: &Pubkey,
) -> Result<Instruction, TokenLaunchError> {
    spl_token::instruction::set_authority(
        &spl_token::id(),
        mint,
        None,
        authority_type,
        current,
        &[],
    )
    .map_err(|e| TokenLaunchError::instruction_failed("spl_token", e.to_string()))
}

/// Classify an instruction by program and discriminator
pub fn classify_instruction(ix: &Instruction) -> Option<PlanStep> {
    if ix.program_id == system_program::id() {
        return match bincode::deserialize::<SystemInstruction>(&ix.data) {
            Ok(SystemInstruction::CreateAccount { .. }) => Some(PlanStep::CreateMintAccount),
            _ => None,
        };
    }
    if ix.program_id == spl_token::id() {
        return match TokenInstruction::unpack(&ix.data) {
            Ok(TokenInstruction::InitializeMint { .. }) => Some(PlanStep::InitializeMint),
            Ok(TokenInstruction::MintTo { .. }) => Some(PlanStep::MintTo),
            Ok(TokenInstruction::SetAuthority { .. }) => Some(PlanStep::SetAuthority),
            _ => None,
        };
    }
    if ix.program_id == spl_associated_token_account::id() {
        return Some(PlanStep::CreateAssociatedAccount);
    }
    if ix.program_id == mpl_token_metadata::ID {
        return Some(PlanStep::CreateMetadata);
    }
    None
}

/// Validate token launch instruction ordering (debug/test only)
///
/// Expected order:
/// 1. create_account, initialize_mint, create_associated_token_account
///    (exactly once each, in this order)
/// 2. optional mint_to (at most once)
/// 3. optional metadata creation (at most once)
/// 4. optional set_authority (at most twice)
///
/// # Errors
///
/// Returns `TokenLaunchError::InvalidInstructionOrder` if:
/// - the list is shorter than the three mandatory steps
/// - the mandatory prefix is out of order
/// - an optional step appears before an earlier-numbered one or too often
/// - an instruction does not belong to a token launch
#[cfg(debug_assertions)]
pub fn sanity_check_ix_order(instructions: &[Instruction]) -> Result<(), TokenLaunchError> {
    const PREFIX: [PlanStep; 3] = [
        PlanStep::CreateMintAccount,
        PlanStep::InitializeMint,
        PlanStep::CreateAssociatedAccount,
    ];

    if instructions.len() < PREFIX.len() {
        return Err(TokenLaunchError::invalid_order(format!(
            "Expected at least {} instructions, got {}",
            PREFIX.len(),
            instructions.len()
        )));
    }

    let steps = instructions
        .iter()
        .enumerate()
        .map(|(idx, ix)| {
            classify_instruction(ix).ok_or_else(|| {
                TokenLaunchError::invalid_order(format!(
                    "Unexpected instruction at position {} (program_id: {})",
                    idx, ix.program_id
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (idx, expected) in PREFIX.iter().enumerate() {
        if steps[idx] != *expected {
            return Err(TokenLaunchError::invalid_order(format!(
                "Position {} must be {:?}, got {:?}",
                idx, expected, steps[idx]
            )));
        }
    }

    let mut previous = PlanStep::CreateAssociatedAccount;
    let mut set_authority_count = 0;
    for (idx, step) in steps.iter().enumerate().skip(PREFIX.len()) {
        if PREFIX.contains(step) {
            return Err(TokenLaunchError::invalid_order(format!(
                "Duplicate {:?} at position {}",
                step, idx
            )));
        }
        if *step < previous || (*step == previous && *step != PlanStep::SetAuthority) {
            return Err(TokenLaunchError::invalid_order(format!(
                "{:?} at position {} must not follow {:?}",
                step, idx, previous
            )));
        }
        if *step == PlanStep::SetAuthority {
            set_authority_count += 1;
            if set_authority_count > 2 {
                return Err(TokenLaunchError::invalid_order(format!(
                    "More than two set_authority instructions (position {})",
                    idx
                )));
            }
        }
        previous = *step;
    }

    Ok(())
}

/// No-op version of sanity_check_ix_order for release builds
#[cfg(not(debug_assertions))]
#[inline]
pub fn sanity_check_ix_order(_instructions: &[Instruction]) -> Result<(), TokenLaunchError> {
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn policy(index: u8) -> FreezeRevocation {
        match index % 3 {
            0 => FreezeRevocation::InitNoneThenRevoke,
            1 => FreezeRevocation::RevokeAfterInit,
            _ => FreezeRevocation::OmitAtInit,
        }
    }

    proptest! {
        #[test]
        fn whole_supplies_scale_exactly(whole in 0u64..1_000_000, decimals in 0u8..=9) {
            let raw = scale_supply(whole as f64, decimals).unwrap();
            prop_assert_eq!(raw, whole * 10u64.pow(u32::from(decimals)));
        }

        #[test]
        fn negative_supplies_are_rejected(supply in -1.0e12f64..-1.0e-9, decimals in 0u8..=18) {
            prop_assert!(scale_supply(supply, decimals).is_err());
        }

        #[test]
        fn oversized_supplies_are_rejected(supply in 1.9e19f64..1.0e30) {
            prop_assert!(scale_supply(supply, 0).is_err());
        }

        #[test]
        fn every_plan_is_ordered(
            supply in 0.0f64..1.0e6,
            disable_freeze in any::<bool>(),
            revoke_mint in any::<bool>(),
            with_uri in any::<bool>(),
            policy_index in 0u8..3,
        ) {
            let mut spec = TokenSpec::new("Prop Coin", "PROP", 6);
            spec.initial_supply = supply;
            spec.disable_freeze = disable_freeze;
            spec.revoke_mint = revoke_mint;
            if with_uri {
                spec.metadata_uri = Some("https://example.com/prop.json".to_string());
            }

            let plan = plan_token_instructions(
                &spec,
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                1_461_600,
                policy(policy_index),
            )
            .unwrap();

            prop_assert!(sanity_check_ix_order(&plan.instructions).is_ok());
            prop_assert_eq!(plan.count(PlanStep::CreateMintAccount), 1);
            prop_assert_eq!(plan.count(PlanStep::CreateAssociatedAccount), 1);
            prop_assert_eq!(plan.count(PlanStep::CreateMetadata), usize::from(with_uri));
        }
    }
}
