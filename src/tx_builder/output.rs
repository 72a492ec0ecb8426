//! Result of a successful deploy attempt

use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

/// Addresses and signature surfaced to the caller after confirmation
///
/// The mint keypair itself is never part of the outcome: it signs once
/// inside the attempt and is dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployOutcome {
    /// Address of the new mint
    #[serde(with = "display_string")]
    pub mint: Pubkey,

    /// Payer's associated token account
    #[serde(with = "display_string")]
    pub associated_account: Pubkey,

    /// Metadata account, when metadata was attached
    #[serde(serialize_with = "optional_display_string")]
    pub metadata_account: Option<Pubkey>,

    /// Confirmed transaction signature
    #[serde(with = "display_string")]
    pub signature: Signature,

    /// Supply minted in raw units
    pub raw_supply: u64,

    /// Explorer link for the transaction
    pub explorer_url: String,
}

mod display_string {
    use serde::Serializer;
    use std::fmt::Display;

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }
}

fn optional_display_string<S: serde::Serializer>(
    value: &Option<Pubkey>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.collect_str(v),
        None => s.serialize_none(),
    }
}
