//! Common types used throughout the application

use crate::tx_builder::TokenLaunchError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Metadata program limits (bytes)
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Cluster the token is deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Network {
    /// Public RPC endpoint for this cluster
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    /// Cluster name as used by the explorer query string
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::MainnetBeta => "mainnet-beta",
        }
    }

    /// Explorer link for a transaction signature
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!(
            "https://explorer.solana.com/tx/{}?cluster={}",
            signature,
            self.as_str()
        )
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = TokenLaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            other => Err(TokenLaunchError::validation(format!(
                "Unknown network '{}' (expected devnet, testnet or mainnet-beta)",
                other
            ))),
        }
    }
}

/// How `disable_freeze` is turned into instructions
///
/// All policies end with no freeze authority on the mint. They differ in
/// whether the mint is initialized with one and whether a set-authority
/// instruction follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FreezeRevocation {
    /// Initialize with no freeze authority, then append a revoke signed by the payer
    #[default]
    InitNoneThenRevoke,
    /// Initialize with the freeze authority, then revoke it in the same transaction
    RevokeAfterInit,
    /// Initialize with no freeze authority and append nothing
    OmitAtInit,
}

impl FreezeRevocation {
    /// Freeze authority passed to `initialize_mint` when freezing is disabled
    pub fn initial_authority(&self, configured: Pubkey) -> Option<Pubkey> {
        match self {
            FreezeRevocation::RevokeAfterInit => Some(configured),
            FreezeRevocation::InitNoneThenRevoke | FreezeRevocation::OmitAtInit => None,
        }
    }

    /// Current authority named in the trailing revoke instruction, if any
    pub fn revoking_authority(&self, configured: Pubkey, payer: Pubkey) -> Option<Pubkey> {
        match self {
            FreezeRevocation::InitNoneThenRevoke => Some(payer),
            FreezeRevocation::RevokeAfterInit => Some(configured),
            FreezeRevocation::OmitAtInit => None,
        }
    }
}

impl FromStr for FreezeRevocation {
    type Err = TokenLaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "init-none-then-revoke" => Ok(FreezeRevocation::InitNoneThenRevoke),
            "revoke-after-init" => Ok(FreezeRevocation::RevokeAfterInit),
            "omit-at-init" => Ok(FreezeRevocation::OmitAtInit),
            other => Err(TokenLaunchError::validation(format!(
                "Unknown freeze revocation policy '{}'",
                other
            ))),
        }
    }
}

/// Raw token form as typed by the user
///
/// Everything is text (or a plain flag) so that parsing and validation
/// happen in one place: [`TokenForm::collect`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenForm {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supply: f64,
    pub metadata_uri: String,
    pub description: String,
    pub website: String,
    pub twitter: String,
    pub telegram: String,
    pub discord: String,
    pub disable_freeze: bool,
    pub revoke_mint: bool,
    pub mint_authority: String,
    pub freeze_authority: String,
}

impl TokenForm {
    /// Trim, parse and validate the form into a [`TokenSpec`]
    pub fn collect(&self) -> Result<TokenSpec, TokenLaunchError> {
        let spec = TokenSpec {
            name: self.name.trim().to_string(),
            symbol: self.symbol.trim().to_string(),
            decimals: self.decimals,
            initial_supply: self.supply,
            metadata_uri: non_empty(&self.metadata_uri),
            description: self.description.trim().to_string(),
            website: non_empty(&self.website),
            twitter: non_empty(&self.twitter),
            telegram: non_empty(&self.telegram),
            discord: non_empty(&self.discord),
            disable_freeze: self.disable_freeze,
            revoke_mint: self.revoke_mint,
            mint_authority_override: parse_optional_pubkey(&self.mint_authority, "mint authority")?,
            freeze_authority_override: parse_optional_pubkey(
                &self.freeze_authority,
                "freeze authority",
            )?,
        };
        spec.validate()?;
        Ok(spec)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse an optional base58 address; blank means "fall back to the payer"
pub fn parse_optional_pubkey(
    value: &str,
    field: &str,
) -> Result<Option<Pubkey>, TokenLaunchError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Pubkey::from_str(trimmed).map(Some).map_err(|e| {
        TokenLaunchError::validation(format!("Invalid {} address '{}': {}", field, trimmed, e))
    })
}

/// Validated description of the token to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Human units; scaled by 10^decimals when minted
    pub initial_supply: f64,
    pub metadata_uri: Option<String>,
    pub description: String,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
    pub disable_freeze: bool,
    pub revoke_mint: bool,
    pub mint_authority_override: Option<Pubkey>,
    pub freeze_authority_override: Option<Pubkey>,
}

impl TokenSpec {
    /// Minimal spec with just the required fields
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            initial_supply: 0.0,
            metadata_uri: None,
            description: String::new(),
            website: None,
            twitter: None,
            telegram: None,
            discord: None,
            disable_freeze: false,
            revoke_mint: false,
            mint_authority_override: None,
            freeze_authority_override: None,
        }
    }

    /// Check the required fields and the metadata program limits
    pub fn validate(&self) -> Result<(), TokenLaunchError> {
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(TokenLaunchError::validation(
                "Token name and symbol are required.",
            ));
        }
        if !self.initial_supply.is_finite() || self.initial_supply < 0.0 {
            return Err(TokenLaunchError::validation(format!(
                "Initial supply must be a non-negative number, got {}",
                self.initial_supply
            )));
        }
        if let Some(uri) = self.metadata_uri.as_deref().filter(|u| !u.is_empty()) {
            check_len("name", &self.name, MAX_NAME_LENGTH)?;
            check_len("symbol", &self.symbol, MAX_SYMBOL_LENGTH)?;
            check_len("metadata URI", uri, MAX_URI_LENGTH)?;
        }
        Ok(())
    }

    /// Metadata URI, treating an empty string as absent
    pub fn metadata_uri(&self) -> Option<&str> {
        self.metadata_uri.as_deref().filter(|u| !u.is_empty())
    }

    /// Mint authority, falling back to the payer
    pub fn mint_authority(&self, payer: Pubkey) -> Pubkey {
        self.mint_authority_override.unwrap_or(payer)
    }

    /// Configured freeze authority, falling back to the payer
    pub fn freeze_authority(&self, payer: Pubkey) -> Pubkey {
        self.freeze_authority_override.unwrap_or(payer)
    }

    /// File name used by the metadata export
    pub fn metadata_file_name(&self) -> String {
        let stem = if self.symbol.is_empty() {
            "token"
        } else {
            self.symbol.as_str()
        };
        format!("{}-metadata.json", stem)
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), TokenLaunchError> {
    if value.len() > max {
        return Err(TokenLaunchError::validation(format!(
            "Token {} is too long for on-chain metadata ({} bytes, max {})",
            field,
            value.len(),
            max
        )));
    }
    Ok(())
}

/// Which preview slot an image fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Image,
    Banner,
}

/// Per-run user session: connected wallet and loaded images
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub public_address: Option<Pubkey>,
    pub image_data: Option<String>,
    pub banner_data: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful wallet connection
    pub fn set_connected(&mut self, address: Pubkey) {
        self.public_address = Some(address);
    }

    /// Payer address or `NotConnected`
    pub fn require_connected(&self) -> Result<Pubkey, TokenLaunchError> {
        self.public_address.ok_or(TokenLaunchError::NotConnected)
    }

    /// Load a local image file into a slot as a data URL
    pub fn load_image(&mut self, slot: ImageSlot, path: &Path) -> Result<(), TokenLaunchError> {
        let bytes = std::fs::read(path)?;
        let data_url = to_data_url(&bytes, mime_for_path(path));
        match slot {
            ImageSlot::Image => self.image_data = Some(data_url),
            ImageSlot::Banner => self.banner_data = Some(data_url),
        }
        Ok(())
    }
}

/// MIME type inferred from a file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Encode bytes as a `data:` URL
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
