//! Off-chain metadata document
//!
//! The same JSON is used for the standalone export and as the document the
//! user hosts behind the on-chain metadata URI. Building it never touches
//! the network.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tx_builder::TokenLaunchError;
use crate::types::{Session, TokenSpec};

/// Social links and banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataExtensions {
    pub website: String,
    pub twitter: String,
    pub telegram: String,
    pub discord: String,
    pub banner: String,
}

/// Metadata JSON; field order is the serialized key order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub extensions: MetadataExtensions,
}

impl MetadataDocument {
    /// Pretty JSON with two-space indentation
    pub fn to_json(&self) -> Result<String, TokenLaunchError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TokenLaunchError::internal(format!("metadata serialization: {}", e)))
    }
}

/// Project a validated spec and the session images into a metadata document
pub fn build_metadata_document(
    spec: &TokenSpec,
    session: &Session,
) -> Result<MetadataDocument, TokenLaunchError> {
    spec.validate()?;

    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    Ok(MetadataDocument {
        name: spec.name.clone(),
        symbol: spec.symbol.clone(),
        description: spec.description.clone(),
        image: text(&session.image_data),
        extensions: MetadataExtensions {
            website: text(&spec.website),
            twitter: text(&spec.twitter),
            telegram: text(&spec.telegram),
            discord: text(&spec.discord),
            banner: text(&session.banner_data),
        },
    })
}

/// Write `<symbol>-metadata.json` into `out_dir` and return its path
pub fn export_metadata(
    spec: &TokenSpec,
    session: &Session,
    out_dir: &Path,
) -> Result<PathBuf, TokenLaunchError> {
    let document = build_metadata_document(spec, session)?;
    let json = document.to_json()?;
    let path = out_dir.join(spec.metadata_file_name());
    std::fs::write(&path, json.as_bytes())?;
    Ok(path)
}
