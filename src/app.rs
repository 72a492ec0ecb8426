//! Top-level action handlers
//!
//! Each user action (connect, export, deploy) runs through here. Every error
//! is caught and turned into the status line; nothing is retried. Export
//! needs neither wallet nor network, so it is a free function.

use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::metadata::export_metadata;
use crate::status::{Action, StatusLine};
use crate::structured_logging::AttemptContext;
use crate::tx_builder::{DeployOutcome, TokenComposer, TokenLaunchError};
use crate::types::{ImageSlot, Session, TokenForm};

/// Session, composer and the last status line
pub struct Launcher {
    composer: TokenComposer,
    session: RwLock<Session>,
    status: RwLock<Option<StatusLine>>,
}

impl Launcher {
    pub fn new(composer: TokenComposer) -> Self {
        Self {
            composer,
            session: RwLock::new(Session::new()),
            status: RwLock::new(None),
        }
    }

    /// Snapshot of the session
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Last status line shown
    pub async fn status(&self) -> Option<StatusLine> {
        self.status.read().await.clone()
    }

    async fn set_status(&self, status: StatusLine) -> StatusLine {
        info!(status = %status, "Status");
        *self.status.write().await = Some(status.clone());
        status
    }

    /// Connect the wallet
    pub async fn connect(&self) -> StatusLine {
        self.set_status(StatusLine::Connecting).await;
        let ctx = AttemptContext::new("connect");

        match self.composer.connect().await {
            Ok(address) => {
                self.session.write().await.set_connected(address);
                ctx.logger.log_wallet_connected(&address);
                self.set_status(StatusLine::Connected(address)).await
            }
            Err(err) => {
                warn!(error = %err, "Wallet connection failed");
                self.set_status(StatusLine::ConnectionFailed(err.to_string()))
                    .await
            }
        }
    }

    /// Validate the form and run one deploy attempt
    pub async fn deploy(&self, form: &TokenForm) -> (StatusLine, Option<DeployOutcome>) {
        let result = self.try_deploy(form).await;
        match result {
            Ok(outcome) => (
                self.set_status(StatusLine::from_outcome(&outcome)).await,
                Some(outcome),
            ),
            Err(err) => (
                self.set_status(StatusLine::from_error(&err, Action::Deploy))
                    .await,
                None,
            ),
        }
    }

    async fn try_deploy(&self, form: &TokenForm) -> Result<DeployOutcome, TokenLaunchError> {
        let spec = form.collect()?;
        let session = self.session().await;
        session.require_connected()?;

        self.set_status(StatusLine::Deploying).await;
        self.composer.deploy(&spec, &session).await
    }
}

/// Load the optional images and export the metadata JSON into `out_dir`
pub fn run_export(
    form: &TokenForm,
    image: Option<&Path>,
    banner: Option<&Path>,
    out_dir: &Path,
) -> (StatusLine, Option<PathBuf>) {
    let ctx = AttemptContext::new("export_metadata");

    let status = match export_with_images(form, image, banner, out_dir) {
        Ok((symbol, path)) => {
            let bytes = std::fs::metadata(&path).map(|m| m.len() as usize).unwrap_or(0);
            ctx.logger
                .log_metadata_export(&symbol, &path.display().to_string(), bytes);
            return (StatusLine::MetadataDownloaded, Some(path));
        }
        Err(err) => StatusLine::from_error(&err, Action::Export),
    };
    warn!(status = %status, "Metadata export failed");
    (status, None)
}

fn export_with_images(
    form: &TokenForm,
    image: Option<&Path>,
    banner: Option<&Path>,
    out_dir: &Path,
) -> Result<(String, PathBuf), TokenLaunchError> {
    let spec = form.collect()?;
    let mut session = Session::new();
    if let Some(path) = image {
        session.load_image(ImageSlot::Image, path)?;
    }
    if let Some(path) = banner {
        session.load_image(ImageSlot::Banner, path)?;
    }
    let path = export_metadata(&spec, &session, out_dir)?;
    Ok((spec.symbol, path))
}
