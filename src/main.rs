//! Token Launcher
//!
//! Command line entry point: connect a keypair wallet, export token metadata
//! JSON, or deploy a new SPL token (mint, associated account, supply,
//! metadata and authority changes) in one transaction.

// Compiler warning configuration
#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(dead_code)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_launcher::app::run_export;
use token_launcher::rpc_manager::SolanaRpc;
use token_launcher::wallet::KeypairWallet;
use token_launcher::{Config, Launcher, Network, StatusLine, TokenComposer, TokenForm};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "token-launcher.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Cluster override (devnet, testnet, mainnet-beta)
    #[arg(long, global = true, env = "TOKEN_LAUNCHER_NETWORK")]
    network: Option<Network>,

    /// RPC URL override
    #[arg(long, global = true, env = "TOKEN_LAUNCHER_RPC_URL")]
    rpc_url: Option<String>,

    /// Keypair file override
    #[arg(long, global = true, env = "TOKEN_LAUNCHER_KEYPAIR")]
    keypair: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the wallet and print its address
    Connect,

    /// Write `<symbol>-metadata.json`
    ExportMetadata {
        #[command(flatten)]
        token: TokenArgs,

        /// Token image file
        #[arg(long)]
        image: Option<PathBuf>,

        /// Banner image file
        #[arg(long)]
        banner: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Create the token in one transaction
    Deploy {
        #[command(flatten)]
        token: TokenArgs,
    },
}

/// Token fields shared by export and deploy
#[derive(ClapArgs, Debug, Clone)]
struct TokenArgs {
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    symbol: String,

    #[arg(long, default_value_t = 9)]
    decimals: u8,

    /// Whole-token supply minted to the payer
    #[arg(long, default_value_t = 0.0)]
    supply: f64,

    /// Off-chain metadata JSON URI; empty skips on-chain metadata
    #[arg(long, default_value = "")]
    metadata_uri: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "")]
    website: String,

    #[arg(long, default_value = "")]
    twitter: String,

    #[arg(long, default_value = "")]
    telegram: String,

    #[arg(long, default_value = "")]
    discord: String,

    /// Leave the mint without a freeze authority
    #[arg(long)]
    disable_freeze: bool,

    /// Revoke the mint authority after the initial mint
    #[arg(long)]
    revoke_mint: bool,

    /// Mint authority (defaults to the payer)
    #[arg(long, default_value = "")]
    mint_authority: String,

    /// Freeze authority (defaults to the payer)
    #[arg(long, default_value = "")]
    freeze_authority: String,
}

impl From<TokenArgs> for TokenForm {
    fn from(args: TokenArgs) -> Self {
        TokenForm {
            name: args.name,
            symbol: args.symbol,
            decimals: args.decimals,
            supply: args.supply,
            metadata_uri: args.metadata_uri,
            description: args.description,
            website: args.website,
            twitter: args.twitter,
            telegram: args.telegram,
            discord: args.discord,
            disable_freeze: args.disable_freeze,
            revoke_mint: args.revoke_mint,
            mint_authority: args.mint_authority,
            freeze_authority: args.freeze_authority,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, &args);

    init_logging(args.verbose, args.json_logs || config.monitoring.json_logs)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Token launcher starting");

    match args.command {
        Command::Connect => {
            let launcher = build_launcher(&config)?;
            let status = launcher.connect().await;
            println!("{}", status);
            exit_on_failure(&status);
        }
        Command::ExportMetadata {
            token,
            image,
            banner,
            out_dir,
        } => {
            let (status, _) = run_export(
                &TokenForm::from(token),
                image.as_deref(),
                banner.as_deref(),
                &out_dir,
            );
            println!("{}", status);
            exit_on_failure(&status);
        }
        Command::Deploy { token } => {
            let launcher = build_launcher(&config)?;
            let status = launcher.connect().await;
            println!("{}", status);
            exit_on_failure(&status);

            let (status, outcome) = launcher.deploy(&TokenForm::from(token)).await;
            println!("{}", status);
            if let Some(outcome) = outcome {
                println!("Mint: {}", outcome.mint);
                println!("Token account: {}", outcome.associated_account);
                if let Some(metadata) = outcome.metadata_account {
                    println!("Metadata account: {}", metadata);
                }
                println!("Explorer: {}", outcome.explorer_url);
            }
            exit_on_failure(&status);
        }
    }

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = if verbose {
        "token_launcher=debug,info"
    } else {
        "token_launcher=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    // Logs go to stderr; stdout carries the status lines
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        dotenvy::dotenv().ok();
        Ok(Config::default())
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(network) = args.network {
        config.rpc.network = network;
    }
    if let Some(url) = &args.rpc_url {
        config.rpc.url = Some(url.clone());
    }
    if let Some(path) = &args.keypair {
        config.wallet.keypair_path = path.clone();
    }
}

fn build_launcher(config: &Config) -> Result<Launcher> {
    let endpoint = config.rpc.endpoint();
    info!(network = %config.rpc.network, endpoint = %endpoint, "Using cluster");
    let rpc = SolanaRpc::from_settings(&config.rpc)
        .with_context(|| format!("Failed to set up RPC client for {}", endpoint))?;

    let keypair_path = config.wallet.resolved_keypair_path();
    let wallet = KeypairWallet::from_file(&keypair_path)
        .with_context(|| format!("Failed to load wallet from {}", keypair_path.display()))?;

    if config.rpc.network == Network::MainnetBeta {
        warn!("Deploying to mainnet-beta; the transaction spends real SOL");
    }

    let composer = TokenComposer::new(
        Arc::new(rpc),
        Arc::new(wallet),
        config.rpc.network,
        config.composer.freeze_revocation,
    );
    Ok(Launcher::new(composer))
}

/// Exit non-zero after printing a failure status
fn exit_on_failure(status: &StatusLine) {
    if status.is_failure() {
        std::process::exit(1);
    }
}
