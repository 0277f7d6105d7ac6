//! Wallet API gateway server.
//!
//! Serves the JSON API over in-memory collaborators. `--demo` seeds them with
//! sample accounts, assets and unspent outputs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wallet_api_gateway::{GatewayConfig, MemoryNode, RegistryBuilder, WalletGatewayService};

#[derive(Debug, Parser)]
#[command(name = "wallet-api-gateway", version, about = "Wallet node JSON API gateway")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "WALLET_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Seed the in-memory collaborators with sample data
    #[arg(long)]
    demo: bool,

    /// Serve only the endpoints that need no wallet
    #[arg(long)]
    read_only: bool,
}

fn load_config(args: &Args) -> Result<GatewayConfig> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    config.apply_env_overrides();
    if args.read_only {
        config.wallet.enabled = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = load_config(&args)?;

    let node = if args.demo {
        MemoryNode::demo()
    } else {
        MemoryNode::new()
    };
    let builder = if config.wallet.enabled {
        node.registry_builder()
    } else {
        RegistryBuilder::new(node.node_services())
    };
    let registry = builder.build()?;

    let service = WalletGatewayService::new(config, registry)?;
    info!("Wallet gateway running. Press Ctrl+C to stop.");
    service.start().await?;

    Ok(())
}
