//! wallet-cli: command-line client for the wallet API gateway.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wallet_cli::api::WalletApiClient;
use wallet_cli::cli::{usage_exit_code, Cli};
use wallet_cli::commands::execute;
use wallet_cli::domain::exit;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };

    // stdout carries command output only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let endpoint = cli.endpoint;
    let timeout = Duration::from_secs(cli.timeout);

    match execute(cli.command, || WalletApiClient::new(endpoint, timeout)).await {
        Ok(output) => {
            println!("{output}");
            std::process::exit(exit::SUCCESS);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
