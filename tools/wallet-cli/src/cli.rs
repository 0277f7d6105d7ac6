//! Top-level argument parsing.

use clap::error::ErrorKind;
use clap::Parser;

use crate::commands::Command;
use crate::domain::exit;

#[derive(Parser, Debug)]
#[command(name = "wallet-cli")]
#[command(about = "Build, sign and submit transactions through the wallet API gateway")]
pub struct Cli {
    /// Wallet API gateway URL
    #[arg(
        long,
        global = true,
        env = "WALLET_API_URL",
        default_value = "http://127.0.0.1:9888"
    )]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "WALLET_API_TIMEOUT", default_value = "10")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Exit code for an argument parsing outcome.
///
/// Help and version output succeed. Every other parse failure is a local
/// validation failure, so it never shares a code with a connection error.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit::SUCCESS,
        _ => exit::LOCAL_EXEC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_code(args: &[&str]) -> i32 {
        let err = Cli::try_parse_from(args.iter().copied()).unwrap_err();
        usage_exit_code(&err)
    }

    #[test]
    fn test_missing_required_argument_is_local_failure() {
        // sign-transaction needs --password
        assert_eq!(
            parse_code(&["wallet-cli", "sign-transaction", "{}"]),
            exit::LOCAL_EXEC
        );
        assert_eq!(
            parse_code(&["wallet-cli", "build-transaction", "acc1", "aa"]),
            exit::LOCAL_EXEC
        );
    }

    #[test]
    fn test_unknown_input_is_local_failure() {
        assert_eq!(parse_code(&["wallet-cli", "retire-asset"]), exit::LOCAL_EXEC);
        assert_eq!(parse_code(&["wallet-cli"]), exit::LOCAL_EXEC);
        assert_eq!(
            parse_code(&["wallet-cli", "gas-rate", "--timeout", "soon"]),
            exit::LOCAL_EXEC
        );
    }

    #[test]
    fn test_usage_failure_never_looks_like_connection_failure() {
        let code = parse_code(&["wallet-cli", "submit-transaction"]);
        assert_ne!(code, exit::CONNECTION);
    }

    #[test]
    fn test_help_is_success() {
        assert_eq!(parse_code(&["wallet-cli", "--help"]), exit::SUCCESS);
    }

    #[test]
    fn test_valid_arguments_parse() {
        let cli = Cli::try_parse_from([
            "wallet-cli",
            "list-transactions",
            "--endpoint",
            "http://node:9888",
        ])
        .unwrap();
        assert_eq!(cli.endpoint, "http://node:9888");
        assert!(matches!(cli.command, Command::ListTransactions { .. }));
    }
}
