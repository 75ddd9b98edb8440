//! Issuance CLI - terminal interface for the issuance workflow.
//!
//! Two entrypoints, matching the two showcase flows:
//! - `issuance run` drives the full issuance sequence against the
//!   embedded in-memory ledger and prints each step as it confirms.
//! - `issuance generate-account` creates a funded account and prints its
//!   credentials.
//!
//! Credentials and network selection come from flags or environment
//! variables; keys not supplied are generated fresh for the run.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{generate_account, run_flow};

/// Issuance CLI application
#[derive(Parser)]
#[command(name = "issuance")]
#[command(about = "Receipt-gated asset-issuance workflow", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full issuance flow: token, contract, mint, burn, transfer
    Run(run_flow::RunArgs),

    /// Create a funded account and print its credentials
    GenerateAccount(generate_account::GenerateAccountArgs),
}

/// Run using the current process arguments.
pub async fn run() -> anyhow::Result<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Run(args) => run_flow::execute(args).await,
        Commands::GenerateAccount(args) => generate_account::execute(args).await,
    }
}
