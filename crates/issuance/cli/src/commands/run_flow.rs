//! The `run` subcommand: the full issuance sequence end to end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use colored::Colorize;
use issuance_executor::TransactionExecutor;
use issuance_gateway::InMemoryLedger;
use issuance_identity::SignerRegistry;
use issuance_types::{KeyRole, NetworkContext};
use issuance_workflow::{AssociationStrategy, IssuanceWorkflow, WorkflowConfig};

use crate::commands::register_identity;
use crate::output::ConsoleSink;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AssociationArg {
    /// Association transaction signed by the counterparty
    Direct,
    /// The contract associates the counterparty on its behalf
    ViaContract,
}

impl From<AssociationArg> for AssociationStrategy {
    fn from(arg: AssociationArg) -> Self {
        match arg {
            AssociationArg::Direct => AssociationStrategy::Direct,
            AssociationArg::ViaContract => AssociationStrategy::ViaContract,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Target network name
    #[arg(long, env = "ISSUANCE_NETWORK", default_value = "local")]
    network: String,

    /// Operator secret key (hex); generated when absent
    #[arg(long, env = "ISSUANCE_OPERATOR_KEY")]
    operator_key: Option<String>,

    /// Treasury secret key (hex); generated when absent
    #[arg(long, env = "ISSUANCE_TREASURY_KEY")]
    treasury_key: Option<String>,

    /// Token name
    #[arg(long, default_value = "Fungible")]
    token_name: String,

    /// Token symbol
    #[arg(long, default_value = "FNG")]
    token_symbol: String,

    /// Token decimals
    #[arg(long, default_value_t = 0)]
    decimals: u8,

    /// Initial token supply held by the treasury
    #[arg(long, default_value_t = 1000)]
    initial_supply: u64,

    /// Amount minted through the contract; burn and transfer amounts
    /// derive from it
    #[arg(long, default_value_t = 1000)]
    mint: u64,

    /// How the counterparty gets associated with the token
    #[arg(long, value_enum, default_value = "direct")]
    association: AssociationArg,

    /// Compiled contract payload; a placeholder is used when absent
    #[arg(long)]
    bytecode: Option<PathBuf>,

    /// Bound in seconds on each confirmation wait
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let registry = Arc::new(SignerRegistry::new());
    let operator = register_identity(&registry, KeyRole::Operator, args.operator_key.as_deref())?;
    let treasury = register_identity(&registry, KeyRole::Treasury, args.treasury_key.as_deref())?;

    let ledger = Arc::new(InMemoryLedger::new());
    let operator_account = ledger.register_account(operator.verifying_key(), 100_000_000)?;
    let treasury_account = ledger.register_account(treasury.verifying_key(), 100_000_000)?;

    let mut config = WorkflowConfig::new(treasury_account)
        .with_supply(args.initial_supply, args.mint)
        .with_association(args.association.into());
    config.token_name = args.token_name;
    config.token_symbol = args.token_symbol;
    config.decimals = args.decimals;
    config.confirmation_timeout = Duration::from_secs(args.timeout_secs);
    if let Some(path) = &args.bytecode {
        config.bytecode = std::fs::read(path)
            .with_context(|| format!("reading contract bytecode from {}", path.display()))?;
    }

    let executor = TransactionExecutor::new(ledger, registry);
    let ctx = NetworkContext::new(args.network, operator_account);
    let mut workflow =
        IssuanceWorkflow::new(executor, ctx, config).with_sink(Arc::new(ConsoleSink));

    match workflow.run().await {
        Ok(()) => {
            let state = workflow.state();
            println!("\n{}", "Issuance flow completed.".green().bold());
            if let Some(token) = state.token {
                println!("Token ID: {}", token);
                println!("Token ID in EVM format: {}", token.to_evm_address());
            }
            if let Some(contract) = state.contract {
                println!("Contract ID: {}", contract);
            }
            println!("Total supply: {}", state.expected_supply);
            Ok(())
        }
        Err(err) => {
            let state = workflow.state();
            eprintln!("\n{} {}", "Workflow failed:".red().bold(), err);
            eprintln!(
                "State at failure:\n{}",
                serde_json::to_string_pretty(state)?
            );
            Err(err.into())
        }
    }
}
