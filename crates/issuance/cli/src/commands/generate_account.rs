//! The `generate-account` subcommand: create and fund a fresh account.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use issuance_executor::TransactionExecutor;
use issuance_gateway::{InMemoryLedger, LedgerGateway};
use issuance_identity::{Identity, SignerRegistry};
use issuance_operation::AccountCreateBuilder;
use issuance_types::{KeyRole, NetworkContext};

use crate::commands::register_identity;

#[derive(Args)]
pub struct GenerateAccountArgs {
    /// Target network name
    #[arg(long, env = "ISSUANCE_NETWORK", default_value = "local")]
    network: String,

    /// Operator secret key (hex); generated when absent
    #[arg(long, env = "ISSUANCE_OPERATOR_KEY")]
    operator_key: Option<String>,

    /// Starting native balance for the new account
    #[arg(long, default_value_t = 100)]
    initial_balance: u64,
}

pub async fn execute(args: GenerateAccountArgs) -> anyhow::Result<()> {
    let registry = Arc::new(SignerRegistry::new());
    let operator = register_identity(&registry, KeyRole::Operator, args.operator_key.as_deref())?;

    let ledger = Arc::new(InMemoryLedger::new());
    let operator_account = ledger.register_account(operator.verifying_key(), 100_000_000)?;
    let ctx = NetworkContext::new(args.network, operator_account);

    // Fresh keys for the account being created.
    let account_identity = Identity::generate(KeyRole::named("generated-account"));

    println!("Creating a new account with a starting balance...");
    let executor = TransactionExecutor::new(Arc::clone(&ledger), registry);
    let receipt = executor
        .execute(
            AccountCreateBuilder::new()
                .initial_balance(args.initial_balance)
                .public_key(account_identity.public_key_hex())
                .build()?,
            &ctx,
        )
        .await?;
    let account = receipt
        .account_id
        .context("account creation receipt carried no account id")?;

    println!("{}", "...SUCCESS!".green());
    println!("The new account ID is: {}", account);
    println!(
        "The new account public key is: {}",
        account_identity.public_key_hex()
    );
    println!(
        "The new account private key is: {}",
        account_identity.secret_key_hex()
    );

    let balance = ledger.account_balance(&account).await?;
    println!("\nNew account balance is: {}", balance.native);
    Ok(())
}
