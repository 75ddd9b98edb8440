//! Workflow run parameters.

use issuance_types::AccountId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the counterparty gets associated with the token.
///
/// Both ledger-level variants share one orchestrator; the strategy is a
/// per-run value, not a separate workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationStrategy {
    /// Association transaction signed by the account holder.
    Direct,
    /// The supply-manager contract associates the account on its behalf.
    ViaContract,
}

/// Parameters for one issuance run.
#[derive(Clone, Debug)]
pub struct WorkflowConfig {
    pub token_name: String,
    pub token_symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
    /// Amount minted through the contract; burn and transfer amounts are
    /// derived from it.
    pub mint_amount: u64,
    pub gas_limit: u64,
    /// Pre-existing account holding issued supply.
    pub treasury_account: AccountId,
    /// Native-unit starting balance for the created counterparty account.
    pub counterparty_initial_balance: u64,
    pub association: AssociationStrategy,
    /// Compiled supply-manager contract payload.
    pub bytecode: Vec<u8>,
    /// Bound on each confirmation and query wait.
    pub confirmation_timeout: Duration,
}

impl WorkflowConfig {
    pub fn new(treasury_account: AccountId) -> Self {
        Self {
            token_name: "Fungible".to_string(),
            token_symbol: "FNG".to_string(),
            decimals: 0,
            initial_supply: 1000,
            mint_amount: 1000,
            gas_limit: 3_000_000,
            treasury_account,
            counterparty_initial_balance: 100,
            association: AssociationStrategy::Direct,
            bytecode: vec![0x60, 0x80, 0x60, 0x40, 0x52],
            confirmation_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_association(mut self, strategy: AssociationStrategy) -> Self {
        self.association = strategy;
        self
    }

    pub fn with_supply(mut self, initial_supply: u64, mint_amount: u64) -> Self {
        self.initial_supply = initial_supply;
        self.mint_amount = mint_amount;
        self
    }

    pub fn with_bytecode(mut self, bytecode: Vec<u8>) -> Self {
        self.bytecode = bytecode;
        self
    }

    /// Amount burned after minting. Integer floor division, so repeated
    /// runs over the same parameters produce identical figures.
    pub fn burn_amount(&self) -> u64 {
        self.mint_amount / 2
    }

    /// Amount moved from treasury to counterparty. Same floor semantics
    /// as [`Self::burn_amount`].
    pub fn transfer_amount(&self) -> u64 {
        self.mint_amount / 2
    }
}
