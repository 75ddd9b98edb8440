//! Property tests: supply arithmetic and conservation hold for any valid
//! initial supply and mint amount.

use std::sync::Arc;

use issuance_executor::TransactionExecutor;
use issuance_gateway::InMemoryLedger;
use issuance_identity::{Identity, SignerRegistry};
use issuance_types::{KeyRole, NetworkContext};
use issuance_workflow::{IssuanceWorkflow, WorkflowConfig, WorkflowStage};
use proptest::prelude::*;

/// Run a full issuance flow and return (supply, treasury, counterparty).
async fn run_flow(initial_supply: u64, mint: u64) -> (u64, u64, u64) {
    let registry = Arc::new(SignerRegistry::new());
    let operator = registry
        .register(Identity::generate(KeyRole::Operator))
        .unwrap();
    let treasury_identity = registry
        .register(Identity::generate(KeyRole::Treasury))
        .unwrap();

    let ledger = Arc::new(InMemoryLedger::new());
    let operator_account = ledger
        .register_account(operator.verifying_key(), 100_000)
        .unwrap();
    let treasury = ledger
        .register_account(treasury_identity.verifying_key(), 100_000)
        .unwrap();

    let executor = TransactionExecutor::new(ledger, registry);
    let mut workflow = IssuanceWorkflow::new(
        executor,
        NetworkContext::new("local", operator_account),
        WorkflowConfig::new(treasury).with_supply(initial_supply, mint),
    );
    workflow.run().await.unwrap();

    let state = workflow.state();
    assert_eq!(state.stage, WorkflowStage::Done);
    (
        state.expected_supply,
        state.treasury_balance,
        state.counterparty_balance,
    )
}

proptest! {
    /// After minting M onto S and burning floor(M/2), the ledger-agreed
    /// supply is (S + M) − floor(M/2).
    #[test]
    fn supply_tracks_mint_and_burn(
        initial_supply in 0u64..1_000_000,
        mint in 0u64..1_000_000,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (supply, _, _) = run_flow(initial_supply, mint).await;
            prop_assert_eq!(supply, initial_supply + mint - mint / 2);
            Ok(())
        })?;
    }

    /// The transfer conserves tokens: the two balances always sum to the
    /// total supply, and the counterparty receives exactly floor(M/2).
    #[test]
    fn transfer_conserves_supply(
        initial_supply in 0u64..1_000_000,
        mint in 0u64..1_000_000,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (supply, treasury, counterparty) = run_flow(initial_supply, mint).await;
            prop_assert_eq!(counterparty, mint / 2);
            prop_assert_eq!(treasury + counterparty, supply);
            Ok(())
        })?;
    }
}
