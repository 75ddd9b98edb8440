//! End-to-end tests for the issuance workflow against the in-memory ledger.

use std::sync::Arc;

use async_trait::async_trait;
use issuance_executor::{ExecutorError, TransactionExecutor};
use issuance_gateway::{GatewayError, InMemoryLedger, LedgerGateway};
use issuance_identity::{Identity, SignerRegistry};
use issuance_operation::SignedOperation;
use issuance_types::{
    AccountBalance, AccountId, KeyRole, NetworkContext, Receipt, ReceiptStatus, TokenId, TokenInfo,
};
use issuance_workflow::{
    AssociationStrategy, IssuanceWorkflow, WorkflowConfig, WorkflowError, WorkflowStage,
};

struct Fixture {
    ledger: Arc<InMemoryLedger>,
    registry: Arc<SignerRegistry>,
    ctx: NetworkContext,
    treasury: AccountId,
}

fn fixture() -> Fixture {
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

    Fixture {
        ledger,
        registry,
        ctx: NetworkContext::new("local", operator_account),
        treasury,
    }
}

impl Fixture {
    fn workflow(&self, config: WorkflowConfig) -> IssuanceWorkflow<InMemoryLedger> {
        let executor =
            TransactionExecutor::new(Arc::clone(&self.ledger), Arc::clone(&self.registry));
        IssuanceWorkflow::new(executor, self.ctx.clone(), config)
    }
}

#[tokio::test]
async fn showcase_scenario_reaches_done_with_expected_figures() {
    // Supply 1000, mint 1000 (→ 2000), burn 500 (→ 1500), transfer 500.
    let fx = fixture();
    let mut workflow = fx.workflow(WorkflowConfig::new(fx.treasury).with_supply(1000, 1000));
    workflow.run().await.unwrap();

    let state = workflow.state();
    assert_eq!(state.stage, WorkflowStage::Done);
    assert_eq!(state.expected_supply, 1500);
    assert_eq!(state.treasury_balance, 1000);
    assert_eq!(state.counterparty_balance, 500);
    assert_eq!(
        state.completed_steps,
        vec![
            "create-account",
            "create-token",
            "deploy-contract",
            "delegate-supply",
            "mint",
            "burn",
            "associate",
            "approve-allowance",
            "transfer",
        ]
    );

    // The ledger agrees with the predicted figures.
    let token = state.token.unwrap();
    let info = fx.ledger.token_info(&token).await.unwrap();
    assert_eq!(info.total_supply, 1500);
    let treasury = fx.ledger.account_balance(&fx.treasury).await.unwrap();
    assert_eq!(treasury.token_balance(&token), 1000);
    let counterparty = fx
        .ledger
        .account_balance(&state.counterparty_account.unwrap())
        .await
        .unwrap();
    assert_eq!(counterparty.token_balance(&token), 500);
}

#[tokio::test]
async fn zero_mint_drives_zero_burn_and_zero_transfer() {
    // T = 0 boundary: every derived amount floors to zero and the run
    // still completes with supply untouched.
    let fx = fixture();
    let mut workflow = fx.workflow(WorkflowConfig::new(fx.treasury).with_supply(1000, 0));
    workflow.run().await.unwrap();

    let state = workflow.state();
    assert_eq!(state.stage, WorkflowStage::Done);
    assert_eq!(state.expected_supply, 1000);
    assert_eq!(state.treasury_balance, 1000);
    assert_eq!(state.counterparty_balance, 0);
}

#[tokio::test]
async fn transfer_of_the_full_treasury_balance_empties_it() {
    // With no initial supply the post-burn treasury holds exactly the
    // transfer amount.
    let fx = fixture();
    let mut workflow = fx.workflow(WorkflowConfig::new(fx.treasury).with_supply(0, 1000));
    workflow.run().await.unwrap();

    let state = workflow.state();
    assert_eq!(state.stage, WorkflowStage::Done);
    assert_eq!(state.expected_supply, 500);
    assert_eq!(state.treasury_balance, 0);
    assert_eq!(state.counterparty_balance, 500);
}

#[tokio::test]
async fn both_association_strategies_reach_the_same_figures() {
    let mut outcomes = Vec::new();
    for strategy in [AssociationStrategy::Direct, AssociationStrategy::ViaContract] {
        let fx = fixture();
        let mut workflow = fx.workflow(
            WorkflowConfig::new(fx.treasury)
                .with_supply(1000, 1000)
                .with_association(strategy),
        );
        workflow.run().await.unwrap();
        let state = workflow.state();
        assert_eq!(state.stage, WorkflowStage::Done);
        outcomes.push((
            state.expected_supply,
            state.treasury_balance,
            state.counterparty_balance,
        ));
    }
    assert_eq!(outcomes[0], outcomes[1]);
}

#[tokio::test]
async fn independent_runs_yield_identical_figures() {
    // Determinism of the arithmetic: ledger-assigned identifiers may
    // differ, the numbers may not.
    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let fx = fixture();
        let mut workflow = fx.workflow(WorkflowConfig::new(fx.treasury).with_supply(1000, 777));
        workflow.run().await.unwrap();
        let state = workflow.state();
        snapshots.push((
            state.expected_supply,
            state.treasury_balance,
            state.counterparty_balance,
        ));
    }
    assert_eq!(snapshots[0], snapshots[1]);
}

#[tokio::test]
async fn rejection_preserves_state_from_completed_steps() {
    // An unknown treasury account rejects step 2; step 1's output must
    // survive untouched.
    let fx = fixture();
    let mut workflow = fx.workflow(WorkflowConfig::new(AccountId::new(9999)));

    let err = workflow.run().await.unwrap_err();
    match &err {
        WorkflowError::Step { step, source } => {
            assert_eq!(*step, "create-token");
            assert!(matches!(
                source,
                ExecutorError::LedgerRejection {
                    status: ReceiptStatus::InvalidAccountId,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let state = workflow.state();
    assert_eq!(state.stage, WorkflowStage::Failed);
    assert_eq!(state.completed_steps, vec!["create-account"]);
    assert!(state.counterparty_account.is_some());
    assert_eq!(state.token, None);
    assert_eq!(state.contract, None);
    let failure = state.failure.as_ref().unwrap();
    assert_eq!(failure.step, "create-token");
}

#[tokio::test]
async fn builder_rejection_never_reaches_the_gateway() {
    let fx = fixture();
    let mut config = WorkflowConfig::new(fx.treasury);
    config.token_name = String::new();
    let mut workflow = fx.workflow(config);

    let err = workflow.run().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Build { step: "create-token", .. }));
    // Only the account creation before it was ever submitted.
    assert_eq!(fx.ledger.submission_count(), 1);
}

#[tokio::test]
async fn missing_treasury_signer_halts_before_submission() {
    let registry = Arc::new(SignerRegistry::new());
    let operator = registry
        .register(Identity::generate(KeyRole::Operator))
        .unwrap();
    // Treasury key known to the ledger but never registered for signing.
    let treasury_identity = Identity::generate(KeyRole::Treasury);

    let ledger = Arc::new(InMemoryLedger::new());
    let operator_account = ledger
        .register_account(operator.verifying_key(), 100_000)
        .unwrap();
    let treasury = ledger
        .register_account(treasury_identity.verifying_key(), 100_000)
        .unwrap();

    let executor = TransactionExecutor::new(Arc::clone(&ledger), registry);
    let mut workflow = IssuanceWorkflow::new(
        executor,
        NetworkContext::new("local", operator_account),
        WorkflowConfig::new(treasury),
    );

    let err = workflow.run().await.unwrap_err();
    match err {
        WorkflowError::Step { step, source } => {
            assert_eq!(step, "create-token");
            assert!(matches!(source, ExecutorError::MissingSigner(KeyRole::Treasury)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ledger.submission_count(), 1);
}

#[tokio::test]
async fn cancellation_stops_at_the_next_step_boundary() {
    let fx = fixture();
    let mut workflow = fx.workflow(WorkflowConfig::new(fx.treasury));
    workflow.cancel_flag().store(true, std::sync::atomic::Ordering::SeqCst);

    let err = workflow.run().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Cancelled { step: "create-account" }));
    assert_eq!(fx.ledger.submission_count(), 0);
}

/// Delegates to the in-memory ledger but misreports total supply.
struct SkewedSupplyGateway {
    inner: Arc<InMemoryLedger>,
}

#[async_trait]
impl LedgerGateway for SkewedSupplyGateway {
    async fn submit(&self, operation: SignedOperation) -> Result<Receipt, GatewayError> {
        self.inner.submit(operation).await
    }

    async fn token_info(&self, token: &TokenId) -> Result<TokenInfo, GatewayError> {
        let mut info = self.inner.token_info(token).await?;
        info.total_supply += 1;
        Ok(info)
    }

    async fn account_balance(&self, account: &AccountId) -> Result<AccountBalance, GatewayError> {
        self.inner.account_balance(account).await
    }
}

#[tokio::test]
async fn disagreeing_post_condition_read_is_a_consistency_error() {
    let fx = fixture();
    let gateway = Arc::new(SkewedSupplyGateway {
        inner: Arc::clone(&fx.ledger),
    });
    let executor = TransactionExecutor::new(gateway, Arc::clone(&fx.registry));
    let mut workflow = IssuanceWorkflow::new(
        executor,
        fx.ctx.clone(),
        WorkflowConfig::new(fx.treasury),
    );

    let err = workflow.run().await.unwrap_err();
    match err {
        WorkflowError::Consistency {
            step,
            what,
            expected,
            actual,
        } => {
            assert_eq!(step, "create-token");
            assert_eq!(what, "total supply");
            assert_eq!(expected, 1000);
            assert_eq!(actual, 1001);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(workflow.state().stage, WorkflowStage::Failed);
}
