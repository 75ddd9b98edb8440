//! The issuance state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use issuance_executor::TransactionExecutor;
use issuance_gateway::LedgerGateway;
use issuance_identity::Identity;
use issuance_operation::{
    AccountCreateBuilder, AllowanceApproveBuilder, ContractArg, ContractDeployBuilder,
    ContractInvokeBuilder, OperationRequest, SupplyKeyUpdateBuilder, TokenAssociateBuilder,
    TokenCreateBuilder, ValidationError,
};
use issuance_types::{AccountId, ContractId, KeyRole, NetworkContext, Receipt, TokenId};

use crate::config::{AssociationStrategy, WorkflowConfig};
use crate::sink::{StepSink, TracingSink};
use crate::state::{StepFailure, WorkflowStage, WorkflowState};
use crate::WorkflowError;

/// Runs the issuance sequence against one network context.
///
/// Steps execute strictly one at a time: each step's confirmed output is
/// an input to a later step, so there is nothing to parallelize. The
/// orchestrator owns its [`WorkflowState`] exclusively; no locking.
pub struct IssuanceWorkflow<G> {
    executor: TransactionExecutor<G>,
    ctx: NetworkContext,
    config: WorkflowConfig,
    state: WorkflowState,
    sink: Arc<dyn StepSink>,
    cancel: Arc<AtomicBool>,
}

impl<G: LedgerGateway> IssuanceWorkflow<G> {
    pub fn new(executor: TransactionExecutor<G>, ctx: NetworkContext, config: WorkflowConfig) -> Self {
        let executor = executor.with_confirmation_timeout(config.confirmation_timeout);
        Self {
            executor,
            ctx,
            config,
            state: WorkflowState::new(),
            sink: Arc::new(TracingSink),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StepSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Flag checked between steps; setting it cancels the run at the next
    /// step boundary. A submitted operation is never abandoned mid-step.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The run's accumulated state, preserved across failure.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Run the full sequence to `Done`, or halt at the first failure.
    ///
    /// On failure the state keeps everything confirmed so far, records the
    /// failing step, and moves the stage to `Failed`. Nothing is retried
    /// and nothing is rolled back: receipts are final, and re-submitting a
    /// confirmed operation is not idempotent on the ledger.
    pub async fn run(&mut self) -> Result<(), WorkflowError> {
        let result = self.run_steps().await;
        if let Err(err) = &result {
            self.state.stage = WorkflowStage::Failed;
            self.state.failure = Some(StepFailure {
                step: err.step().to_string(),
                error: err.to_string(),
            });
            tracing::error!(step = err.step(), error = %err, "workflow halted");
        }
        result
    }

    async fn run_steps(&mut self) -> Result<(), WorkflowError> {
        let counterparty = self.create_counterparty().await?;
        let token = self.create_token().await?;
        let contract = self.deploy_contract(token).await?;
        self.delegate_supply(token, contract).await?;
        self.mint(token, contract).await?;
        self.burn(token, contract).await?;
        self.associate(counterparty, token, contract).await?;
        self.approve_allowance(token, contract).await?;
        self.transfer(counterparty, token, contract).await?;

        self.state.stage = WorkflowStage::Done;
        tracing::info!(
            token = %token,
            supply = self.state.expected_supply,
            "issuance workflow completed"
        );
        Ok(())
    }

    // ── Steps ────────────────────────────────────────────────────────

    async fn create_counterparty(&mut self) -> Result<AccountId, WorkflowError> {
        const STEP: &str = "create-account";
        let registry = self.executor.registry();
        if !registry.contains(&KeyRole::Counterparty) {
            let identity = Identity::generate(KeyRole::Counterparty);
            registry
                .register(identity)
                .map_err(|err| WorkflowError::Step {
                    step: STEP,
                    source: err.into(),
                })?;
        }
        let public_key = registry
            .resolve(&KeyRole::Counterparty)
            .map_err(|err| WorkflowError::Step {
                step: STEP,
                source: err.into(),
            })?
            .public_key_hex();

        let receipt = self
            .submit(
                STEP,
                "Creating counterparty account with a starting balance...",
                AccountCreateBuilder::new()
                    .initial_balance(self.config.counterparty_initial_balance)
                    .public_key(public_key)
                    .build(),
            )
            .await?;
        let account = receipt.account_id.ok_or(WorkflowError::MissingReceiptOutput {
            step: STEP,
            what: "account id",
        })?;

        self.state.counterparty_account = Some(account);
        self.state.advance(STEP, WorkflowStage::AccountsReady);
        Ok(account)
    }

    async fn create_token(&mut self) -> Result<TokenId, WorkflowError> {
        const STEP: &str = "create-token";
        let receipt = self
            .submit(
                STEP,
                "Creating a new fungible token...",
                TokenCreateBuilder::new()
                    .name(self.config.token_name.clone())
                    .symbol(self.config.token_symbol.clone())
                    .decimals(self.config.decimals)
                    .initial_supply(self.config.initial_supply)
                    .treasury(self.config.treasury_account)
                    .build(),
            )
            .await?;
        let token = receipt.token_id.ok_or(WorkflowError::MissingReceiptOutput {
            step: STEP,
            what: "token id",
        })?;

        self.expect_supply(STEP, token, self.config.initial_supply)
            .await?;
        self.state.token = Some(token);
        self.state.expected_supply = self.config.initial_supply;
        self.state.treasury_balance = self.config.initial_supply;
        self.state.advance(STEP, WorkflowStage::TokenCreated);
        Ok(token)
    }

    async fn deploy_contract(&mut self, token: TokenId) -> Result<ContractId, WorkflowError> {
        const STEP: &str = "deploy-contract";
        let receipt = self
            .submit(
                STEP,
                "Deploying the supply-manager contract...",
                ContractDeployBuilder::new()
                    .bytecode(self.config.bytecode.clone())
                    .gas_limit(self.config.gas_limit)
                    .constructor_arg(ContractArg::Address(token.to_evm_address()))
                    .build(),
            )
            .await?;
        let contract = receipt
            .contract_id
            .ok_or(WorkflowError::MissingReceiptOutput {
                step: STEP,
                what: "contract id",
            })?;

        self.state.contract = Some(contract);
        self.state.advance(STEP, WorkflowStage::ContractDeployed);
        Ok(contract)
    }

    async fn delegate_supply(
        &mut self,
        token: TokenId,
        contract: ContractId,
    ) -> Result<(), WorkflowError> {
        const STEP: &str = "delegate-supply";
        self.submit(
            STEP,
            "Transferring supply control to the contract...",
            SupplyKeyUpdateBuilder::new()
                .token(token)
                .contract_authority(contract)
                .build(),
        )
        .await?;
        self.state.advance(STEP, WorkflowStage::SupplyDelegated);
        Ok(())
    }

    async fn mint(&mut self, token: TokenId, contract: ContractId) -> Result<(), WorkflowError> {
        const STEP: &str = "mint";
        let amount = self.config.mint_amount;
        self.submit(
            STEP,
            "Minting new tokens via the contract...",
            self.invoke_amount(contract, "mintToken", amount),
        )
        .await?;

        let predicted = self.state.expected_supply + amount;
        self.expect_supply(STEP, token, predicted).await?;
        self.state.expected_supply = predicted;
        self.state.treasury_balance += amount;
        self.state.advance(STEP, WorkflowStage::Minted);
        Ok(())
    }

    async fn burn(&mut self, token: TokenId, contract: ContractId) -> Result<(), WorkflowError> {
        const STEP: &str = "burn";
        let amount = self.config.burn_amount();
        self.submit(
            STEP,
            "Burning tokens via the contract...",
            self.invoke_amount(contract, "burnToken", amount),
        )
        .await?;

        let predicted = self.state.expected_supply - amount;
        self.expect_supply(STEP, token, predicted).await?;
        self.state.expected_supply = predicted;
        self.state.treasury_balance -= amount;
        self.state.advance(STEP, WorkflowStage::Burned);
        Ok(())
    }

    async fn associate(
        &mut self,
        counterparty: AccountId,
        token: TokenId,
        contract: ContractId,
    ) -> Result<(), WorkflowError> {
        const STEP: &str = "associate";
        let builder = TokenAssociateBuilder::new()
            .account(counterparty)
            .token(token)
            .holder_role(KeyRole::Counterparty);
        let builder = match self.config.association {
            AssociationStrategy::Direct => builder.direct(),
            AssociationStrategy::ViaContract => {
                builder.via_contract(contract, self.config.gas_limit)
            }
        };
        self.submit(
            STEP,
            "Associating the counterparty account with the token...",
            builder.build(),
        )
        .await?;
        self.state.advance(STEP, WorkflowStage::Associated);
        Ok(())
    }

    async fn approve_allowance(
        &mut self,
        token: TokenId,
        contract: ContractId,
    ) -> Result<(), WorkflowError> {
        const STEP: &str = "approve-allowance";
        self.submit(
            STEP,
            "Approving an allowance so the contract can move treasury tokens...",
            AllowanceApproveBuilder::new()
                .token(token)
                .owner(self.config.treasury_account)
                .contract_spender(contract)
                .amount(self.config.transfer_amount())
                .build(),
        )
        .await?;
        self.state.advance(STEP, WorkflowStage::AllowanceGranted);
        Ok(())
    }

    async fn transfer(
        &mut self,
        counterparty: AccountId,
        token: TokenId,
        contract: ContractId,
    ) -> Result<(), WorkflowError> {
        const STEP: &str = "transfer";
        let amount = self.config.transfer_amount();
        let request = ContractInvokeBuilder::new()
            .contract(contract)
            .gas_limit(self.config.gas_limit)
            .function("transferToken")
            .arg(ContractArg::Address(
                self.config.treasury_account.to_evm_address(),
            ))
            .arg(ContractArg::Address(counterparty.to_evm_address()))
            .amount_arg(amount)
            .map(|b| b.authorizer(KeyRole::Treasury))
            .and_then(|b| b.build());
        self.submit(
            STEP,
            "Transferring tokens from treasury to counterparty...",
            request,
        )
        .await?;

        // Conservation: both balances move by exactly the amount and the
        // supply stays put.
        let predicted_treasury = self.state.treasury_balance - amount;
        let predicted_counterparty = self.state.counterparty_balance + amount;
        self.expect_balance(
            STEP,
            "treasury balance",
            self.config.treasury_account,
            token,
            predicted_treasury,
        )
        .await?;
        self.expect_balance(
            STEP,
            "counterparty balance",
            counterparty,
            token,
            predicted_counterparty,
        )
        .await?;
        self.expect_supply(STEP, token, self.state.expected_supply)
            .await?;

        self.state.treasury_balance = predicted_treasury;
        self.state.counterparty_balance = predicted_counterparty;
        self.sink.balance_observed("treasury", predicted_treasury);
        self.sink
            .balance_observed("counterparty", predicted_counterparty);
        self.state.advance(STEP, WorkflowStage::Transferred);
        Ok(())
    }

    // ── Step plumbing ────────────────────────────────────────────────

    fn invoke_amount(
        &self,
        contract: ContractId,
        function: &str,
        amount: u64,
    ) -> Result<OperationRequest, ValidationError> {
        ContractInvokeBuilder::new()
            .contract(contract)
            .gas_limit(self.config.gas_limit)
            .function(function)
            .amount_arg(amount)?
            .build()
    }

    /// Execute one built step: cancellation checkpoint, submission,
    /// terminal receipt.
    async fn submit(
        &mut self,
        step: &'static str,
        description: &str,
        request: Result<OperationRequest, ValidationError>,
    ) -> Result<Receipt, WorkflowError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(WorkflowError::Cancelled { step });
        }
        let request = request.map_err(|source| WorkflowError::Build { step, source })?;

        self.sink.step_started(step, description);
        let started = Instant::now();
        let receipt = self
            .executor
            .execute(request, &self.ctx)
            .await
            .map_err(|source| WorkflowError::Step { step, source })?;
        self.sink.step_confirmed(step, &receipt, started.elapsed());
        Ok(receipt)
    }

    async fn expect_supply(
        &self,
        step: &'static str,
        token: TokenId,
        predicted: u64,
    ) -> Result<(), WorkflowError> {
        let actual = self
            .executor
            .token_supply(&token)
            .await
            .map_err(|source| WorkflowError::Step { step, source })?;
        self.sink.supply_observed(actual);
        if actual != predicted {
            return Err(WorkflowError::Consistency {
                step,
                what: "total supply",
                expected: predicted,
                actual,
            });
        }
        Ok(())
    }

    async fn expect_balance(
        &self,
        step: &'static str,
        what: &'static str,
        account: AccountId,
        token: TokenId,
        predicted: u64,
    ) -> Result<(), WorkflowError> {
        let actual = self
            .executor
            .account_balance(&account)
            .await
            .map_err(|source| WorkflowError::Step { step, source })?
            .token_balance(&token);
        if actual != predicted {
            return Err(WorkflowError::Consistency {
                step,
                what,
                expected: predicted,
                actual,
            });
        }
        Ok(())
    }
}
