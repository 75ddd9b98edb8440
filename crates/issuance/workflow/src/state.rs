//! Workflow stages and the accumulating run state.

use issuance_types::{AccountId, ContractId, TokenId};
use serde::{Deserialize, Serialize};

/// Position of a run in the issuance sequence.
///
/// Stages advance strictly forward; `Failed` is reachable from any of
/// them and is terminal alongside `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStage {
    Start,
    AccountsReady,
    TokenCreated,
    ContractDeployed,
    SupplyDelegated,
    Minted,
    Burned,
    Associated,
    AllowanceGranted,
    Transferred,
    Done,
    Failed,
}

impl WorkflowStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStage::Done | WorkflowStage::Failed)
    }
}

/// Why and where a run halted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: String,
    pub error: String,
}

/// The orchestrator's record of identifiers and quantities produced by
/// completed steps.
///
/// Grows monotonically: a confirmed value is never rolled back, including
/// on failure. The failed run's state is what diagnostics inspect.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    pub stage: WorkflowStage,
    pub counterparty_account: Option<AccountId>,
    pub token: Option<TokenId>,
    pub contract: Option<ContractId>,
    /// Total supply the ledger is expected to report.
    pub expected_supply: u64,
    /// Token balance the treasury is expected to hold.
    pub treasury_balance: u64,
    /// Token balance the counterparty is expected to hold.
    pub counterparty_balance: u64,
    pub completed_steps: Vec<String>,
    pub failure: Option<StepFailure>,
}

impl Default for WorkflowStage {
    fn default() -> Self {
        WorkflowStage::Start
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed step and the stage it advanced the run to.
    pub fn advance(&mut self, step: &str, stage: WorkflowStage) {
        self.completed_steps.push(step.to_string());
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_appends_and_moves_the_stage() {
        let mut state = WorkflowState::new();
        assert_eq!(state.stage, WorkflowStage::Start);

        state.advance("create-account", WorkflowStage::AccountsReady);
        assert_eq!(state.stage, WorkflowStage::AccountsReady);
        assert_eq!(state.completed_steps, vec!["create-account".to_string()]);
        assert!(!state.stage.is_terminal());
    }

    #[test]
    fn state_serializes_for_diagnostics() {
        let mut state = WorkflowState::new();
        state.token = Some(TokenId::new(2001));
        state.expected_supply = 1500;
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"expected_supply\":1500"));
    }
}
