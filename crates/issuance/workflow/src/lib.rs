//! Issuance workflow orchestration.
//!
//! The orchestrator runs the ordered issuance sequence — account, token,
//! contract, supply delegation, mint, burn, association, allowance,
//! transfer — advancing only on confirmed receipts and, where specified,
//! on post-condition reads matching the predicted ledger state.
//!
//! # Key principle
//!
//! **The orchestrator sequences and verifies, it never signs or submits
//! directly.** Each transition is exactly one executor call; the
//! accumulated [`WorkflowState`] is the single record of what the run has
//! produced and is preserved on failure for inspection.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use issuance_executor::TransactionExecutor;
//! use issuance_gateway::InMemoryLedger;
//! use issuance_identity::{Identity, SignerRegistry};
//! use issuance_types::{KeyRole, NetworkContext};
//! use issuance_workflow::{IssuanceWorkflow, WorkflowConfig, WorkflowStage};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let registry = Arc::new(SignerRegistry::new());
//! let operator = registry.register(Identity::generate(KeyRole::Operator)).unwrap();
//! let treasury = registry.register(Identity::generate(KeyRole::Treasury)).unwrap();
//!
//! let ledger = Arc::new(InMemoryLedger::new());
//! let operator_account = ledger.register_account(operator.verifying_key(), 10_000).unwrap();
//! let treasury_account = ledger.register_account(treasury.verifying_key(), 10_000).unwrap();
//!
//! let executor = TransactionExecutor::new(ledger, registry);
//! let ctx = NetworkContext::new("local", operator_account);
//! let config = WorkflowConfig::new(treasury_account);
//!
//! let mut workflow = IssuanceWorkflow::new(executor, ctx, config);
//! workflow.run().await.unwrap();
//! assert_eq!(workflow.state().stage, WorkflowStage::Done);
//! # });
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod orchestrator;
pub mod sink;
pub mod state;

use issuance_executor::ExecutorError;
use issuance_operation::ValidationError;
use thiserror::Error;

pub use config::{AssociationStrategy, WorkflowConfig};
pub use orchestrator::IssuanceWorkflow;
pub use sink::{NullSink, StepSink, TracingSink};
pub use state::{StepFailure, WorkflowStage, WorkflowState};

/// Errors that halt a workflow run.
///
/// Nothing here is retried and nothing is compensated: confirmed steps
/// stay confirmed, and the failing step is reported with the state the
/// run had accumulated.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A builder rejected the step's parameters before any network call.
    #[error("step {step} rejected before submission: {source}")]
    Build {
        step: &'static str,
        #[source]
        source: ValidationError,
    },

    /// The executor failed the step: missing signer, ledger rejection,
    /// gateway failure, or confirmation timeout.
    #[error("step {step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: ExecutorError,
    },

    /// A post-condition read disagrees with the predicted value after an
    /// otherwise-successful step. Either the model here is wrong or
    /// something else mutated the ledger.
    #[error("step {step}: {what} expected {expected}, ledger reports {actual}")]
    Consistency {
        step: &'static str,
        what: &'static str,
        expected: u64,
        actual: u64,
    },

    /// A success receipt arrived without the creation output its kind
    /// promises.
    #[error("receipt for step {step} is missing its {what}")]
    MissingReceiptOutput {
        step: &'static str,
        what: &'static str,
    },

    /// Cooperative cancellation observed between steps.
    #[error("workflow cancelled before step {step}")]
    Cancelled { step: &'static str },
}

impl WorkflowError {
    /// The step the error halted the run at.
    pub fn step(&self) -> &'static str {
        match self {
            WorkflowError::Build { step, .. }
            | WorkflowError::Step { step, .. }
            | WorkflowError::Consistency { step, .. }
            | WorkflowError::MissingReceiptOutput { step, .. }
            | WorkflowError::Cancelled { step } => step,
        }
    }
}
