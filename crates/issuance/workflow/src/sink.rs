//! Progress reporting seam.
//!
//! The orchestrator pushes step descriptions, confirmed receipts, and
//! observed aggregates into a [`StepSink`]; how they are rendered is the
//! caller's business. Formatting stays out of the core.

use issuance_types::Receipt;
use std::time::Duration;

/// Observer for workflow progress.
pub trait StepSink: Send + Sync {
    /// A step is about to execute.
    fn step_started(&self, step: &str, description: &str) {
        let _ = (step, description);
    }

    /// A step's receipt confirmed, with the measured round-trip time.
    fn step_confirmed(&self, step: &str, receipt: &Receipt, elapsed: Duration) {
        let _ = (step, receipt, elapsed);
    }

    /// A post-condition supply read.
    fn supply_observed(&self, supply: u64) {
        let _ = supply;
    }

    /// A final or post-condition balance read.
    fn balance_observed(&self, party: &str, amount: u64) {
        let _ = (party, amount);
    }
}

/// Discards everything.
#[derive(Default)]
pub struct NullSink;

impl StepSink for NullSink {}

/// Reports progress through structured tracing events.
#[derive(Default)]
pub struct TracingSink;

impl StepSink for TracingSink {
    fn step_started(&self, step: &str, description: &str) {
        tracing::info!(step, "{}", description);
    }

    fn step_confirmed(&self, step: &str, receipt: &Receipt, elapsed: Duration) {
        tracing::info!(
            step,
            status = %receipt.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "step confirmed"
        );
    }

    fn supply_observed(&self, supply: u64) {
        tracing::info!(supply, "token supply");
    }

    fn balance_observed(&self, party: &str, amount: u64) {
        tracing::info!(party, amount, "token balance");
    }
}
