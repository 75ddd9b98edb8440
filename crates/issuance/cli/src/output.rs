//! Console rendering of workflow progress.

use colored::Colorize;
use issuance_types::Receipt;
use issuance_workflow::StepSink;
use std::time::Duration;

/// Prints each step, its confirmation, and observed aggregates.
#[derive(Default)]
pub struct ConsoleSink;

impl StepSink for ConsoleSink {
    fn step_started(&self, _step: &str, description: &str) {
        println!("{}", description);
    }

    fn step_confirmed(&self, _step: &str, receipt: &Receipt, elapsed: Duration) {
        let status = receipt.status.to_string();
        println!("...{}! in {} ms\n", status.as_str().green(), elapsed.as_millis());
    }

    fn supply_observed(&self, supply: u64) {
        println!("Token supply: {}\n", supply);
    }

    fn balance_observed(&self, party: &str, amount: u64) {
        println!("{} balance: {}", party, amount);
    }
}
