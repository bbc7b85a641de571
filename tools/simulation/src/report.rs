//! Scenario report and JSON export

use serde::{Deserialize, Serialize};
use types::diagnostics::MatchingRunRecord;
use types::market::Outcome;
use types::money::Amount;

/// Outcome of one simulated market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub version: String,
    pub seed: u64,
    pub threads: usize,
    pub stakes_generated: usize,
    pub stakes_placed: usize,
    pub stakes_rejected: usize,
    pub matching: MatchingRunRecord,
    pub outcome: Outcome,
    pub total_paid: Amount,
    /// Sum of opening balances
    pub opening_total: u64,
    /// Sum of balances after resolution
    pub closing_total: u64,
    /// Matched amount forfeited by losing stakes
    pub forfeited: u64,
    /// Profit credited to winning stakes on top of their matched amount
    pub profit_paid: u64,
    pub elapsed_ms: u64,
}

impl ScenarioReport {
    /// Balances moved only by forfeits and winners' profit
    pub fn is_conserved(&self) -> bool {
        self.opening_total as i128 - self.forfeited as i128 + self.profit_paid as i128 == self.closing_total as i128
    }

    /// House result under fixed odds; negative when winners were paid more than losers forfeited
    pub fn platform_net(&self) -> i128 {
        self.forfeited as i128 - self.profit_paid as i128
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
    }
}
