//! Matching run diagnostics record
//!
//! Write-only summary of one matching run. Diagnostics sinks decide how to
//! store it; the engine never reads it back.

use crate::ids::MarketId;
use crate::money::Amount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRunRecord {
    pub market_id: MarketId,
    pub red_stakes: usize,
    pub green_stakes: usize,
    pub fills: usize,
    pub matched_stakes: usize,
    pub fully_refunded: usize,
    pub partially_refunded: usize,
    /// Stakes that left `Pending` between planning and applying
    pub dropped_stakes: usize,
    pub total_matched_red: Amount,
    pub total_matched_green: Amount,
    pub total_refunded: Amount,
    pub attempts: usize,
    pub duration_ms: u64,
    pub trace: Vec<String>,
}

impl MatchingRunRecord {
    pub fn new(market_id: MarketId) -> Self {
        Self {
            market_id,
            red_stakes: 0,
            green_stakes: 0,
            fills: 0,
            matched_stakes: 0,
            fully_refunded: 0,
            partially_refunded: 0,
            dropped_stakes: 0,
            total_matched_red: Amount::ZERO,
            total_matched_green: Amount::ZERO,
            total_refunded: Amount::ZERO,
            attempts: 0,
            duration_ms: 0,
            trace: Vec::new(),
        }
    }

    pub fn trace(&mut self, line: impl Into<String>) {
        self.trace.push(line.into());
    }

    /// Matching never creates exposure on one side only
    pub fn is_balanced(&self) -> bool {
        self.total_matched_red == self.total_matched_green
    }
}
