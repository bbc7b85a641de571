//! Market status and outcome types

use crate::ids::MarketId;
use crate::stake::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market status
///
/// `Open -> Closed -> Matched -> Resolved`. Entering `Closed` is the single
/// trigger for a matching run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    /// Accepting stakes
    Open,
    /// Closed for matching; a matching run is due or in flight
    Closed,
    /// Matching run committed; awaiting outcome
    Matched,
    /// Outcome applied (terminal)
    Resolved,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketStatus::Open => "open",
            MarketStatus::Closed => "closed",
            MarketStatus::Matched => "matched",
            MarketStatus::Resolved => "resolved",
        };
        f.write_str(s)
    }
}

/// Declared result of a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Red,
    Green,
    /// Draw or cancelled event; every matched stake is refunded
    Void,
}

impl Outcome {
    /// Winning side, or `None` for a void outcome
    pub fn winning_side(&self) -> Option<Side> {
        match self {
            Outcome::Red => Some(Side::Red),
            Outcome::Green => Some(Side::Green),
            Outcome::Void => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Red => "red",
            Outcome::Green => "green",
            Outcome::Void => "void",
        };
        f.write_str(s)
    }
}

/// Market record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub market_id: MarketId,
    pub status: MarketStatus,
    pub outcome: Option<Outcome>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
    pub version: u64,
}

impl Market {
    /// Create a new market accepting stakes
    pub fn new(timestamp: i64) -> Self {
        Self {
            market_id: MarketId::new(),
            status: MarketStatus::Open,
            outcome: None,
            created_at: timestamp,
            resolved_at: None,
            version: 0,
        }
    }

    pub fn is_accepting_stakes(&self) -> bool {
        self.status == MarketStatus::Open
    }

    /// Record the outcome; the outcome is set once and never changes
    pub fn resolve(&mut self, outcome: Outcome, timestamp: i64) -> bool {
        if self.outcome.is_some() || self.status == MarketStatus::Resolved {
            return false;
        }
        self.outcome = Some(outcome);
        self.status = MarketStatus::Resolved;
        self.resolved_at = Some(timestamp);
        true
    }
}
