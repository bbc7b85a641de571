//! Stake lifecycle types
//!
//! A stake is money placed on one side of a market. Funds leave the account
//! at placement; matching only moves the stake between `Pending` and
//! `Matched`, and resolution decides how much comes back.

use crate::errors::StakeError;
use crate::ids::{AccountId, MarketId, StakeId};
use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two opposing outcomes a stake can back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Green,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Red => Side::Green,
            Side::Green => Side::Red,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Green => write!(f, "green"),
        }
    }
}

/// Stake status
///
/// `Pending -> {Matched, Refunded}`, `Matched -> {Won, Lost, Refunded}`.
/// `Won`, `Lost` and `Refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeStatus {
    Pending,
    Matched,
    Won,
    Lost,
    Refunded,
}

impl StakeStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, StakeStatus::Won | StakeStatus::Lost | StakeStatus::Refunded)
    }

    pub fn can_transition_to(&self, next: StakeStatus) -> bool {
        matches!(
            (self, next),
            (StakeStatus::Pending, StakeStatus::Matched)
                | (StakeStatus::Pending, StakeStatus::Refunded)
                | (StakeStatus::Matched, StakeStatus::Won)
                | (StakeStatus::Matched, StakeStatus::Lost)
                | (StakeStatus::Matched, StakeStatus::Refunded)
        )
    }
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StakeStatus::Pending => "pending",
            StakeStatus::Matched => "matched",
            StakeStatus::Won => "won",
            StakeStatus::Lost => "lost",
            StakeStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

/// One matched pairing as seen from one side's stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub counterpart: StakeId,
    pub amount: Amount,
    pub timestamp: i64, // Unix nanos
}

/// A placed wager on one side of a market
///
/// Invariant: `matched == sum(fills.amount)` and `matched <= amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stake {
    pub stake_id: StakeId,
    pub account_id: AccountId,
    pub market_id: MarketId,
    pub side: Side,
    pub amount: Amount,
    pub matched: Amount,
    pub status: StakeStatus,
    pub fills: Vec<Fill>,
    pub profit: Amount,
    pub residual_refunded: bool,
    pub placed_at: i64, // Unix nanos
    pub sequence: u64,  // Placement order within the store
    pub version: u64,   // Optimistic locking
}

impl Stake {
    /// Create a new pending stake
    pub fn new(
        account_id: AccountId,
        market_id: MarketId,
        side: Side,
        amount: Amount,
        sequence: u64,
        timestamp: i64,
    ) -> Self {
        Self {
            stake_id: StakeId::new(),
            account_id,
            market_id,
            side,
            amount,
            matched: Amount::ZERO,
            status: StakeStatus::Pending,
            fills: Vec::new(),
            profit: Amount::ZERO,
            residual_refunded: false,
            placed_at: timestamp,
            sequence,
            version: 0,
        }
    }

    /// Check fill invariant: matched = sum(fills) and matched <= amount
    pub fn check_invariant(&self) -> bool {
        match Amount::checked_sum(self.fills.iter().map(|f| f.amount)) {
            Ok(total) => total == self.matched && self.matched <= self.amount,
            Err(_) => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == StakeStatus::Pending
    }

    /// Portion of the stake that was never matched
    pub fn residual(&self) -> Amount {
        Amount::new(self.amount.as_u64().saturating_sub(self.matched.as_u64()))
    }

    /// Append a fill against a counterpart stake
    ///
    /// Fails without mutating if the fill would exceed the original amount.
    pub fn add_fill(&mut self, counterpart: StakeId, amount: Amount, timestamp: i64) -> Result<(), StakeError> {
        let new_matched = self.matched.checked_add(amount)?;
        if new_matched > self.amount {
            return Err(StakeError::OverFill {
                stake_id: self.stake_id.to_string(),
                matched: new_matched.as_u64(),
                amount: self.amount.as_u64(),
            });
        }
        self.fills.push(Fill {
            counterpart,
            amount,
            timestamp,
        });
        self.matched = new_matched;
        Ok(())
    }

    /// Move to a new status, enforcing the lifecycle state machine
    pub fn transition(&mut self, next: StakeStatus) -> Result<(), StakeError> {
        if !self.status.can_transition_to(next) {
            return Err(StakeError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}
