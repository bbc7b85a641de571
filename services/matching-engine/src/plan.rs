//! Planner input and output structures

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use types::errors::AmountError;
use types::ids::StakeId;
use types::money::Amount;
use types::stake::{Side, Stake};

/// One pending stake as seen by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerInput {
    pub stake_id: StakeId,
    pub side: Side,
    pub amount: Amount,
}

impl PlannerInput {
    pub fn new(stake_id: StakeId, side: Side, amount: Amount) -> Self {
        Self {
            stake_id,
            side,
            amount,
        }
    }
}

impl From<&Stake> for PlannerInput {
    fn from(stake: &Stake) -> Self {
        Self::new(stake.stake_id, stake.side, stake.amount)
    }
}

/// Matched pairing between a red and a green stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedFill {
    pub red: StakeId,
    pub green: StakeId,
    pub amount: Amount,
}

impl PlannedFill {
    pub fn involves(&self, stake_id: &StakeId) -> bool {
        &self.red == stake_id || &self.green == stake_id
    }

    /// The other stake of the pairing, if `stake_id` is part of it
    pub fn counterpart_of(&self, stake_id: &StakeId) -> Option<StakeId> {
        if &self.red == stake_id {
            Some(self.green)
        } else if &self.green == stake_id {
            Some(self.red)
        } else {
            None
        }
    }
}

/// Per-stake disposition: how much was matched and what is left to refund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Residual {
    pub stake_id: StakeId,
    pub side: Side,
    pub original: Amount,
    pub matched: Amount,
    pub residual: Amount,
}

impl Residual {
    pub fn is_fully_residual(&self) -> bool {
        self.matched.is_zero()
    }

    pub fn is_partial(&self) -> bool {
        !self.matched.is_zero() && !self.residual.is_zero()
    }
}

/// Fills emitted by each pass, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub exact: usize,
    pub green_anchored: usize,
    pub red_anchored: usize,
}

/// Result of one planning run
///
/// `fills` are in emission order; `residuals` follow the order the stakes
/// were supplied to the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPlan {
    pub fills: Vec<PlannedFill>,
    pub residuals: Vec<Residual>,
    pub passes: PassSummary,
}

impl MatchingPlan {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    pub fn total_red(&self) -> Result<Amount, AmountError> {
        self.total_matched(Side::Red)
    }

    pub fn total_green(&self) -> Result<Amount, AmountError> {
        self.total_matched(Side::Green)
    }

    fn total_matched(&self, side: Side) -> Result<Amount, AmountError> {
        Amount::checked_sum(self.residuals.iter().filter(|r| r.side == side).map(|r| r.matched))
    }

    /// Both sides carry the same committed exposure
    pub fn is_balanced(&self) -> Result<bool, AmountError> {
        Ok(self.total_red()? == self.total_green()?)
    }

    /// Sum of everything scheduled for refund
    pub fn total_residual(&self) -> Result<Amount, AmountError> {
        Amount::checked_sum(self.residuals.iter().map(|r| r.residual))
    }

    pub fn fills_for<'a>(&'a self, stake_id: &'a StakeId) -> impl Iterator<Item = &'a PlannedFill> + 'a {
        self.fills.iter().filter(move |f| f.involves(stake_id))
    }

    pub fn residual_for(&self, stake_id: &StakeId) -> Option<&Residual> {
        self.residuals.iter().find(|r| &r.stake_id == stake_id)
    }

    /// Every stake id the plan touches, in supply order
    pub fn stake_ids(&self) -> impl Iterator<Item = StakeId> + '_ {
        self.residuals.iter().map(|r| r.stake_id)
    }

    /// Remove stakes from the plan
    ///
    /// Every fill touching a dropped stake is discarded and the counterpart's
    /// freed amount becomes residual. Dropped stakes get no residual entry.
    pub fn without_stakes(&self, dropped: &HashSet<StakeId>) -> MatchingPlan {
        if dropped.is_empty() {
            return self.clone();
        }

        let fills: Vec<PlannedFill> = self
            .fills
            .iter()
            .filter(|f| !dropped.contains(&f.red) && !dropped.contains(&f.green))
            .copied()
            .collect();

        let residuals = self
            .residuals
            .iter()
            .filter(|r| !dropped.contains(&r.stake_id))
            .map(|r| {
                let matched = fills
                    .iter()
                    .filter(|f| f.involves(&r.stake_id))
                    .fold(0u64, |acc, f| acc.saturating_add(f.amount.as_u64()));
                Residual {
                    matched: Amount::new(matched),
                    residual: Amount::new(r.original.as_u64().saturating_sub(matched)),
                    ..*r
                }
            })
            .collect();

        MatchingPlan {
            fills,
            residuals,
            passes: self.passes,
        }
    }
}

/// Planner input errors
///
/// Both indicate a defect in the caller's query, not a market condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Stake {stake_id} has zero amount")]
    ZeroAmount { stake_id: String },

    #[error("Stake {stake_id} supplied more than once")]
    DuplicateStake { stake_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(stake_id: StakeId, side: Side, original: u64, matched: u64) -> Residual {
        Residual {
            stake_id,
            side,
            original: Amount::new(original),
            matched: Amount::new(matched),
            residual: Amount::new(original - matched),
        }
    }

    #[test]
    fn test_without_stakes_frees_counterparts() {
        let (r1, g1, g2) = (StakeId::new(), StakeId::new(), StakeId::new());
        let plan = MatchingPlan {
            fills: vec![
                PlannedFill { red: r1, green: g1, amount: Amount::new(60) },
                PlannedFill { red: r1, green: g2, amount: Amount::new(40) },
            ],
            residuals: vec![
                residual(r1, Side::Red, 100, 100),
                residual(g1, Side::Green, 60, 60),
                residual(g2, Side::Green, 50, 40),
            ],
            passes: PassSummary::default(),
        };

        let reduced = plan.without_stakes(&HashSet::from([g1]));

        assert_eq!(reduced.fills.len(), 1);
        assert!(reduced.residual_for(&g1).is_none());
        let red = reduced.residual_for(&r1).unwrap();
        assert_eq!(red.matched, Amount::new(40));
        assert_eq!(red.residual, Amount::new(60));
        assert!(red.is_partial());
        assert_eq!(reduced.residual_for(&g2).unwrap().residual, Amount::new(10));
        assert!(reduced.is_balanced().unwrap());
    }

    #[test]
    fn test_counterpart_of() {
        let (r, g) = (StakeId::new(), StakeId::new());
        let fill = PlannedFill { red: r, green: g, amount: Amount::new(1) };
        assert_eq!(fill.counterpart_of(&r), Some(g));
        assert_eq!(fill.counterpart_of(&g), Some(r));
        assert_eq!(fill.counterpart_of(&StakeId::new()), None);
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let plan = MatchingPlan {
            fills: Vec::new(),
            residuals: vec![
                residual(StakeId::new(), Side::Red, u64::MAX, u64::MAX),
                residual(StakeId::new(), Side::Red, 1, 1),
                residual(StakeId::new(), Side::Green, u64::MAX, 0),
                residual(StakeId::new(), Side::Green, 1, 0),
            ],
            passes: PassSummary::default(),
        };

        assert_eq!(plan.total_red(), Err(AmountError::Overflow));
        assert_eq!(plan.total_green(), Ok(Amount::ZERO));
        assert!(plan.is_balanced().is_err());
        assert_eq!(plan.total_residual(), Err(AmountError::Overflow));
    }
}
