//! Matching planner core
//!
//! Coordinates the working set and the three passes into one plan.

use tracing::debug;

use crate::book::WorkingSet;
use crate::matching::{exact_pass, green_anchored_pass, red_anchored_pass};
use crate::plan::{MatchingPlan, PassSummary, PlanError, PlannerInput};

/// Stateless matching planner
///
/// Callers must supply stakes in a stable, reproducible order (placement
/// order ascending is what the settlement engine uses); that order breaks
/// ties between equal amounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingPlanner;

impl MatchingPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Produce a matching plan for one market's pending stakes
    ///
    /// If either side is empty the plan has no fills and every stake is
    /// fully residual.
    pub fn plan(&self, inputs: &[PlannerInput]) -> Result<MatchingPlan, PlanError> {
        let mut set = WorkingSet::build(inputs)?;
        let mut fills = Vec::new();
        let mut passes = PassSummary::default();

        if set.reds().is_empty() || set.greens().is_empty() {
            debug!(
                reds = set.reds().len(),
                greens = set.greens().len(),
                "One side empty, nothing to match"
            );
            return Ok(MatchingPlan {
                fills,
                residuals: set.residuals(),
                passes,
            });
        }

        passes.exact = exact_pass(&mut set, &mut fills);
        debug!(fills = passes.exact, "Exact-match pass complete");

        passes.green_anchored = green_anchored_pass(&mut set, &mut fills);
        debug!(fills = passes.green_anchored, "Green-anchored pass complete");

        passes.red_anchored = red_anchored_pass(&mut set, &mut fills);
        debug!(fills = passes.red_anchored, "Red-anchored pass complete");

        Ok(MatchingPlan {
            fills,
            residuals: set.residuals(),
            passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::StakeId;
    use types::money::Amount;
    use types::stake::Side;

    fn input(side: Side, amount: u64) -> PlannerInput {
        PlannerInput::new(StakeId::new(), side, Amount::new(amount))
    }

    #[test]
    fn test_empty_input() {
        let plan = MatchingPlanner::new().plan(&[]).unwrap();
        assert!(plan.is_empty());
        assert!(plan.residuals.is_empty());
    }

    #[test]
    fn test_one_sided_market_is_fully_residual() {
        let inputs = vec![input(Side::Red, 10), input(Side::Red, 20)];
        let plan = MatchingPlanner::new().plan(&inputs).unwrap();
        assert!(plan.is_empty());
        assert!(plan.residuals.iter().all(|r| r.is_fully_residual()));
        assert_eq!(plan.total_residual().unwrap(), Amount::new(30));
    }

    #[test]
    fn test_exact_pass_runs_before_sweeps() {
        let inputs = vec![
            input(Side::Red, 30),
            input(Side::Red, 50),
            input(Side::Green, 50),
            input(Side::Green, 40),
        ];
        let plan = MatchingPlanner::new().plan(&inputs).unwrap();

        assert_eq!(plan.passes.exact, 1);
        assert_eq!(plan.fills[0].red, inputs[1].stake_id);
        assert_eq!(plan.fills[0].green, inputs[2].stake_id);
        assert_eq!(plan.fills[0].amount, Amount::new(50));
        // R30 then fills against G40 leaving 10 green residual
        assert_eq!(plan.residual_for(&inputs[3].stake_id).unwrap().residual, Amount::new(10));
        assert!(plan.is_balanced().unwrap());
    }

    #[test]
    fn test_planning_is_idempotent() {
        let inputs = vec![
            input(Side::Red, 7),
            input(Side::Green, 3),
            input(Side::Green, 3),
            input(Side::Red, 3),
            input(Side::Green, 11),
        ];
        let planner = MatchingPlanner::new();
        assert_eq!(planner.plan(&inputs).unwrap(), planner.plan(&inputs).unwrap());
    }
}
