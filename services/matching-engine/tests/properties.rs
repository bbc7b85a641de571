//! Property tests for planner invariants

use matching_engine::{MatchingPlanner, PlannerInput};
use proptest::prelude::*;
use std::collections::HashMap;
use types::ids::StakeId;
use types::money::Amount;
use types::stake::Side;

fn pool() -> impl Strategy<Value = Vec<PlannerInput>> {
    prop::collection::vec((any::<bool>(), 1u64..500), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(red, amount)| {
                let side = if red { Side::Red } else { Side::Green };
                PlannerInput::new(StakeId::new(), side, Amount::new(amount))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_red_and_green_fills_balance(inputs in pool()) {
        let plan = MatchingPlanner::new().plan(&inputs).unwrap();
        prop_assert!(plan.is_balanced().unwrap());
        let fill_total: u64 = plan.fills.iter().map(|f| f.amount.as_u64()).sum();
        prop_assert_eq!(plan.total_red().unwrap().as_u64(), fill_total);
    }

    #[test]
    fn prop_no_stake_over_filled(inputs in pool()) {
        let plan = MatchingPlanner::new().plan(&inputs).unwrap();
        let mut filled: HashMap<StakeId, u64> = HashMap::new();
        for f in &plan.fills {
            prop_assert!(f.amount.as_u64() > 0);
            *filled.entry(f.red).or_default() += f.amount.as_u64();
            *filled.entry(f.green).or_default() += f.amount.as_u64();
        }
        for input in &inputs {
            let total = filled.get(&input.stake_id).copied().unwrap_or(0);
            prop_assert!(total <= input.amount.as_u64());
            let residual = plan.residual_for(&input.stake_id).unwrap();
            prop_assert_eq!(residual.matched.as_u64(), total);
            prop_assert_eq!(residual.matched.as_u64() + residual.residual.as_u64(), input.amount.as_u64());
        }
    }

    #[test]
    fn prop_one_side_left_over(inputs in pool()) {
        // after matching, residual exposure remains on at most one side
        let plan = MatchingPlanner::new().plan(&inputs).unwrap();
        let red_left = plan.residuals.iter().any(|r| r.side == Side::Red && !r.residual.is_zero());
        let green_left = plan.residuals.iter().any(|r| r.side == Side::Green && !r.residual.is_zero());
        prop_assert!(!(red_left && green_left));
    }

    #[test]
    fn prop_plan_is_reproducible(inputs in pool()) {
        let planner = MatchingPlanner::new();
        prop_assert_eq!(planner.plan(&inputs).unwrap(), planner.plan(&inputs).unwrap());
    }
}
