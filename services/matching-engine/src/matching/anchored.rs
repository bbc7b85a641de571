//! Anchored sweeps
//!
//! An anchor stake absorbs opposing stakes in ascending amount order, one
//! partial fill at a time, until it is exhausted or the other side runs dry.

use crate::book::WorkingSet;
use crate::plan::PlannedFill;
use types::stake::Side;

/// Each green with availability absorbs reds in ascending order
pub fn green_anchored_pass(set: &mut WorkingSet, fills: &mut Vec<PlannedFill>) -> usize {
    sweep(set, fills, Side::Green)
}

/// Each red still available after the green sweep absorbs greens
pub fn red_anchored_pass(set: &mut WorkingSet, fills: &mut Vec<PlannedFill>) -> usize {
    sweep(set, fills, Side::Red)
}

fn sweep(set: &mut WorkingSet, fills: &mut Vec<PlannedFill>, anchor_side: Side) -> usize {
    let (reds, greens) = set.queues();
    let (anchors, others) = match anchor_side {
        Side::Green => (greens, reds),
        Side::Red => (reds, greens),
    };
    let mut emitted = 0;

    for &anchor in &anchors {
        for &other in &others {
            let anchor_left = set.available(anchor);
            if anchor_left == 0 {
                break;
            }
            let other_left = set.available(other);
            if other_left == 0 {
                continue;
            }

            let amount = anchor_left.min(other_left);
            let fill = match anchor_side {
                Side::Green => set.consume(other, anchor, amount),
                Side::Red => set.consume(anchor, other, amount),
            };
            fills.push(fill);
            emitted += 1;
        }
    }

    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlannerInput;
    use types::ids::StakeId;
    use types::money::Amount;

    fn input(side: Side, amount: u64) -> PlannerInput {
        PlannerInput::new(StakeId::new(), side, Amount::new(amount))
    }

    #[test]
    fn test_green_anchor_absorbs_many_small_reds() {
        let inputs = vec![
            input(Side::Red, 10),
            input(Side::Red, 20),
            input(Side::Red, 30),
            input(Side::Green, 100),
        ];
        let mut set = WorkingSet::build(&inputs).unwrap();
        let mut fills = Vec::new();

        let emitted = green_anchored_pass(&mut set, &mut fills);

        assert_eq!(emitted, 3);
        assert!(fills.iter().all(|f| f.green == inputs[3].stake_id));
        assert_eq!(set.available(3), 40);
        assert_eq!((0..3).map(|i| set.available(i)).sum::<u64>(), 0);
    }

    #[test]
    fn test_red_anchor_picks_up_leftover_reds() {
        let inputs = vec![input(Side::Red, 80), input(Side::Green, 30), input(Side::Green, 20)];
        let mut set = WorkingSet::build(&inputs).unwrap();
        let mut fills = Vec::new();

        // greens exhausted by the green sweep; nothing left for the red sweep
        assert_eq!(green_anchored_pass(&mut set, &mut fills), 2);
        assert_eq!(red_anchored_pass(&mut set, &mut fills), 0);
        assert_eq!(set.available(0), 30);
    }

    #[test]
    fn test_red_anchor_sweep_alone() {
        let inputs = vec![input(Side::Red, 25), input(Side::Green, 10), input(Side::Green, 40)];
        let mut set = WorkingSet::build(&inputs).unwrap();
        let mut fills = Vec::new();

        assert_eq!(red_anchored_pass(&mut set, &mut fills), 2);
        assert_eq!(fills[0].amount, Amount::new(10));
        assert_eq!(fills[1].amount, Amount::new(15));
        assert_eq!(set.available(2), 25);
    }
}
