//! Per-side index queue sorted by amount
//!
//! Holds arena indices for one side, ordered by original amount ascending.
//! The sort is stable, so equal amounts keep the order in which the stakes
//! were supplied to the planner.

use super::working_set::WorkingEntry;

#[derive(Debug, Clone, Default)]
pub struct SideQueue {
    indices: Vec<usize>,
}

impl SideQueue {
    /// Build a queue from arena indices already in supply order
    pub fn sorted(mut indices: Vec<usize>, arena: &[WorkingEntry]) -> Self {
        indices.sort_by_key(|&i| arena[i].amount);
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::StakeId;
    use types::stake::Side;

    fn entry(amount: u64) -> WorkingEntry {
        WorkingEntry {
            stake_id: StakeId::new(),
            side: Side::Red,
            amount,
            available: amount,
        }
    }

    #[test]
    fn test_sorted_ascending_with_stable_ties() {
        let arena = vec![entry(50), entry(10), entry(50), entry(20)];
        let queue = SideQueue::sorted(vec![0, 1, 2, 3], &arena);
        assert_eq!(queue.indices(), &[1, 3, 0, 2]);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_empty_queue() {
        let queue = SideQueue::sorted(Vec::new(), &[]);
        assert!(queue.is_empty());
    }
}
