//! Arena of stake entries with remaining availability

use std::collections::HashSet;
use types::ids::StakeId;
use types::money::Amount;
use types::stake::Side;

use super::side_queue::SideQueue;
use crate::plan::{PlanError, PlannedFill, PlannerInput, Residual};

/// Entry in the working arena
///
/// `available` starts at `amount` and only decreases.
#[derive(Debug, Clone)]
pub struct WorkingEntry {
    pub stake_id: StakeId,
    pub side: Side,
    pub amount: u64,
    pub available: u64,
}

impl WorkingEntry {
    pub fn is_untouched(&self) -> bool {
        self.available == self.amount
    }
}

/// Working copy of one market's pending stakes
#[derive(Debug, Clone)]
pub struct WorkingSet {
    arena: Vec<WorkingEntry>,
    reds: SideQueue,
    greens: SideQueue,
}

impl WorkingSet {
    /// Copy the inputs into the arena and build the sorted side queues
    pub fn build(inputs: &[PlannerInput]) -> Result<Self, PlanError> {
        let mut seen = HashSet::with_capacity(inputs.len());
        let mut arena = Vec::with_capacity(inputs.len());
        let mut reds = Vec::new();
        let mut greens = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            if input.amount.is_zero() {
                return Err(PlanError::ZeroAmount {
                    stake_id: input.stake_id.to_string(),
                });
            }
            if !seen.insert(input.stake_id) {
                return Err(PlanError::DuplicateStake {
                    stake_id: input.stake_id.to_string(),
                });
            }
            arena.push(WorkingEntry {
                stake_id: input.stake_id,
                side: input.side,
                amount: input.amount.as_u64(),
                available: input.amount.as_u64(),
            });
            match input.side {
                Side::Red => reds.push(index),
                Side::Green => greens.push(index),
            }
        }

        let reds = SideQueue::sorted(reds, &arena);
        let greens = SideQueue::sorted(greens, &arena);
        Ok(Self { arena, reds, greens })
    }

    pub fn reds(&self) -> &SideQueue {
        &self.reds
    }

    pub fn greens(&self) -> &SideQueue {
        &self.greens
    }

    pub fn entry(&self, index: usize) -> &WorkingEntry {
        &self.arena[index]
    }

    pub fn available(&self, index: usize) -> u64 {
        self.arena[index].available
    }

    /// Red and green index lists, cloned so passes can mutate the arena
    pub fn queues(&self) -> (Vec<usize>, Vec<usize>) {
        (self.reds.indices().to_vec(), self.greens.indices().to_vec())
    }

    /// Pair `amount` between a red and a green entry
    ///
    /// # Panics
    /// Panics if either side lacks the availability; passes only call this
    /// with `min(available_red, available_green)`.
    pub fn consume(&mut self, red: usize, green: usize, amount: u64) -> PlannedFill {
        assert!(amount > 0, "Fill amount must be positive");
        assert!(self.arena[red].available >= amount, "Red stake over-filled");
        assert!(self.arena[green].available >= amount, "Green stake over-filled");

        self.arena[red].available -= amount;
        self.arena[green].available -= amount;

        PlannedFill {
            red: self.arena[red].stake_id,
            green: self.arena[green].stake_id,
            amount: Amount::new(amount),
        }
    }

    /// Per-stake disposition in supply order
    pub fn residuals(&self) -> Vec<Residual> {
        self.arena
            .iter()
            .map(|e| Residual {
                stake_id: e.stake_id,
                side: e.side,
                original: Amount::new(e.amount),
                matched: Amount::new(e.amount - e.available),
                residual: Amount::new(e.available),
            })
            .collect()
    }
}
