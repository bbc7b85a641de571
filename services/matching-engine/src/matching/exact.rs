//! Exact-size pairing
//!
//! Removes same-size opposing stakes with zero residual before any
//! fragmenting pass runs.

use crate::book::WorkingSet;
use crate::plan::PlannedFill;

/// Pair each untouched red stake with the first green of identical size
///
/// Returns the number of fills emitted.
pub fn exact_pass(set: &mut WorkingSet, fills: &mut Vec<PlannedFill>) -> usize {
    let (reds, greens) = set.queues();
    let mut emitted = 0;

    for &red in &reds {
        if !set.entry(red).is_untouched() {
            continue;
        }
        let wanted = set.entry(red).amount;

        let partner = greens
            .iter()
            .copied()
            .find(|&green| set.available(green) == wanted);

        if let Some(green) = partner {
            fills.push(set.consume(red, green, wanted));
            emitted += 1;
        }
    }

    emitted
}
