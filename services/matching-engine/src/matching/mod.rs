//! Matching passes
//!
//! Run in order over one working set: exact pairs first, then the
//! green-anchored sweep, then the red-anchored sweep.

pub mod exact;
pub mod anchored;

pub use anchored::{green_anchored_pass, red_anchored_pass};
pub use exact::exact_pass;
