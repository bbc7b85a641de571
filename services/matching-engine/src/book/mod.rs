//! Working copy of the stake pool
//!
//! The planner never touches the caller's stake records. It copies them into
//! an arena and refers to entries by index from per-side queues.

pub mod side_queue;
pub mod working_set;

pub use side_queue::SideQueue;
pub use working_set::{WorkingEntry, WorkingSet};
