//! Matching Engine Service
//!
//! Pure planner that pairs pending red and green stakes of one market into
//! fills. The planner performs no I/O and never mutates its input; applying
//! a plan to the ledger is the settlement engine's job.
//!
//! **Key Invariants:**
//! - Deterministic matching (same inputs in the same order → same plan)
//! - Total red fill amount equals total green fill amount
//! - No stake is filled beyond its original amount
//! - Worst case O(n·m) comparisons for n red and m green stakes

pub mod book;
pub mod matching;
pub mod plan;
pub mod engine;

pub use engine::MatchingPlanner;
pub use plan::{MatchingPlan, PlanError, PlannedFill, PlannerInput, Residual};
