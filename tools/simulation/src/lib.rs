//! Market Simulation Framework
//!
//! Drives the stake engine with randomised, seeded stake pools placed from
//! many threads, then checks the books balance after matching and
//! resolution.
//!
//! # Modules
//! - `generator`: Seeded stake pool and outcome generator
//! - `scenario`: Concurrent end-to-end market run
//! - `report`: Scenario report, conservation check and JSON export

pub mod generator;
pub mod report;
pub mod scenario;

pub use generator::{PoolConfig, StakePoolGenerator};
pub use report::ScenarioReport;
pub use scenario::{run_scenario, ScenarioConfig};

/// Stamped into every scenario report
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
