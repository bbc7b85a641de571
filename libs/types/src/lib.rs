//! Types library for the stake matching and settlement engine
//!
//! This library provides the shared data model used by the planner, the
//! settlement applier and the resolver. Money is always carried in integer
//! minor currency units; rates are fixed-point decimals.
//!
//! # Modules
//! - `ids`: Unique identifiers (StakeId, AccountId, MarketId)
//! - `money`: Minor-unit amounts and the fixed profit rate
//! - `stake`: Stake lifecycle, sides and fills
//! - `market`: Market status and outcome
//! - `account`: Account balance
//! - `diagnostics`: Matching run record handed to diagnostics sinks
//! - `errors`: Error taxonomy

pub mod ids;
pub mod money;
pub mod stake;
pub mod market;
pub mod account;
pub mod diagnostics;
pub mod errors;

