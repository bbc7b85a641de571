//! Settlement Engine Service
//!
//! Owns the stake lifecycle for two-sided markets: placement, cancellation,
//! the matching run that turns a closed market's pending stakes into fills
//! and refunds, and resolution against a declared outcome.
//!
//! **Key Invariants:**
//! - Money is conserved: balances plus outstanding stakes only change by
//!   deposits and winners' profit
//! - No stake is ever matched beyond its amount
//! - Every stake of a matched market is either `Matched` or `Refunded`
//! - A market is matched once and resolved once

pub mod applier;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod resolver;
pub mod retry;
pub mod validator;

pub use config::EngineConfig;
pub use engine::StakeEngine;
pub use errors::EngineError;
pub use ledger::{InMemoryLedger, LedgerError, LedgerStore, Transaction};
pub use resolver::ResolutionSummary;
