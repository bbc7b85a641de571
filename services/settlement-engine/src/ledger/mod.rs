//! Ledger Store contract
//!
//! The engine never talks to a database directly. It reads and writes
//! accounts, stakes and markets through a `Transaction` handed out by
//! `LedgerStore::run_transaction`, which commits atomically or reports a
//! conflict. Every record an operation mutates must be read first inside
//! the same transaction so the store can detect concurrent writers.

pub mod memory;

pub use memory::InMemoryLedger;

use thiserror::Error;
use types::account::Account;
use types::ids::{AccountId, MarketId, StakeId};
use types::market::Market;
use types::stake::Stake;

/// Store-level failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Write conflict persisted after {attempts} attempts")]
    Conflict { attempts: usize },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Read/write handle valid for the duration of one transaction body
pub trait Transaction {
    fn read_account(&mut self, account_id: &AccountId) -> Result<Option<Account>, LedgerError>;

    fn read_stake(&mut self, stake_id: &StakeId) -> Result<Option<Stake>, LedgerError>;

    fn read_market(&mut self, market_id: &MarketId) -> Result<Option<Market>, LedgerError>;

    /// Pending stakes of a market ordered by placement sequence ascending
    fn query_pending_stakes(&mut self, market_id: &MarketId) -> Result<Vec<Stake>, LedgerError>;

    /// Matched stakes of a market ordered by placement sequence ascending
    fn query_matched_stakes(&mut self, market_id: &MarketId) -> Result<Vec<Stake>, LedgerError>;

    /// Next placement sequence number; strictly increasing, gaps allowed
    fn next_sequence(&mut self) -> Result<u64, LedgerError>;

    fn put_account(&mut self, account: Account) -> Result<(), LedgerError>;

    fn put_stake(&mut self, stake: Stake) -> Result<(), LedgerError>;

    fn put_market(&mut self, market: Market) -> Result<(), LedgerError>;
}

/// Durable keyed storage with optimistic transactions
pub trait LedgerStore: Send + Sync {
    /// Run `body` against a consistent view and commit its writes atomically
    ///
    /// On a write conflict the whole body is re-run, a bounded number of
    /// times, after which `LedgerError::Conflict` is returned. If `body`
    /// fails nothing is committed.
    fn run_transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnMut(&mut dyn Transaction) -> Result<T, E>,
        E: From<LedgerError>;
}
