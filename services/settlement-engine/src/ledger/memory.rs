//! In-memory Ledger Store
//!
//! Reference implementation of the store contract with optimistic
//! concurrency. Each record carries a version; a transaction remembers the
//! version of everything it read and its commit fails if any of them moved.
//! Writes are buffered in the transaction and become visible only on commit.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use types::account::Account;
use types::ids::{AccountId, MarketId, StakeId};
use types::market::Market;
use types::stake::{Stake, StakeStatus};

use super::{LedgerError, LedgerStore, Transaction};
use crate::config::StoreConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RecordKey {
    Account(AccountId),
    Stake(StakeId),
    Market(MarketId),
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, Account>,
    stakes: HashMap<StakeId, Stake>,
    markets: HashMap<MarketId, Market>,
}

impl LedgerState {
    fn version_of(&self, key: &RecordKey) -> Option<u64> {
        match key {
            RecordKey::Account(id) => self.accounts.get(id).map(|a| a.version),
            RecordKey::Stake(id) => self.stakes.get(id).map(|s| s.version),
            RecordKey::Market(id) => self.markets.get(id).map(|m| m.version),
        }
    }
}

/// Thread-safe in-memory ledger
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    sequence: AtomicU64,
    max_attempts: usize,
    commits: AtomicU64,
    conflicts: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            sequence: AtomicU64::new(0),
            max_attempts: config.max_internal_retries + 1,
            commits: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
        }
    }

    /// Open a transaction; most callers should use `run_transaction`
    pub fn begin(&self) -> MemoryTransaction<'_> {
        MemoryTransaction {
            ledger: self,
            reads: HashMap::new(),
            accounts: HashMap::new(),
            stakes: HashMap::new(),
            markets: HashMap::new(),
        }
    }

    // ───────────────────────── Committed-state inspection ─────────────────────────

    pub fn account(&self, account_id: &AccountId) -> Option<Account> {
        self.state.read().accounts.get(account_id).cloned()
    }

    pub fn stake(&self, stake_id: &StakeId) -> Option<Stake> {
        self.state.read().stakes.get(stake_id).cloned()
    }

    pub fn market(&self, market_id: &MarketId) -> Option<Market> {
        self.state.read().markets.get(market_id).cloned()
    }

    /// All stakes of a market in placement order
    pub fn stakes_for_market(&self, market_id: &MarketId) -> Vec<Stake> {
        let mut stakes: Vec<Stake> = self
            .state
            .read()
            .stakes
            .values()
            .filter(|s| &s.market_id == market_id)
            .cloned()
            .collect();
        stakes.sort_by_key(|s| (s.sequence, s.stake_id));
        stakes
    }

    /// Sum of all account balances
    pub fn total_balance(&self) -> u128 {
        self.state
            .read()
            .accounts
            .values()
            .map(|a| a.balance.as_u64() as u128)
            .sum()
    }

    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedger {
    fn run_transaction<T, E, F>(&self, mut body: F) -> Result<T, E>
    where
        F: FnMut(&mut dyn Transaction) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = self.begin();
            match body(&mut tx as &mut dyn Transaction) {
                Ok(value) => match tx.commit() {
                    Ok(()) => return Ok(value),
                    Err(LedgerError::Conflict { .. }) if attempt < self.max_attempts => {
                        debug!(attempt, "Transaction conflict, re-running body");
                    }
                    Err(LedgerError::Conflict { .. }) => {
                        return Err(E::from(LedgerError::Conflict { attempts: attempt }));
                    }
                    Err(other) => return Err(E::from(other)),
                },
                Err(err) => {
                    // A rejection computed from a view that has since moved is re-evaluated
                    if tx.is_stale() && attempt < self.max_attempts {
                        debug!(attempt, "Body failed on a stale view, re-running");
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

/// Buffered transaction over an `InMemoryLedger`
pub struct MemoryTransaction<'a> {
    ledger: &'a InMemoryLedger,
    reads: HashMap<RecordKey, Option<u64>>,
    accounts: HashMap<AccountId, Account>,
    stakes: HashMap<StakeId, Stake>,
    markets: HashMap<MarketId, Market>,
}

impl MemoryTransaction<'_> {
    fn record_read(&mut self, key: RecordKey, version: Option<u64>) {
        self.reads.entry(key).or_insert(version);
    }

    /// Whether anything this transaction read has changed since
    pub fn is_stale(&self) -> bool {
        let state = self.ledger.state.read();
        self.reads
            .iter()
            .any(|(key, version)| state.version_of(key) != *version)
    }

    /// Validate the read set and apply buffered writes atomically
    pub fn commit(self) -> Result<(), LedgerError> {
        let ledger = self.ledger;
        let mut state = ledger.state.write();

        let stale = self
            .reads
            .iter()
            .any(|(key, version)| state.version_of(key) != *version);
        if stale {
            ledger.conflicts.fetch_add(1, Ordering::Relaxed);
            return Err(LedgerError::Conflict { attempts: 1 });
        }

        for (id, mut account) in self.accounts {
            account.version = state.accounts.get(&id).map_or(0, |a| a.version + 1);
            state.accounts.insert(id, account);
        }
        for (id, mut stake) in self.stakes {
            stake.version = state.stakes.get(&id).map_or(0, |s| s.version + 1);
            state.stakes.insert(id, stake);
        }
        for (id, mut market) in self.markets {
            market.version = state.markets.get(&id).map_or(0, |m| m.version + 1);
            state.markets.insert(id, market);
        }

        ledger.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn query_stakes(&mut self, market_id: &MarketId, status: StakeStatus) -> Vec<Stake> {
        let committed: Vec<Stake> = self
            .ledger
            .state
            .read()
            .stakes
            .values()
            .filter(|s| &s.market_id == market_id)
            .cloned()
            .collect();

        let mut result = Vec::new();
        for stake in committed {
            self.record_read(RecordKey::Stake(stake.stake_id), Some(stake.version));
            let current = self.stakes.get(&stake.stake_id).cloned().unwrap_or(stake);
            if current.status == status {
                result.push(current);
            }
        }
        for stake in self.stakes.values() {
            let is_new = !result.iter().any(|s| s.stake_id == stake.stake_id)
                && !self.reads.contains_key(&RecordKey::Stake(stake.stake_id));
            if is_new && &stake.market_id == market_id && stake.status == status {
                result.push(stake.clone());
            }
        }

        result.sort_by_key(|s| (s.sequence, s.stake_id));
        result
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn read_account(&mut self, account_id: &AccountId) -> Result<Option<Account>, LedgerError> {
        if let Some(account) = self.accounts.get(account_id) {
            return Ok(Some(account.clone()));
        }
        let account = self.ledger.state.read().accounts.get(account_id).cloned();
        self.record_read(RecordKey::Account(*account_id), account.as_ref().map(|a| a.version));
        Ok(account)
    }

    fn read_stake(&mut self, stake_id: &StakeId) -> Result<Option<Stake>, LedgerError> {
        if let Some(stake) = self.stakes.get(stake_id) {
            return Ok(Some(stake.clone()));
        }
        let stake = self.ledger.state.read().stakes.get(stake_id).cloned();
        self.record_read(RecordKey::Stake(*stake_id), stake.as_ref().map(|s| s.version));
        Ok(stake)
    }

    fn read_market(&mut self, market_id: &MarketId) -> Result<Option<Market>, LedgerError> {
        if let Some(market) = self.markets.get(market_id) {
            return Ok(Some(market.clone()));
        }
        let market = self.ledger.state.read().markets.get(market_id).cloned();
        self.record_read(RecordKey::Market(*market_id), market.as_ref().map(|m| m.version));
        Ok(market)
    }

    fn query_pending_stakes(&mut self, market_id: &MarketId) -> Result<Vec<Stake>, LedgerError> {
        Ok(self.query_stakes(market_id, StakeStatus::Pending))
    }

    fn query_matched_stakes(&mut self, market_id: &MarketId) -> Result<Vec<Stake>, LedgerError> {
        Ok(self.query_stakes(market_id, StakeStatus::Matched))
    }

    fn next_sequence(&mut self) -> Result<u64, LedgerError> {
        Ok(self.ledger.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn put_account(&mut self, account: Account) -> Result<(), LedgerError> {
        self.accounts.insert(account.account_id, account);
        Ok(())
    }

    fn put_stake(&mut self, stake: Stake) -> Result<(), LedgerError> {
        self.stakes.insert(stake.stake_id, stake);
        Ok(())
    }

    fn put_market(&mut self, market: Market) -> Result<(), LedgerError> {
        self.markets.insert(market.market_id, market);
        Ok(())
    }
}
