//! Stake engine orchestrator
//!
//! Ties the ledger store, matching planner, settlement applier and market
//! resolver together behind the caller-facing operations. Every operation
//! is one store transaction wrapped in the engine's retry policy.

use matching_engine::{MatchingPlan, MatchingPlanner, PlannerInput};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use types::account::Account;
use types::diagnostics::MatchingRunRecord;
use types::ids::{AccountId, MarketId, StakeId};
use types::market::{Market, MarketStatus, Outcome};
use types::money::Amount;
use types::stake::{Side, Stake, StakeStatus};

use crate::applier::SettlementApplier;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::diagnostics::{DiagnosticsSink, TracingSink};
use crate::errors::EngineError;
use crate::ledger::{InMemoryLedger, LedgerStore};
use crate::resolver::{MarketResolver, ResolutionSummary};
use crate::retry::RetryPolicy;
use crate::validator;

/// Stake engine service
pub struct StakeEngine<S: LedgerStore> {
    store: S,
    config: EngineConfig,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    sink: Box<dyn DiagnosticsSink>,
    planner: MatchingPlanner,
    applier: SettlementApplier,
    resolver: MarketResolver,
}

impl StakeEngine<InMemoryLedger> {
    /// Engine over a fresh in-memory ledger built from `config.store`
    pub fn in_memory(config: EngineConfig) -> Self {
        let store = InMemoryLedger::from_config(&config.store);
        Self::new(store, config)
    }
}

impl<S: LedgerStore> StakeEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(&config.retry),
            resolver: MarketResolver::new(config.profit_rate),
            store,
            config,
            clock: Arc::new(SystemClock),
            sink: Box::new(TracingSink),
            planner: MatchingPlanner::new(),
            applier: SettlementApplier::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn now(&self) -> i64 {
        self.clock.now_nanos()
    }

    // ───────────────────────── Accounts & markets ─────────────────────────

    pub fn open_account(&self, initial_balance: Amount) -> Result<AccountId, EngineError> {
        let account_id = self.retry.run("open_account", |_| {
            let account = Account::new(initial_balance, self.now());
            self.store.run_transaction(|tx| -> Result<AccountId, EngineError> {
                tx.put_account(account.clone())?;
                Ok(account.account_id)
            })
        })?;
        info!(account_id = %account_id, balance = initial_balance.as_u64(), "Account opened");
        Ok(account_id)
    }

    /// Credit funds to an account; returns the new balance
    pub fn deposit(&self, account_id: &AccountId, amount: Amount) -> Result<Amount, EngineError> {
        validator::require_positive(amount)?;
        let balance = self.retry.run("deposit", |_| {
            let now = self.now();
            self.store.run_transaction(|tx| -> Result<Amount, EngineError> {
                let mut account = validator::require_account(account_id, tx.read_account(account_id)?)?;
                account.credit(amount, now)?;
                let balance = account.balance;
                tx.put_account(account)?;
                Ok(balance)
            })
        })?;
        debug!(account_id = %account_id, amount = amount.as_u64(), balance = balance.as_u64(), "Deposit applied");
        Ok(balance)
    }

    pub fn open_market(&self) -> Result<MarketId, EngineError> {
        let market_id = self.retry.run("open_market", |_| {
            let market = Market::new(self.now());
            self.store.run_transaction(|tx| -> Result<MarketId, EngineError> {
                tx.put_market(market.clone())?;
                Ok(market.market_id)
            })
        })?;
        info!(market_id = %market_id, "Market opened");
        Ok(market_id)
    }

    /// Stop accepting stakes; the single trigger for a matching run
    ///
    /// Compare-and-set `Open -> Closed`: of two concurrent closers exactly
    /// one succeeds, the other gets `MarketNotOpen`.
    pub fn close_market(&self, market_id: &MarketId) -> Result<(), EngineError> {
        self.retry.run("close_market", |_| {
            self.store.run_transaction(|tx| -> Result<(), EngineError> {
                let mut market = validator::require_market(market_id, tx.read_market(market_id)?)?;
                validator::validate_close(&market)?;
                market.status = MarketStatus::Closed;
                tx.put_market(market)?;
                Ok(())
            })
        })?;
        info!(market_id = %market_id, "Market closed");
        Ok(())
    }

    // ───────────────────────── Stakes ─────────────────────────

    /// Place a stake; the amount is debited immediately
    pub fn place_stake(
        &self,
        account_id: &AccountId,
        market_id: &MarketId,
        side: Side,
        amount: Amount,
    ) -> Result<StakeId, EngineError> {
        validator::require_positive(amount)?;

        let stake_id = self.retry.run("place_stake", |_| {
            let now = self.now();
            self.store.run_transaction(|tx| -> Result<StakeId, EngineError> {
                let mut account = validator::require_account(account_id, tx.read_account(account_id)?)?;
                let market = validator::require_market(market_id, tx.read_market(market_id)?)?;
                validator::validate_placement(&account, &market, amount)?;

                account.debit(amount, now)?;
                let sequence = tx.next_sequence()?;
                let stake = Stake::new(*account_id, *market_id, side, amount, sequence, now);
                let stake_id = stake.stake_id;
                tx.put_stake(stake)?;
                tx.put_account(account)?;
                Ok(stake_id)
            })
        })?;

        info!(
            stake_id = %stake_id,
            account_id = %account_id,
            market_id = %market_id,
            side = %side,
            amount = amount.as_u64(),
            "Stake placed"
        );
        Ok(stake_id)
    }

    /// Cancel a pending stake and refund it in full; returns the refund
    pub fn cancel_stake(&self, stake_id: &StakeId) -> Result<Amount, EngineError> {
        let refund = self.retry.run("cancel_stake", |_| {
            let now = self.now();
            self.store.run_transaction(|tx| -> Result<Amount, EngineError> {
                let mut stake = validator::require_stake(stake_id, tx.read_stake(stake_id)?)?;
                validator::validate_cancel(&stake)?;
                let mut account = tx
                    .read_account(&stake.account_id)?
                    .ok_or_else(|| EngineError::Invariant(format!("Stake owner {} does not exist", stake.account_id)))?;

                account.credit(stake.amount, now)?;
                stake.transition(StakeStatus::Refunded)?;
                stake.residual_refunded = true;
                let refund = stake.amount;
                tx.put_stake(stake)?;
                tx.put_account(account)?;
                Ok(refund)
            })
        })?;
        info!(stake_id = %stake_id, refund = refund.as_u64(), "Stake cancelled");
        Ok(refund)
    }

    // ───────────────────────── Matching ─────────────────────────

    /// Plan a matching run over the market's pending stakes
    ///
    /// Stakes are fed to the planner in placement order, which breaks ties
    /// between equal amounts in favour of the earlier stake.
    pub fn plan_matching(&self, market_id: &MarketId) -> Result<MatchingPlan, EngineError> {
        let pending = self.retry.run("plan_matching", |_| {
            self.store.run_transaction(|tx| -> Result<Vec<Stake>, EngineError> {
                let market = validator::require_market(market_id, tx.read_market(market_id)?)?;
                validator::validate_matching(&market)?;
                Ok(tx.query_pending_stakes(market_id)?)
            })
        })?;
        let inputs: Vec<PlannerInput> = pending.iter().map(PlannerInput::from).collect();
        Ok(self.planner.plan(&inputs)?)
    }

    /// Commit a previously computed plan and report the run
    pub fn apply_plan(&self, market_id: &MarketId, plan: &MatchingPlan) -> Result<MatchingRunRecord, EngineError> {
        let started = Instant::now();
        let mut attempts = 0;
        let outcome = self.retry.run("apply_plan", |attempt| {
            attempts = attempt + 1;
            self.applier.apply(&self.store, market_id, plan, self.now())
        })?;

        let applied = &outcome.applied;
        let mut record = MatchingRunRecord::new(*market_id);
        record.red_stakes = plan.residuals.iter().filter(|r| r.side == Side::Red).count();
        record.green_stakes = plan.residuals.iter().filter(|r| r.side == Side::Green).count();
        record.fills = applied.fills.len();
        record.matched_stakes = outcome.matched_stakes;
        record.fully_refunded = outcome.fully_refunded;
        record.partially_refunded = outcome.partially_refunded;
        record.dropped_stakes = outcome.dropped.len();
        record.total_matched_red = applied.total_red()?;
        record.total_matched_green = applied.total_green()?;
        record.total_refunded = outcome.total_refunded;
        record.attempts = attempts;
        record.duration_ms = started.elapsed().as_millis() as u64;

        record.trace(format!(
            "passes: exact {} green-anchored {} red-anchored {}",
            plan.passes.exact, plan.passes.green_anchored, plan.passes.red_anchored
        ));
        for stake_id in &outcome.dropped {
            record.trace(format!("dropped {stake_id}: no longer pending"));
        }
        if outcome.bodies_run > 1 {
            record.trace(format!("store re-ran the transaction {} times", outcome.bodies_run - 1));
        }

        self.sink.record(&record);
        Ok(record)
    }

    /// Match a closed market's pending stakes and refund what is left
    pub fn run_matching(&self, market_id: &MarketId) -> Result<MatchingRunRecord, EngineError> {
        let plan = self.plan_matching(market_id)?;
        self.apply_plan(market_id, &plan)
    }

    pub fn close_and_match(&self, market_id: &MarketId) -> Result<MatchingRunRecord, EngineError> {
        self.close_market(market_id)?;
        self.run_matching(market_id)
    }

    // ───────────────────────── Resolution ─────────────────────────

    pub fn resolve_market(&self, market_id: &MarketId, outcome: Outcome) -> Result<ResolutionSummary, EngineError> {
        self.retry.run("resolve_market", |_| {
            self.resolver.resolve(&self.store, market_id, outcome, self.now())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::diagnostics::MemorySink;
    use types::errors::ValidationError;

    fn engine() -> StakeEngine<InMemoryLedger> {
        StakeEngine::in_memory(EngineConfig::default()).with_clock(Arc::new(ManualClock::new(1_000)))
    }

    #[test]
    fn test_place_debits_balance() {
        let engine = engine();
        let account = engine.open_account(Amount::new(500)).unwrap();
        let market = engine.open_market().unwrap();

        let stake_id = engine.place_stake(&account, &market, Side::Red, Amount::new(200)).unwrap();

        let store = engine.store();
        assert_eq!(store.account(&account).unwrap().balance, Amount::new(300));
        let stake = store.stake(&stake_id).unwrap();
        assert_eq!(stake.status, StakeStatus::Pending);
        assert_eq!(stake.placed_at, 1_000);
    }

    #[test]
    fn test_place_rejections() {
        let engine = engine();
        let account = engine.open_account(Amount::new(50)).unwrap();
        let market = engine.open_market().unwrap();

        let err = engine.place_stake(&account, &market, Side::Red, Amount::ZERO).unwrap_err();
        assert_eq!(err, EngineError::Validation(ValidationError::InvalidAmount));

        let err = engine.place_stake(&account, &market, Side::Red, Amount::new(51)).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::InsufficientBalance {
                required: 51,
                available: 50
            })
        );

        let missing = AccountId::new();
        let err = engine.place_stake(&missing, &market, Side::Red, Amount::new(1)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::AccountNotFound { .. })));

        engine.close_market(&market).unwrap();
        let err = engine.place_stake(&account, &market, Side::Red, Amount::new(1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::MarketNotAcceptingStakes { .. })
        ));
        assert_eq!(engine.store().account(&account).unwrap().balance, Amount::new(50));
    }

    #[test]
    fn test_cancel_refunds_and_is_not_repeatable() {
        let engine = engine();
        let account = engine.open_account(Amount::new(100)).unwrap();
        let market = engine.open_market().unwrap();
        let stake_id = engine.place_stake(&account, &market, Side::Green, Amount::new(40)).unwrap();

        assert_eq!(engine.cancel_stake(&stake_id).unwrap(), Amount::new(40));
        assert_eq!(engine.store().account(&account).unwrap().balance, Amount::new(100));

        let err = engine.cancel_stake(&stake_id).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::StakeNotPending { .. })));
    }

    #[test]
    fn test_close_is_compare_and_set() {
        let engine = engine();
        let market = engine.open_market().unwrap();
        engine.close_market(&market).unwrap();
        let err = engine.close_market(&market).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::MarketNotOpen { .. })));
    }

    #[test]
    fn test_matching_requires_closed_market() {
        let engine = engine();
        let market = engine.open_market().unwrap();
        let err = engine.run_matching(&market).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::MarketNotClosed { .. })));

        engine.close_and_match(&market).unwrap();
        let err = engine.run_matching(&market).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::MarketNotClosed { .. })));
    }

    #[test]
    fn test_run_reported_to_sink() {
        let sink = Arc::new(MemorySink::new());
        let engine = engine().with_sink(sink.clone());
        let account = engine.open_account(Amount::new(1_000)).unwrap();
        let market = engine.open_market().unwrap();
        engine.place_stake(&account, &market, Side::Red, Amount::new(100)).unwrap();
        engine.place_stake(&account, &market, Side::Green, Amount::new(130)).unwrap();

        let record = engine.close_and_match(&market).unwrap();
        assert_eq!(record.fills, 1);
        assert_eq!(record.red_stakes, 1);
        assert_eq!(record.green_stakes, 1);
        assert_eq!(record.partially_refunded, 1);
        assert_eq!(record.total_refunded, Amount::new(30));
        assert_eq!(record.attempts, 1);
        assert!(record.is_balanced());
        assert_eq!(sink.records(), vec![record]);
    }

    #[test]
    fn test_deposit() {
        let engine = engine();
        let account = engine.open_account(Amount::ZERO).unwrap();
        assert_eq!(engine.deposit(&account, Amount::new(25)).unwrap(), Amount::new(25));
        assert!(engine.deposit(&account, Amount::ZERO).unwrap_err().is_validation());
    }
}
