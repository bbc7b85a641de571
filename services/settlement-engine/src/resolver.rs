//! Market resolution
//!
//! Applies a declared outcome to every matched stake of a market in one
//! transaction. Winners receive `matched + floor(matched * rate)`, losers
//! nothing, and a void outcome returns each matched amount. A market is
//! resolved once; a second resolution is rejected.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use types::ids::{AccountId, MarketId};
use types::market::Outcome;
use types::money::{Amount, ProfitRate};
use types::stake::StakeStatus;

use crate::errors::EngineError;
use crate::ledger::{LedgerStore, Transaction};
use crate::validator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub market_id: MarketId,
    pub outcome: Outcome,
    pub winners: usize,
    pub losers: usize,
    pub refunded: usize,
    pub total_paid: Amount,
    pub credits_per_account: BTreeMap<AccountId, Amount>,
}

#[derive(Debug, Clone, Copy)]
pub struct MarketResolver {
    profit_rate: ProfitRate,
}

impl MarketResolver {
    pub fn new(profit_rate: ProfitRate) -> Self {
        Self { profit_rate }
    }

    pub fn profit_rate(&self) -> ProfitRate {
        self.profit_rate
    }

    pub fn resolve<S: LedgerStore>(
        &self,
        store: &S,
        market_id: &MarketId,
        outcome: Outcome,
        now: i64,
    ) -> Result<ResolutionSummary, EngineError> {
        let summary = store.run_transaction(|tx| self.resolve_in(tx, market_id, outcome, now))?;
        info!(
            market_id = %market_id,
            outcome = %outcome,
            winners = summary.winners,
            losers = summary.losers,
            refunded = summary.refunded,
            total_paid = summary.total_paid.as_u64(),
            "Market resolved"
        );
        Ok(summary)
    }

    fn resolve_in(
        &self,
        tx: &mut dyn Transaction,
        market_id: &MarketId,
        outcome: Outcome,
        now: i64,
    ) -> Result<ResolutionSummary, EngineError> {
        let mut market = validator::require_market(market_id, tx.read_market(market_id)?)?;
        validator::validate_resolution(&market)?;

        let mut summary = ResolutionSummary {
            market_id: *market_id,
            outcome,
            winners: 0,
            losers: 0,
            refunded: 0,
            total_paid: Amount::ZERO,
            credits_per_account: BTreeMap::new(),
        };

        let stakes = tx.query_matched_stakes(market_id)?;
        let mut updated = Vec::with_capacity(stakes.len());
        for mut stake in stakes {
            let credit = match outcome.winning_side() {
                None => {
                    stake.transition(StakeStatus::Refunded)?;
                    summary.refunded += 1;
                    stake.matched
                }
                Some(side) if stake.side == side => {
                    stake.profit = self.profit_rate.profit_on(stake.matched)?;
                    stake.transition(StakeStatus::Won)?;
                    summary.winners += 1;
                    stake.matched.checked_add(stake.profit)?
                }
                Some(_) => {
                    stake.transition(StakeStatus::Lost)?;
                    summary.losers += 1;
                    Amount::ZERO
                }
            };
            if !credit.is_zero() {
                let total = summary.credits_per_account.entry(stake.account_id).or_insert(Amount::ZERO);
                *total = total.checked_add(credit)?;
                summary.total_paid = summary.total_paid.checked_add(credit)?;
            }
            updated.push(stake);
        }

        let mut accounts = Vec::with_capacity(summary.credits_per_account.len());
        for (account_id, credit) in &summary.credits_per_account {
            let mut account = tx
                .read_account(account_id)?
                .ok_or_else(|| EngineError::Invariant(format!("Stake owner {account_id} does not exist")))?;
            account.credit(*credit, now)?;
            accounts.push(account);
        }

        if !market.resolve(outcome, now) {
            return Err(EngineError::Invariant(format!("Market {market_id} already carries an outcome")));
        }

        for stake in updated {
            tx.put_stake(stake)?;
        }
        for account in accounts {
            tx.put_account(account)?;
        }
        tx.put_market(market)?;

        Ok(summary)
    }
}

impl Default for MarketResolver {
    fn default() -> Self {
        Self::new(ProfitRate::default())
    }
}
