//! Settlement applier
//!
//! Turns a matching plan into ledger writes: fills on both stakes of every
//! pair, status changes, residual refunds, and the market moving to
//! `Matched`. Everything lands in one store transaction.
//!
//! The plan is computed outside the transaction, so by the time it is
//! applied a stake may have been cancelled. Such stakes are dropped from the
//! plan, their counterparts' freed amounts become residual, and the run
//! carries on with what is left.

use matching_engine::{MatchingPlan, Residual};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};
use types::ids::{AccountId, MarketId, StakeId};
use types::market::MarketStatus;
use types::money::Amount;
use types::stake::{Stake, StakeStatus};

use crate::errors::EngineError;
use crate::ledger::{LedgerStore, Transaction};
use crate::validator;

/// Result of one committed application
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// Plan actually written, after dropping non-pending stakes
    pub applied: MatchingPlan,
    /// Stakes that left `Pending` after planning
    pub dropped: Vec<StakeId>,
    pub matched_stakes: usize,
    pub fully_refunded: usize,
    pub partially_refunded: usize,
    pub total_refunded: Amount,
    pub credits_per_account: BTreeMap<AccountId, Amount>,
    /// Transaction bodies run, including store-internal retries
    pub bodies_run: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementApplier;

impl SettlementApplier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply<S: LedgerStore>(
        &self,
        store: &S,
        market_id: &MarketId,
        plan: &MatchingPlan,
        now: i64,
    ) -> Result<ApplyOutcome, EngineError> {
        let mut bodies_run = 0;
        let mut outcome = store.run_transaction(|tx| {
            bodies_run += 1;
            self.apply_in(tx, market_id, plan, now)
        })?;
        outcome.bodies_run = bodies_run;

        info!(
            market_id = %market_id,
            fills = outcome.applied.fills.len(),
            matched_stakes = outcome.matched_stakes,
            refunded = outcome.total_refunded.as_u64(),
            dropped = outcome.dropped.len(),
            "Matching plan applied"
        );
        Ok(outcome)
    }

    fn apply_in(
        &self,
        tx: &mut dyn Transaction,
        market_id: &MarketId,
        plan: &MatchingPlan,
        now: i64,
    ) -> Result<ApplyOutcome, EngineError> {
        let mut market = validator::require_market(market_id, tx.read_market(market_id)?)?;
        validator::validate_matching(&market)?;

        // Load every stake the plan touches; anything no longer pending is dropped
        let mut stakes: HashMap<StakeId, Stake> = HashMap::new();
        let mut dropped = Vec::new();
        for stake_id in plan.stake_ids() {
            let stake = tx
                .read_stake(&stake_id)?
                .ok_or_else(|| EngineError::Invariant(format!("Planned stake {stake_id} does not exist")))?;
            if stake.market_id != *market_id {
                return Err(EngineError::Invariant(format!(
                    "Planned stake {stake_id} belongs to market {}",
                    stake.market_id
                )));
            }
            if !stake.is_pending() {
                warn!(
                    market_id = %market_id,
                    stake_id = %stake_id,
                    status = %stake.status,
                    "Stake left pending after planning, dropping from plan"
                );
                dropped.push(stake_id);
                continue;
            }
            stakes.insert(stake_id, stake);
        }

        let applied = if dropped.is_empty() {
            plan.clone()
        } else {
            let set: HashSet<StakeId> = dropped.iter().copied().collect();
            plan.without_stakes(&set)
        };
        let (red, green) = (applied.total_red()?, applied.total_green()?);
        if red != green {
            return Err(EngineError::Invariant(format!(
                "Unbalanced plan for market {market_id}: red {red} green {green}"
            )));
        }

        let mut outcome = ApplyOutcome {
            applied,
            dropped,
            matched_stakes: 0,
            fully_refunded: 0,
            partially_refunded: 0,
            total_refunded: Amount::ZERO,
            credits_per_account: BTreeMap::new(),
            bodies_run: 0,
        };

        let mut updated = Vec::with_capacity(stakes.len());
        for residual in &outcome.applied.residuals {
            let stake = stakes
                .remove(&residual.stake_id)
                .ok_or_else(|| EngineError::Invariant(format!("Stake {} planned twice", residual.stake_id)))?;
            let (stake, refund) = settle_stake(stake, residual, &outcome.applied, now)?;

            if stake.status == StakeStatus::Matched {
                outcome.matched_stakes += 1;
                if !refund.is_zero() {
                    outcome.partially_refunded += 1;
                }
            } else {
                outcome.fully_refunded += 1;
            }
            if !refund.is_zero() {
                let credit = outcome.credits_per_account.entry(stake.account_id).or_insert(Amount::ZERO);
                *credit = credit.checked_add(refund)?;
                outcome.total_refunded = outcome.total_refunded.checked_add(refund)?;
            }
            updated.push(stake);
        }

        // Read every account before writing anything
        let mut accounts = Vec::with_capacity(outcome.credits_per_account.len());
        for (account_id, credit) in &outcome.credits_per_account {
            let mut account = tx
                .read_account(account_id)?
                .ok_or_else(|| EngineError::Invariant(format!("Stake owner {account_id} does not exist")))?;
            account.credit(*credit, now)?;
            accounts.push(account);
        }

        for stake in updated {
            tx.put_stake(stake)?;
        }
        for account in accounts {
            debug!(account_id = %account.account_id, balance = account.balance.as_u64(), "Residual credited");
            tx.put_account(account)?;
        }
        market.status = MarketStatus::Matched;
        tx.put_market(market)?;

        Ok(outcome)
    }
}

/// Apply one stake's share of the plan; returns the stake and its refund
fn settle_stake(
    mut stake: Stake,
    residual: &Residual,
    plan: &MatchingPlan,
    now: i64,
) -> Result<(Stake, Amount), EngineError> {
    if stake.amount != residual.original || stake.side != residual.side {
        return Err(EngineError::Invariant(format!(
            "Stake {} changed since planning: amount {} side {}",
            stake.stake_id, stake.amount, stake.side
        )));
    }

    for fill in plan.fills_for(&residual.stake_id) {
        let counterpart = fill.counterpart_of(&residual.stake_id).ok_or_else(|| {
            EngineError::Invariant(format!("Fill does not involve stake {}", residual.stake_id))
        })?;
        stake.add_fill(counterpart, fill.amount, now)?;
    }
    if stake.matched != residual.matched || !stake.check_invariant() {
        return Err(EngineError::Invariant(format!(
            "Stake {} matched {} but plan says {}",
            stake.stake_id, stake.matched, residual.matched
        )));
    }

    let refund = if stake.matched.is_zero() {
        stake.transition(StakeStatus::Refunded)?;
        stake.amount
    } else {
        stake.transition(StakeStatus::Matched)?;
        stake.residual()
    };
    stake.residual_refunded = !refund.is_zero();
    Ok((stake, refund))
}
