//! Concurrent market scenario
//!
//! Funds accounts, places a generated stake pool from several threads at
//! once, closes and matches the market, resolves it with a random outcome,
//! and reports whether money was conserved.

use settlement_engine::{EngineConfig, EngineError, InMemoryLedger, StakeEngine};
use std::thread;
use std::time::Instant;
use tracing::info;
use types::ids::{AccountId, MarketId};
use types::money::Amount;
use types::stake::StakeStatus;

use crate::generator::{GeneratedStake, PoolConfig, StakePoolGenerator};
use crate::report::ScenarioReport;

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub threads: usize,
    pub pool: PoolConfig,
    pub engine: EngineConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            threads: 4,
            pool: PoolConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PlacementTally {
    placed: usize,
    rejected: usize,
}

fn place_chunk(
    engine: &StakeEngine<InMemoryLedger>,
    accounts: &[AccountId],
    market: &MarketId,
    stakes: &[GeneratedStake],
) -> Result<PlacementTally, EngineError> {
    let mut tally = PlacementTally::default();
    for stake in stakes {
        match engine.place_stake(&accounts[stake.account], market, stake.side, stake.amount) {
            Ok(_) => tally.placed += 1,
            // accounts run dry under random pools
            Err(err) if err.is_validation() => tally.rejected += 1,
            Err(err) => return Err(err),
        }
    }
    Ok(tally)
}

fn total_balance(engine: &StakeEngine<InMemoryLedger>, accounts: &[AccountId]) -> u64 {
    accounts
        .iter()
        .filter_map(|a| engine.store().account(a))
        .map(|a| a.balance.as_u64())
        .sum()
}

/// Run one market end to end
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioReport, EngineError> {
    let started = Instant::now();
    let engine = StakeEngine::in_memory(config.engine.clone());
    let mut generator = StakePoolGenerator::new(config.pool.clone(), config.seed);

    let accounts = (0..config.pool.accounts.max(1))
        .map(|_| engine.open_account(Amount::new(config.pool.opening_balance)))
        .collect::<Result<Vec<_>, _>>()?;
    let opening_total = total_balance(&engine, &accounts);
    let market = engine.open_market()?;

    let pool = generator.generate();
    let threads = config.threads.max(1);
    let chunk_size = pool.len().div_ceil(threads).max(1);

    let tally = thread::scope(|scope| {
        let handles: Vec<_> = pool
            .chunks(chunk_size)
            .map(|chunk| {
                let (engine, accounts, market) = (&engine, &accounts, &market);
                scope.spawn(move || place_chunk(engine, accounts, market, chunk))
            })
            .collect();

        let mut tally = PlacementTally::default();
        for handle in handles {
            let part = handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
            tally.placed += part.placed;
            tally.rejected += part.rejected;
        }
        Ok::<_, EngineError>(tally)
    })?;
    info!(
        seed = config.seed,
        placed = tally.placed,
        rejected = tally.rejected,
        "Stake pool placed"
    );

    let matching = engine.close_and_match(&market)?;
    let outcome = generator.outcome();
    let summary = engine.resolve_market(&market, outcome)?;

    let stakes = engine.store().stakes_for_market(&market);
    let forfeited: u64 = stakes
        .iter()
        .filter(|s| s.status == StakeStatus::Lost)
        .map(|s| s.matched.as_u64())
        .sum();
    let profit_paid: u64 = stakes
        .iter()
        .filter(|s| s.status == StakeStatus::Won)
        .map(|s| s.profit.as_u64())
        .sum();

    let report = ScenarioReport {
        version: crate::VERSION.to_string(),
        seed: config.seed,
        threads,
        stakes_generated: generator.stakes_generated,
        stakes_placed: tally.placed,
        stakes_rejected: tally.rejected,
        matching,
        outcome,
        total_paid: summary.total_paid,
        opening_total,
        closing_total: total_balance(&engine, &accounts),
        forfeited,
        profit_paid,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        seed = report.seed,
        outcome = %report.outcome,
        conserved = report.is_conserved(),
        platform_net = report.platform_net() as i64,
        "Scenario complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64, threads: usize) -> ScenarioConfig {
        ScenarioConfig {
            seed,
            threads,
            pool: PoolConfig {
                accounts: 4,
                stakes: 60,
                opening_balance: 2_000,
                ..PoolConfig::default()
            },
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_single_thread_scenario() {
        let report = run_scenario(&small(1, 1)).unwrap();
        assert!(report.is_conserved());
        assert_eq!(report.stakes_generated, 60);
        assert_eq!(report.stakes_placed + report.stakes_rejected, 60);
        assert!(report.matching.is_balanced());
    }

    #[test]
    fn test_empty_pool() {
        let mut config = small(2, 2);
        config.pool.stakes = 0;
        let report = run_scenario(&config).unwrap();
        assert_eq!(report.stakes_placed, 0);
        assert_eq!(report.closing_total, report.opening_total);
    }
}
