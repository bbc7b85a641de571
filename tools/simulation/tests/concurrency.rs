//! Concurrency test
//!
//! Runs whole markets with stakes placed from many threads against shared
//! accounts and checks the ledger still balances.

use proptest::prelude::*;
use settlement_engine::config::{EngineConfig, RetryConfig};
use simulation::{run_scenario, PoolConfig, ScenarioConfig};
use std::thread;
use types::market::Outcome;

fn contended(seed: u64, threads: usize) -> ScenarioConfig {
    ScenarioConfig {
        seed,
        threads,
        pool: PoolConfig {
            accounts: 3,
            stakes: 200,
            opening_balance: 20_000,
            ..PoolConfig::default()
        },
        engine: EngineConfig {
            retry: RetryConfig {
                max_attempts: 100,
                base_delay_ms: 1,
                max_delay_ms: 10,
                jitter_pct: 0.5,
            },
            ..EngineConfig::default()
        },
    }
}

#[test]
fn test_many_threads_few_accounts() {
    let report = run_scenario(&contended(7, 8)).unwrap();
    assert!(report.is_conserved(), "{:?}", report);
    assert_eq!(report.stakes_placed + report.stakes_rejected, 200);
    assert!(report.matching.is_balanced());
    assert_eq!(report.matching.dropped_stakes, 0);
}

#[test]
fn test_concurrent_markets() {
    let handles: Vec<_> = (0..4u64)
        .map(|seed| thread::spawn(move || run_scenario(&contended(seed, 2)).unwrap()))
        .collect();

    for handle in handles {
        let report = handle.join().unwrap();
        assert!(report.is_conserved());
        if report.outcome == Outcome::Void {
            assert_eq!(report.closing_total, report.opening_total);
        }
    }
}

#[test]
fn test_report_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = run_scenario(&contended(11, 2)).unwrap();
    report.write_to_file(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: simulation::ScenarioReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.seed, 11);
    assert_eq!(parsed.closing_total, report.closing_total);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_any_seed_conserves_money(seed in any::<u64>(), threads in 1usize..4) {
        let report = run_scenario(&contended(seed, threads)).unwrap();
        prop_assert!(report.is_conserved());
    }
}
