use anyhow::{bail, Context};
use clap::Parser;
use settlement_engine::EngineConfig;
use simulation::{run_scenario, PoolConfig, ScenarioConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Simulate - Randomised concurrent runs of a two-sided market.
#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// RNG seed for the stake pool and outcome
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of markets to run, seeds counting up from --seed
    #[arg(short, long, default_value_t = 1)]
    runs: u64,

    /// Placement threads per market
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    #[arg(long, default_value_t = 16)]
    accounts: usize,

    #[arg(long, default_value_t = 500)]
    stakes: usize,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the last report as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let engine = match &cli.config {
        Some(path) => EngineConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let mut last = None;
    for seed in cli.seed..cli.seed.saturating_add(cli.runs) {
        let config = ScenarioConfig {
            seed,
            threads: cli.threads,
            pool: PoolConfig {
                accounts: cli.accounts,
                stakes: cli.stakes,
                ..PoolConfig::default()
            },
            engine: engine.clone(),
        };
        let report = run_scenario(&config).with_context(|| format!("scenario with seed {seed}"))?;
        if !report.is_conserved() {
            bail!("money not conserved for seed {seed}: {}", report.to_json()?);
        }
        last = Some(report);
    }

    if let Some(report) = last {
        match &cli.output {
            Some(path) => report
                .write_to_file(path)
                .with_context(|| format!("writing {}", path.display()))?,
            None => println!("{}", report.to_json()?),
        }
    }
    Ok(())
}
