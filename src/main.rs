use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use particula::{config::SimulationConfig, particles};

#[derive(Debug, Parser)]
#[command(author, version, about = "particula particle-life runner")]
struct Cli {
    /// Path to a simulation YAML file (built-in scenario when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override tick count
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override snapshot interval in ticks (0 disables)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_yaml(path)?,
        None => SimulationConfig::particle_life(),
    };

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(interval) = cli.snapshot_interval {
        config.snapshot.every_ticks = interval;
    }
    if let Some(dir) = cli.snapshot_dir {
        config.snapshot.dir = dir.display().to_string();
    }

    let summary = particles::run(&config)?;
    println!(
        "Scenario '{}' completed for {} ticks. {} particles, avg frame {:.3} ms",
        summary.name, summary.ticks, summary.entities, summary.average_delta_ms
    );
    Ok(())
}
