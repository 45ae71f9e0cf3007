use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use antforage::config::SimulationConfig;
use antforage::scenario::SerializedScenario;
use antforage::simulation::Simulation;
use clap::Parser;

/// Command-line arguments for antforage.
#[derive(Parser)]
#[command(name = "antforage", version, about = "Ant colony foraging simulation")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random number generator. Overrides the config.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many ticks even if food remains.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write the initial world layout to this file before running.
    #[arg(long)]
    save_scenario: Option<PathBuf>,

    /// Build the world from a saved layout instead of the config's scenario.
    #[arg(long)]
    load_scenario: Option<PathBuf>,

    /// Log a progress line every N ticks (0 disables).
    #[arg(long, default_value_t = 100)]
    log_every: u64,

    /// Write the final statistics to this file as TOML.
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Loads the simulation configuration from a TOML file or uses defaults.
fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = SimulationConfig::load(path)?;
            tracing::info!(path = %path.display(), "Loaded config");
            config
        }
        None => {
            tracing::info!("No config file provided, using defaults");
            SimulationConfig::default()
        }
    };

    if let Some(path) = &cli.load_scenario {
        config = SerializedScenario::load(path)?.into_config(config)?;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.max_ticks.is_some() {
        config.max_ticks = cli.max_ticks;
    }
    tracing::debug!(?config, "Effective config");
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let mut sim = Simulation::new(config).context("failed to build simulation")?;

    if let Some(path) = &cli.save_scenario {
        SerializedScenario::from(&sim).save(path)?;
    }

    while sim.is_running() {
        sim.step();
        if cli.log_every > 0 && sim.tick % cli.log_every == 0 {
            let stats = sim.stats();
            tracing::info!(
                tick = stats.tick,
                food_stock = stats.food_stock,
                food_picked = stats.food_picked(),
                population = stats.population(),
                food_markers = stats.food_markers,
                danger_markers = stats.danger_markers,
                "Progress"
            );
        }
    }

    let stats = sim.stats();
    for colony in &stats.colonies {
        tracing::info!(
            colony = colony.colony_id,
            food_picked = colony.food_picked,
            population = colony.population,
            warriors = colony.warriors,
            "Colony summary"
        );
    }
    tracing::info!(
        tick = stats.tick,
        food_left = stats.food_stock,
        avoidance_exhausted = stats.avoidance_exhausted,
        kills = stats.kills,
        "Simulation finished"
    );

    if let Some(path) = &cli.stats_out {
        let content = toml::to_string_pretty(&stats).context("failed to serialize stats")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write stats to '{}'", path.display()))?;
    }
    Ok(())
}
