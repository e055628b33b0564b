#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays headless snake episodes with the
//! navigation engine and prints one summary line per episode.

mod config;
mod logging;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use snake_pilot_system_navigation::FallbackPolicy;
use tracing::info;

use crate::{config::SimulationConfig, simulation::Simulation};

/// Command-line arguments; every flag overrides the config file.
#[derive(Debug, Parser)]
#[command(
    name = "snake-pilot",
    version,
    about = "Headless snake simulation driven by the navigation engine"
)]
struct Cli {
    /// TOML file with simulation and `[engine]` settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Grid width in cells.
    #[arg(long)]
    width: Option<u32>,
    /// Grid height in cells.
    #[arg(long)]
    height: Option<u32>,
    /// Number of episodes to play.
    #[arg(long)]
    episodes: Option<u64>,
    /// Seed for food placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Ticks after which an episode is abandoned.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Policy used when no certified route is available.
    #[arg(long, value_enum)]
    fallback: Option<FallbackArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FallbackArg {
    CycleFollower,
    Shortcut,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::CycleFollower => Self::CycleFollower,
            FallbackArg::Shortcut => Self::Shortcut,
        }
    }
}

impl Cli {
    /// Loads the config file, if any, and applies the flags on top.
    fn resolve(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks;
        }
        if let Some(fallback) = self.fallback {
            config.engine.fallback = fallback.into();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Entry point for the snake-pilot command-line interface.
fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Cli::parse().resolve()?;
    info!(
        width = config.width,
        height = config.height,
        episodes = config.episodes,
        seed = config.seed,
        "starting simulation"
    );

    let mut simulation = Simulation::new(&config)?;
    for episode in 0..config.episodes {
        let summary = simulation.run_episode(episode)?;
        println!("{summary}");
    }

    Ok(())
}
