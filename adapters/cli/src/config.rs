//! Simulation settings read from a TOML file.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use snake_pilot_system_navigation::EngineConfig;

/// Arena width used by the original game window (640 px / 20 px blocks).
const DEFAULT_WIDTH: u32 = 32;
/// Arena height used by the original game window (480 px / 20 px blocks).
const DEFAULT_HEIGHT: u32 = 24;
const DEFAULT_MAX_TICKS: u64 = 1_000_000;
/// Largest board accepted; every per-cell buffer is sized from this.
const MAX_CELLS: u64 = 1 << 20;

/// Everything a headless run needs: board, episode schedule and engine.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) episodes: u64,
    pub(crate) seed: u64,
    pub(crate) max_ticks: u64,
    pub(crate) engine: EngineConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            episodes: 1,
            seed: 0,
            max_ticks: DEFAULT_MAX_TICKS,
            engine: EngineConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Loads a configuration file; missing keys keep their defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse simulation config toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine would otherwise silently misbehave on.
    pub(crate) fn validate(&self) -> Result<()> {
        let cells = u64::from(self.width) * u64::from(self.height);
        ensure!(
            cells <= MAX_CELLS,
            "a {}x{} grid has {cells} cells, more than the {MAX_CELLS} supported",
            self.width,
            self.height
        );
        let fraction = self.engine.explore_fraction;
        ensure!(
            fraction.is_finite() && fraction >= 0.0,
            "explore_fraction must be a non-negative number, got {fraction}"
        );
        let threshold = self.engine.planner.min_reachable_fraction;
        ensure!(
            (0.0..=1.0).contains(&threshold),
            "min_reachable_fraction must lie in [0, 1], got {threshold}"
        );
        Ok(())
    }
}
