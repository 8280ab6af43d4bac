//! Scenario files: the simulation setup plus how the headless run proceeds.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use outpost_defence_core::{CellCoord, TowerKind};
use outpost_defence_simulation::ScenarioConfig;
use serde::Deserialize;

/// Parsed scenario file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ScenarioFile {
    /// Run length and tick size.
    pub(crate) run: RunSettings,
    /// Towers built before the first tick, in order.
    pub(crate) build: Vec<PlannedTower>,
    /// Simulation setup.
    pub(crate) scenario: ScenarioConfig,
}

impl ScenarioFile {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    /// Parses a scenario from TOML text.
    pub(crate) fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// How many ticks the headless run lasts and how long each one is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct RunSettings {
    pub(crate) ticks: u32,
    pub(crate) tick_ms: u64,
}

impl RunSettings {
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ticks: 3_600,
            tick_ms: 16,
        }
    }
}

/// Tower placed before the session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct PlannedTower {
    pub(crate) kind: TowerKind,
    pub(crate) column: u32,
    pub(crate) row: u32,
}

impl PlannedTower {
    pub(crate) fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}
