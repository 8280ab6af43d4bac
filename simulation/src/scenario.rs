//! Serializable description of a play session.

use std::time::Duration;

use outpost_defence_core::{
    EnemyCatalog, EnemyKind, TileLayer, Tileset, TowerCatalog, TowerKind, WaveComposition,
    WaveTable, WeaponSpec,
};
use outpost_defence_system_path_builder as path_builder;
use outpost_defence_system_wave_director as wave_director;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete description of a session: map, catalogs, economy and waves.
///
/// Every section falls back to its default when omitted, so an empty file
/// describes the stock scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Tile layer the route is derived from.
    pub map: MapConfig,
    /// Money rules.
    pub economy: EconomyConfig,
    /// Wave timings and compositions.
    pub waves: WaveConfig,
    /// Base integrity at the start of the session.
    pub base_integrity: u32,
    /// Player weapon parameters.
    pub weapon: WeaponSpec,
    /// Constructible tower kinds.
    pub towers: TowerCatalog,
    /// Enemy kinds the waves may release.
    pub enemies: EnemyCatalog,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            economy: EconomyConfig::default(),
            waves: WaveConfig::default(),
            base_integrity: 20,
            weapon: WeaponSpec::default(),
            towers: TowerCatalog::default(),
            enemies: EnemyCatalog::default(),
        }
    }
}

/// Tile layer and route extraction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Side length of one tile in pixels.
    pub tile_length: f32,
    /// Tile indices, one vector per row from top to bottom.
    pub rows: Vec<Vec<u32>>,
    /// Meaning of the tile indices.
    pub tileset: Tileset,
    /// Distance on both axes under which waypoints are merged.
    pub dedup_threshold: f32,
    /// Vertical distance grouping points into one row when no start exists.
    pub row_tolerance: f32,
}

impl MapConfig {
    pub(crate) fn layer(&self) -> TileLayer {
        TileLayer::from_rows(self.tile_length, &self.rows)
    }

    pub(crate) fn path_config(&self) -> path_builder::Config {
        path_builder::Config::new(self.dedup_threshold, self.row_tolerance)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        let defaults = path_builder::Config::default();
        Self {
            tile_length: 32.0,
            rows: vec![
                vec![2, 1, 1, 1, 1, 1, 1, 1, 1, 4, 0, 0],
                vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0],
                vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0],
                vec![0, 4, 1, 1, 1, 1, 1, 1, 1, 4, 0, 0],
                vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
                vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
                vec![0, 4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 3],
                vec![0; 12],
            ],
            tileset: Tileset::default(),
            dedup_threshold: defaults.dedup_threshold(),
            row_tolerance: defaults.row_tolerance(),
        }
    }
}

/// Money rules of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance before the first wave.
    pub starting_balance: u32,
    /// Reward multiplier; completing wave `n` credits `n * reward_per_wave`.
    pub reward_per_wave: u32,
    /// Share of the invested money refunded on sale, in percent.
    pub sell_percent: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 500,
            reward_per_wave: 50,
            sell_percent: 50,
        }
    }
}

/// Wave timings and compositions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Preparation time before every wave, in milliseconds.
    pub preparation_ms: u64,
    /// Granularity of the preparation countdown, in milliseconds.
    pub countdown_step_ms: u64,
    /// Remaining preparation time under which the countdown turns urgent.
    pub urgency_window_ms: u64,
    /// Pause after a cleared wave before the next preparation starts.
    pub reward_delay_ms: u64,
    /// Compositions for waves `1..=compositions.len()`.
    pub compositions: Vec<WaveComposition>,
    /// Enemies added to every group per wave past the last composition.
    pub overflow_growth: u32,
}

impl WaveConfig {
    pub(crate) fn table(&self) -> WaveTable {
        WaveTable {
            waves: self.compositions.clone(),
            overflow_growth: self.overflow_growth,
        }
    }

    pub(crate) fn director_config(&self, reward_per_wave: u32) -> wave_director::Config {
        wave_director::Config::new(
            Duration::from_millis(self.preparation_ms),
            Duration::from_millis(self.countdown_step_ms),
            Duration::from_millis(self.urgency_window_ms),
            Duration::from_millis(self.reward_delay_ms),
            reward_per_wave,
            self.table(),
        )
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        let table = WaveTable::default();
        Self {
            preparation_ms: 10_000,
            countdown_step_ms: 1_000,
            urgency_window_ms: 5_000,
            reward_delay_ms: 2_000,
            compositions: table.waves,
            overflow_growth: table.overflow_growth,
        }
    }
}

/// Reasons a scenario is rejected before the session starts.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Tiles must have a positive side length.
    #[error("tile length must be positive, got {0}")]
    InvalidTileLength(f32),
    /// The preparation countdown would never advance.
    #[error("countdown step must be positive")]
    ZeroCountdownStep,
    /// Selling would refund at least the full investment.
    #[error("sell percent must be below 100, got {0}")]
    SellPercentTooHigh(u32),
    /// The base would be destroyed before the first enemy arrives.
    #[error("base integrity must be positive")]
    ZeroBaseIntegrity,
    /// A tower kind has no catalog entry.
    #[error("tower catalog has no entry for {0:?}")]
    MissingTowerKind(TowerKind),
    /// A tower kind costs nothing, so selling it would refund its full price.
    #[error("tower {0:?} has a zero build cost")]
    FreeTower(TowerKind),
    /// A tower kind would fire every tick without pause.
    #[error("tower {0:?} has a zero fire interval")]
    ZeroFireInterval(TowerKind),
    /// A wave releases an enemy kind the catalog does not describe.
    #[error("wave {wave} references unknown enemy kind {kind:?}")]
    UnknownEnemyKind {
        /// One-based wave number holding the reference.
        wave: u32,
        /// Enemy kind missing from the catalog.
        kind: EnemyKind,
    },
}

impl ScenarioConfig {
    /// Checks the scenario for values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.tile_length.is_nan() || self.map.tile_length <= 0.0 {
            return Err(ConfigError::InvalidTileLength(self.map.tile_length));
        }
        if self.waves.countdown_step_ms == 0 {
            return Err(ConfigError::ZeroCountdownStep);
        }
        if self.economy.sell_percent >= 100 {
            return Err(ConfigError::SellPercentTooHigh(self.economy.sell_percent));
        }
        if self.base_integrity == 0 {
            return Err(ConfigError::ZeroBaseIntegrity);
        }

        for kind in TowerKind::ALL {
            let spec = self
                .towers
                .spec(kind)
                .ok_or(ConfigError::MissingTowerKind(kind))?;
            if spec.build_cost == 0 {
                return Err(ConfigError::FreeTower(kind));
            }
            if spec.fire_interval_ms == 0 {
                return Err(ConfigError::ZeroFireInterval(kind));
            }
        }

        for (wave, composition) in (1..).zip(&self.waves.compositions) {
            if let Some(group) = composition
                .groups
                .iter()
                .find(|group| self.enemies.spec(group.kind).is_none())
            {
                return Err(ConfigError::UnknownEnemyKind {
                    wave,
                    kind: group.kind,
                });
            }
        }

        Ok(())
    }
}
