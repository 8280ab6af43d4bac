#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outpost Defence simulation.
//!
//! This crate defines the message surface that connects the scene driver,
//! the authoritative world, and pure systems. Systems observe immutable views
//! of the world and answer with [`Command`] batches; the world executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values that
//! the excluded presentation layers (HUD, audio, camera) drain once per tick.

pub mod catalog;
pub mod errors;
pub mod route;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use catalog::{
    EnemyCatalog, EnemyKind, EnemySpec, SpawnGroup, TowerCatalog, TowerKind, TowerSpec,
    UpgradeTier, WaveComposition, WaveTable, WeaponSpec, MAX_OVERFLOW_GROUP_SIZE,
};
pub use errors::{
    PathError, PlacementError, SellError, SpawnError, UpgradeError, WeaponError,
};
pub use route::{Route, TileLayer, Tileset, Waypoint, WaypointKind, EMPTY_TILE};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Outpost Defence.";

/// Lifecycle phase of the wave currently driven by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Countdown before the wave's enemies are released.
    Preparation,
    /// Enemies of the wave are being requested from the population.
    Spawning,
    /// Every enemy has been requested; waiting for the field to clear.
    Combat,
    /// The wave was cleared and its reward is being paid out.
    Reward,
}

/// Commands that express the world mutations systems may request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances enemies along the route and counts down every cooldown.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Advances in-flight projectiles, resolves their hits and removes the
    /// enemies that died or leaked during the tick.
    ResolveProjectiles {
        /// Duration of simulated time the projectiles travel for.
        dt: Duration,
    },
    /// Requests that a new enemy enters the route at the spawn point.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Requests that a ready tower launches a projectile at an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy selected as the projectile's target.
        target: EnemyId,
    },
    /// Requests that the reward for a cleared wave is credited.
    CreditWaveReward {
        /// Wave number that was cleared.
        wave: u32,
        /// Amount of money to credit.
        amount: u32,
    },
}

/// Events broadcast to presentation layers after the simulation mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the wave director entered a new phase.
    WavePhaseChanged {
        /// Wave the phase belongs to.
        wave: u32,
        /// Phase that became active.
        phase: WavePhase,
    },
    /// Reports a step of the preparation countdown.
    PreparationCountdown {
        /// Wave that is being prepared.
        wave: u32,
        /// Time left before spawning begins.
        remaining: Duration,
        /// Set during the final seconds of the countdown.
        urgent: bool,
    },
    /// Announces that the enemies of a wave are being released.
    WaveStarted {
        /// Number of the wave that started.
        wave: u32,
    },
    /// Announces that every enemy of a wave was resolved.
    WaveCompleted {
        /// Number of the wave that completed.
        wave: u32,
    },
    /// Confirms that an enemy entered the route.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
    },
    /// Confirms that an enemy was destroyed by a projectile.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Kind of the destroyed enemy.
        kind: EnemyKind,
        /// Money credited for the kill.
        reward: u32,
    },
    /// Reports that an enemy reached the base without being destroyed.
    EnemyReachedBase {
        /// Identifier of the leaked enemy.
        enemy: EnemyId,
    },
    /// Reports that a leaked enemy damaged the base.
    BaseDamaged {
        /// Integrity removed by the enemy.
        damage: u32,
        /// Integrity left after the hit.
        integrity: u32,
    },
    /// The base integrity reached zero; the session is over.
    BaseDestroyed,
    /// Reports a change of the money balance.
    MoneyChanged {
        /// Signed amount applied to the balance.
        amount: i64,
        /// Balance after the change.
        total: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of the tower.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u8,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Money credited for the sale.
        value: u32,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired it; `None` for the player's weapon.
        tower: Option<TowerId>,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Describes the discrete tile layout of the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid measured in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains_cell(&self, cell: CellCoord) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    /// Reports whether a world-space point lies inside the grid rectangle.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width() && point.y <= self.height()
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column as f32 + 0.5) * self.tile_length,
            (cell.row as f32 + 0.5) * self.tile_length,
        )
    }
}

/// Outcome of applying damage to a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DamageResult {
    /// Health actually removed, never more than the health before the hit.
    pub dealt: u32,
    /// Indicates whether the hit destroyed the enemy.
    pub killed: bool,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// World-space position of the enemy.
    pub position: Vec2,
    /// Distance travelled along the route in pixels.
    pub progress: f32,
    /// Remaining health.
    pub health: u32,
}

/// Read-only snapshot describing every alive enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the registry.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// World-space centre of the tower.
    pub position: Vec2,
    /// Targeting radius in pixels, including upgrades.
    pub range: f32,
    /// Current upgrade level, starting at one.
    pub level: u8,
    /// Number of enemies destroyed by the tower's projectiles.
    pub kill_count: u32,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Time left before the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only view of tower cooldowns sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether the tower finished its cooldown. Unknown towers are
    /// never ready.
    #[must_use]
    pub fn is_ready(&self, tower: TowerId) -> bool {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.tower)
            .ok()
            .is_some_and(|index| self.snapshots[index].ready_in.is_zero())
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile; `None` for the player's weapon.
    pub owner: Option<TowerId>,
    /// World-space position of the projectile.
    pub position: Vec2,
    /// Collision radius in pixels.
    pub radius: f32,
}

/// Target assignment produced by the tower targeting system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that should engage.
    pub tower: TowerId,
    /// Enemy selected as the tower's target.
    pub enemy: EnemyId,
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, PlacementError, TileGrid, TowerId, TowerKind};
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn tower_kind_round_trips_through_bincode() {
        assert_round_trip(&TowerKind::Cannon);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::CellOccupied);
    }

    #[test]
    fn cell_center_sits_in_the_middle_of_the_tile() {
        let grid = TileGrid::new(10, 8, 32.0);
        assert_eq!(grid.cell_center(CellCoord::new(0, 0)), Vec2::new(16.0, 16.0));
        assert_eq!(grid.cell_center(CellCoord::new(3, 2)), Vec2::new(112.0, 80.0));
    }

    #[test]
    fn grid_bounds_cover_cells_and_points() {
        let grid = TileGrid::new(4, 3, 10.0);
        assert!(grid.contains_cell(CellCoord::new(3, 2)));
        assert!(!grid.contains_cell(CellCoord::new(4, 0)));
        assert!(grid.contains_point(Vec2::new(40.0, 30.0)));
        assert!(!grid.contains_point(Vec2::new(-0.5, 5.0)));
        assert!(!grid.contains_point(Vec2::new(5.0, 30.5)));
    }
}
