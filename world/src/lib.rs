#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Outpost Defence.
//!
//! The world owns the economy ledger, the tower registry, the enemy
//! population, projectiles in flight, the base and the player's weapon.
//! Systems mutate it exclusively through [`apply`]; player requests go through
//! [`place_tower`], [`upgrade_tower`], [`sell_tower`] and
//! [`fire_player_weapon`], each of which either succeeds completely or leaves
//! the world untouched.

mod economy;
mod enemies;
mod projectiles;
mod towers;
mod weapon;

use std::time::Duration;

use glam::Vec2;
use outpost_defence_core::{
    CellCoord, Command, EnemyCatalog, EnemyId, EnemyKind, Event, PlacementError, ProjectileId,
    Route, SellError, SpawnError, TileLayer, TowerCatalog, TowerId, TowerKind, UpgradeError,
    WeaponError, WeaponSpec, EMPTY_TILE, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

use crate::{
    economy::Ledger,
    enemies::{EnemyPopulation, Leak},
    projectiles::{Kill, Launch, ProjectileSystem},
    towers::TowerRegistry,
    weapon::PlayerWeapon,
};

const DEFAULT_STARTING_BALANCE: u32 = 500;
const DEFAULT_SELL_PERCENT: u32 = 50;
const DEFAULT_BASE_INTEGRITY: u32 = 20;

/// Static inputs required to construct a world.
#[derive(Clone, Debug)]
pub struct Config {
    layer: TileLayer,
    route: Route,
    tower_catalog: TowerCatalog,
    enemy_catalog: EnemyCatalog,
    starting_balance: u32,
    sell_percent: u32,
    base_integrity: u32,
    weapon: WeaponSpec,
}

impl Config {
    /// Creates a configuration for the provided map and its route, using the
    /// default catalogs and economy.
    #[must_use]
    pub fn new(layer: TileLayer, route: Route) -> Self {
        Self {
            layer,
            route,
            tower_catalog: TowerCatalog::default(),
            enemy_catalog: EnemyCatalog::default(),
            starting_balance: DEFAULT_STARTING_BALANCE,
            sell_percent: DEFAULT_SELL_PERCENT,
            base_integrity: DEFAULT_BASE_INTEGRITY,
            weapon: WeaponSpec::default(),
        }
    }

    /// Replaces the tower catalog.
    #[must_use]
    pub fn with_tower_catalog(mut self, catalog: TowerCatalog) -> Self {
        self.tower_catalog = catalog;
        self
    }

    /// Replaces the enemy catalog.
    #[must_use]
    pub fn with_enemy_catalog(mut self, catalog: EnemyCatalog) -> Self {
        self.enemy_catalog = catalog;
        self
    }

    /// Sets the balance the ledger starts with.
    #[must_use]
    pub fn with_starting_balance(mut self, balance: u32) -> Self {
        self.starting_balance = balance;
        self
    }

    /// Sets the share of the invested money refunded on sale, in percent.
    ///
    /// Values of 100 or more are clamped to 99 so a sale always loses money.
    #[must_use]
    pub fn with_sell_percent(mut self, percent: u32) -> Self {
        self.sell_percent = percent.min(99);
        self
    }

    /// Sets the integrity the base starts with.
    #[must_use]
    pub fn with_base_integrity(mut self, integrity: u32) -> Self {
        self.base_integrity = integrity;
        self
    }

    /// Replaces the player's weapon description.
    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponSpec) -> Self {
        self.weapon = weapon;
        self
    }
}

/// Represents the authoritative Outpost Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    layer: TileLayer,
    route: Route,
    tower_catalog: TowerCatalog,
    enemy_catalog: EnemyCatalog,
    sell_percent: u32,
    ledger: Ledger,
    towers: TowerRegistry,
    enemies: EnemyPopulation,
    projectiles: ProjectileSystem,
    weapon: PlayerWeapon,
    base_integrity: u32,
    scratch_leaks: Vec<Leak>,
    scratch_kills: Vec<Kill>,
}

impl World {
    /// Creates a world ready for simulation from the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            banner: WELCOME_BANNER,
            layer: config.layer,
            route: config.route,
            tower_catalog: config.tower_catalog,
            enemy_catalog: config.enemy_catalog,
            sell_percent: config.sell_percent,
            ledger: Ledger::new(config.starting_balance),
            towers: TowerRegistry::new(),
            enemies: EnemyPopulation::new(),
            projectiles: ProjectileSystem::new(),
            weapon: PlayerWeapon::new(config.weapon),
            base_integrity: config.base_integrity,
            scratch_leaks: Vec::new(),
            scratch_kills: Vec::new(),
        }
    }

    fn is_defeated(&self) -> bool {
        self.base_integrity == 0
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.scratch_leaks.clear();
        self.enemies
            .advance(dt.as_secs_f32(), &self.route, &mut self.scratch_leaks);

        for index in 0..self.scratch_leaks.len() {
            let leak = self.scratch_leaks[index];
            debug!(enemy = leak.enemy.get(), "enemy reached the base");
            out_events.push(Event::EnemyReachedBase { enemy: leak.enemy });
            self.damage_base(leak.base_damage, out_events);
        }
    }

    fn damage_base(&mut self, damage: u32, out_events: &mut Vec<Event>) {
        if self.is_defeated() {
            return;
        }

        let damage = damage.min(self.base_integrity);
        self.base_integrity -= damage;
        out_events.push(Event::BaseDamaged {
            damage,
            integrity: self.base_integrity,
        });

        if self.is_defeated() {
            info!("base destroyed");
            out_events.push(Event::BaseDestroyed);
        }
    }

    fn resolve_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.scratch_kills.clear();
        self.projectiles.advance(
            dt.as_secs_f32(),
            self.layer.grid(),
            &mut self.enemies,
            &mut self.scratch_kills,
        );

        for index in 0..self.scratch_kills.len() {
            let kill = self.scratch_kills[index];
            if let Some(tower) = kill.owner.and_then(|owner| self.towers.get_mut(owner)) {
                tower.kill_count = tower.kill_count.saturating_add(1);
            }
            debug!(enemy = kill.enemy.get(), kind = ?kill.kind, "enemy killed");
            out_events.push(Event::EnemyKilled {
                enemy: kill.enemy,
                kind: kill.kind,
                reward: kill.reward,
            });
            credit(&mut self.ledger, kill.reward, out_events);
        }

        self.enemies.compact();
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SpawnError> {
        let spec = self
            .enemy_catalog
            .spec(kind)
            .ok_or(SpawnError::UnknownKind)?;
        let enemy = self.enemies.spawn(spec, &self.route)?;
        debug!(enemy = enemy.get(), ?kind, "enemy spawned");
        out_events.push(Event::EnemySpawned { enemy, kind });
        Ok(())
    }

    fn fire_tower(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        if !state.cooldown.is_zero() {
            return;
        }
        let Some(enemy) = self.enemies.alive(target) else {
            return;
        };
        let Some(spec) = self.tower_catalog.spec(state.kind) else {
            return;
        };

        let projectile = self.projectiles.launch(Launch {
            owner: Some(tower),
            origin: state.position,
            heading: enemy.position - state.position,
            speed: spec.projectile_speed,
            homing_target: spec.homing.then_some(target),
            damage: state.damage,
            piercing: spec.piercing,
            radius: spec.projectile_radius,
        });
        state.cooldown = state.fire_interval;
        out_events.push(Event::ProjectileFired {
            projectile,
            tower: Some(tower),
        });
    }
}

fn credit(ledger: &mut Ledger, amount: u32, out_events: &mut Vec<Event>) {
    if amount == 0 {
        return;
    }
    ledger.credit(amount);
    out_events.push(Event::MoneyChanged {
        amount: i64::from(amount),
        total: ledger.balance(),
    });
}

fn debit(ledger: &mut Ledger, amount: u32, out_events: &mut Vec<Event>) -> bool {
    if !ledger.debit(amount) {
        return false;
    }
    if amount > 0 {
        out_events.push(Event::MoneyChanged {
            amount: -i64::from(amount),
            total: ledger.balance(),
        });
    }
    true
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the base has been destroyed every command is ignored.
///
/// # Errors
///
/// Returns a [`SpawnError`] when a spawn request cannot be honoured.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SpawnError> {
    if world.is_defeated() {
        return Ok(());
    }

    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.towers.cool_down(dt);
            world.weapon.cool_down(dt);
            world.advance_enemies(dt, out_events);
        }
        Command::ResolveProjectiles { dt } => world.resolve_projectiles(dt, out_events),
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events)?,
        Command::FireProjectile { tower, target } => world.fire_tower(tower, target, out_events),
        Command::CreditWaveReward { wave, amount } => {
            info!(wave, amount, "wave reward credited");
            credit(&mut world.ledger, amount, out_events);
        }
    }

    Ok(())
}

/// Builds a tower of the provided kind on a free, off-route cell.
///
/// # Errors
///
/// Checks run in order: [`PlacementError::OutOfBounds`],
/// [`PlacementError::CellOccupied`], [`PlacementError::PathTile`],
/// [`PlacementError::UnavailableKind`], then
/// [`PlacementError::InsufficientFunds`]. A rejected request changes nothing.
pub fn place_tower(
    world: &mut World,
    kind: TowerKind,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<TowerId, PlacementError> {
    let result = try_place_tower(world, kind, cell, out_events);
    if let Err(error) = &result {
        warn!(?kind, column = cell.column(), row = cell.row(), %error, "tower placement rejected");
    }
    result
}

fn try_place_tower(
    world: &mut World,
    kind: TowerKind,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<TowerId, PlacementError> {
    let grid = *world.layer.grid();
    if !grid.contains_cell(cell) {
        return Err(PlacementError::OutOfBounds);
    }
    if world.towers.occupant(cell).is_some() {
        return Err(PlacementError::CellOccupied);
    }
    if world.layer.tile(cell) != EMPTY_TILE || world.route.contains_cell(cell) {
        return Err(PlacementError::PathTile);
    }
    let spec = world
        .tower_catalog
        .spec(kind)
        .ok_or(PlacementError::UnavailableKind)?;
    if !debit(&mut world.ledger, spec.build_cost, out_events) {
        return Err(PlacementError::InsufficientFunds);
    }

    let tower = world.towers.insert(spec, cell, grid.cell_center(cell));
    debug!(tower = tower.get(), ?kind, "tower placed");
    out_events.push(Event::TowerPlaced { tower, kind, cell });
    Ok(tower)
}

/// Raises a tower to its next level, returning the level reached.
///
/// # Errors
///
/// Returns [`UpgradeError::UnknownTower`] for unknown identifiers,
/// [`UpgradeError::MaxLevel`] once the upgrade curve is exhausted and
/// [`UpgradeError::InsufficientFunds`] when the ledger cannot cover the tier.
pub fn upgrade_tower(
    world: &mut World,
    tower: TowerId,
    out_events: &mut Vec<Event>,
) -> Result<u8, UpgradeError> {
    let result = try_upgrade_tower(world, tower, out_events);
    if let Err(error) = &result {
        warn!(tower = tower.get(), %error, "tower upgrade rejected");
    }
    result
}

fn try_upgrade_tower(
    world: &mut World,
    tower: TowerId,
    out_events: &mut Vec<Event>,
) -> Result<u8, UpgradeError> {
    let state = world
        .towers
        .get_mut(tower)
        .ok_or(UpgradeError::UnknownTower)?;
    let tier = world
        .tower_catalog
        .spec(state.kind)
        .and_then(|spec| spec.tier_after(state.level))
        .ok_or(UpgradeError::MaxLevel)?;
    if !debit(&mut world.ledger, tier.cost, out_events) {
        return Err(UpgradeError::InsufficientFunds);
    }

    state.level = state.level.saturating_add(1);
    state.damage = state.damage.saturating_add(tier.damage_bonus);
    state.range += tier.range_bonus;
    state.invested = state.invested.saturating_add(tier.cost);
    debug!(tower = tower.get(), level = state.level, "tower upgraded");
    out_events.push(Event::TowerUpgraded {
        tower,
        level: state.level,
    });
    Ok(state.level)
}

/// Removes a tower, frees its cell and refunds part of the money invested.
///
/// # Errors
///
/// Returns [`SellError::UnknownTower`] for unknown or already sold towers.
pub fn sell_tower(
    world: &mut World,
    tower: TowerId,
    out_events: &mut Vec<Event>,
) -> Result<u32, SellError> {
    let Some(state) = world.towers.remove(tower) else {
        warn!(tower = tower.get(), "tower sale rejected");
        return Err(SellError::UnknownTower);
    };

    let refund = u64::from(state.invested) * u64::from(world.sell_percent) / 100;
    let value = u32::try_from(refund).unwrap_or(u32::MAX);
    credit(&mut world.ledger, value, out_events);
    debug!(tower = tower.get(), value, "tower sold");
    out_events.push(Event::TowerSold { tower, value });
    Ok(value)
}

/// Fires the player's weapon from `origin` towards `aim`.
///
/// # Errors
///
/// Returns [`WeaponError::CoolingDown`] while the previous shot's cooldown
/// runs and [`WeaponError::ZeroAim`] when `aim` equals `origin`.
pub fn fire_player_weapon(
    world: &mut World,
    origin: Vec2,
    aim: Vec2,
    out_events: &mut Vec<Event>,
) -> Result<ProjectileId, WeaponError> {
    let heading = world.weapon.trigger(origin, aim)?;
    let spec = world.weapon.spec;
    let projectile = world.projectiles.launch(Launch {
        owner: None,
        origin,
        heading,
        speed: spec.projectile_speed,
        homing_target: None,
        damage: spec.damage,
        piercing: spec.piercing,
        radius: spec.projectile_radius,
    });
    out_events.push(Event::ProjectileFired {
        projectile,
        tower: None,
    });
    Ok(projectile)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use outpost_defence_core::{
        CellCoord, EnemyView, ProjectileSnapshot, Route, TileGrid, TowerCooldownView, TowerId,
        TowerSnapshot, TowerView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid definition.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        world.layer.grid()
    }

    /// Provides read-only access to the route enemies follow.
    #[must_use]
    pub fn route(world: &World) -> &Route {
        &world.route
    }

    /// Current money balance.
    #[must_use]
    pub fn balance(world: &World) -> u32 {
        world.ledger.balance()
    }

    /// Integrity the base has left.
    #[must_use]
    pub fn base_integrity(world: &World) -> u32 {
        world.base_integrity
    }

    /// Reports whether the base was destroyed, ending the session.
    #[must_use]
    pub fn is_defeated(world: &World) -> bool {
        world.is_defeated()
    }

    /// Captures a read-only view of every alive enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter_alive().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of alive enemies on the field.
    #[must_use]
    pub fn alive_enemy_count(world: &World) -> usize {
        world.enemies.alive_count()
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn towers(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a single tower, if it exists.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(tower).map(|state| state.snapshot())
    }

    /// Tower standing on the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.occupant(cell)
    }

    /// Captures the cooldown state of every tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown_snapshot())
                .collect(),
        )
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.snapshots()
    }

    /// Time left before the player's weapon may fire again.
    #[must_use]
    pub fn weapon_ready_in(world: &World) -> Duration {
        world.weapon.ready_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_defence_core::{Waypoint, WaypointKind};

    fn world() -> World {
        let layer = TileLayer::from_rows(32.0, &[vec![2, 1, 1, 3], vec![0, 0, 0, 0]]);
        let route = Route::new(vec![
            Waypoint::new(Vec2::new(16.0, 16.0), CellCoord::new(0, 0), WaypointKind::Start),
            Waypoint::new(Vec2::new(112.0, 16.0), CellCoord::new(3, 0), WaypointKind::End),
        ]);
        World::new(Config::new(layer, route))
    }

    #[test]
    fn tick_emits_time_advanced() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        )
        .expect("tick never fails");
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }

    #[test]
    fn path_tiles_are_not_buildable_even_when_merged_out_of_the_route() {
        let mut world = world();
        let mut events = Vec::new();
        let result = place_tower(&mut world, TowerKind::Basic, CellCoord::new(1, 0), &mut events);
        assert_eq!(result, Err(PlacementError::PathTile));
        assert!(events.is_empty());
    }

    #[test]
    fn commands_are_ignored_after_defeat() {
        let mut world = world();
        world.base_integrity = 0;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Scout,
            },
            &mut events,
        )
        .expect("ignored");
        assert!(events.is_empty());
        assert_eq!(query::alive_enemy_count(&world), 0);
    }

    #[test]
    fn sell_percent_is_clamped_below_full_refund() {
        let layer = TileLayer::from_rows(32.0, &[vec![2, 3]]);
        let config = Config::new(layer, Route::empty()).with_sell_percent(150);
        assert_eq!(config.sell_percent, 99);
    }
}
