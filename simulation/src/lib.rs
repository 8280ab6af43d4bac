#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order simulation loop that wires the world to its systems.
//!
//! A [`Simulation`] owns the authoritative world and every pure system. Each
//! call to [`Simulation::tick`] runs the same sequence: the wave director
//! releases spawns and rewards, the world advances enemies and cooldowns,
//! towers pick targets and fire, and finally projectiles resolve their hits.
//! Events produced along the way queue up until [`Simulation::drain_events`]
//! hands them to the presentation layer.

mod scenario;

use std::time::Duration;

use glam::Vec2;
use outpost_defence_core::{
    CellCoord, Command, EnemyView, Event, PathError, PlacementError, ProjectileId,
    ProjectileSnapshot, Route, SellError, SpawnError, TowerId, TowerKind, TowerTarget, TowerView,
    UpgradeError, WeaponError,
};
use outpost_defence_system_path_builder::PathBuilder;
use outpost_defence_system_tower_targeting::TowerTargeting;
use outpost_defence_system_wave_director::WaveDirector;
use outpost_defence_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info};

pub use outpost_defence_system_wave_director::WaveState;
pub use scenario::{ConfigError, EconomyConfig, MapConfig, ScenarioConfig, WaveConfig};

/// Reasons a session could not be set up.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SetupError {
    /// The scenario holds values the simulation cannot run with.
    #[error("invalid scenario: {0}")]
    Config(#[from] ConfigError),
    /// The map does not describe a route.
    #[error("failed to build the route: {0}")]
    Path(#[from] PathError),
}

/// Running session: the world, its systems and the pending event queue.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    director: WaveDirector,
    targeting: TowerTargeting,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
    events: Vec<Event>,
}

impl Simulation {
    /// Validates the scenario, builds the route and seeds the economy.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] for invalid scenarios and
    /// [`SetupError::Path`] when the map holds no path tile.
    pub fn new(config: ScenarioConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let layer = config.map.layer();
        let route = PathBuilder::new(config.map.path_config()).build(&layer, &config.map.tileset)?;
        info!(
            waypoints = route.len(),
            length = route.length(),
            "route built"
        );

        let director = WaveDirector::new(
            config
                .waves
                .director_config(config.economy.reward_per_wave),
        );
        let world = World::new(
            world::Config::new(layer, route)
                .with_tower_catalog(config.towers)
                .with_enemy_catalog(config.enemies)
                .with_starting_balance(config.economy.starting_balance)
                .with_sell_percent(config.economy.sell_percent)
                .with_base_integrity(config.base_integrity)
                .with_weapon(config.weapon),
        );

        Ok(Self {
            world,
            director,
            targeting: TowerTargeting::new(),
            commands: Vec::new(),
            targets: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Advances the session by `dt`.
    ///
    /// Nothing happens while `paused` is set or once the base is destroyed.
    ///
    /// # Errors
    ///
    /// Returns a [`SpawnError`] when the wave director releases an enemy the
    /// world cannot spawn.
    pub fn tick(&mut self, dt: Duration, paused: bool) -> Result<(), SpawnError> {
        if paused || query::is_defeated(&self.world) {
            return Ok(());
        }

        let alive = query::alive_enemy_count(&self.world);
        let route_ready = !query::route(&self.world).is_empty();
        self.director
            .handle(dt, alive, route_ready, &mut self.commands, &mut self.events)?;
        self.flush_commands()?;

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events)?;

        let towers = query::towers(&self.world);
        let cooldowns = query::tower_cooldowns(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting
            .handle(&towers, &cooldowns, &enemies, &mut self.targets);
        self.commands
            .extend(self.targets.iter().map(|target| Command::FireProjectile {
                tower: target.tower,
                target: target.enemy,
            }));
        self.flush_commands()?;

        world::apply(
            &mut self.world,
            Command::ResolveProjectiles { dt },
            &mut self.events,
        )?;

        if query::is_defeated(&self.world) {
            info!(wave = self.director.snapshot().wave, "session lost");
        }
        Ok(())
    }

    /// Applies the queued commands in order. A failing command is dropped
    /// and the ones after it stay queued for the next flush.
    fn flush_commands(&mut self) -> Result<(), SpawnError> {
        for index in 0..self.commands.len() {
            let command = self.commands[index].clone();
            if let Err(error) = world::apply(&mut self.world, command, &mut self.events) {
                let _ = self.commands.drain(..=index);
                return Err(error);
            }
        }
        self.commands.clear();
        Ok(())
    }

    /// Builds a tower on a free, off-route cell.
    ///
    /// # Errors
    ///
    /// Forwards the world's [`PlacementError`].
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<TowerId, PlacementError> {
        world::place_tower(&mut self.world, kind, cell, &mut self.events)
    }

    /// Buys the next upgrade tier of a tower, returning the new level.
    ///
    /// # Errors
    ///
    /// Forwards the world's [`UpgradeError`].
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u8, UpgradeError> {
        world::upgrade_tower(&mut self.world, tower, &mut self.events)
    }

    /// Removes a tower and refunds part of its investment.
    ///
    /// # Errors
    ///
    /// Forwards the world's [`SellError`].
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<u32, SellError> {
        world::sell_tower(&mut self.world, tower, &mut self.events)
    }

    /// Fires the player's weapon from `origin` towards `aim`.
    ///
    /// # Errors
    ///
    /// Forwards the world's [`WeaponError`].
    pub fn fire_player_weapon(
        &mut self,
        origin: Vec2,
        aim: Vec2,
    ) -> Result<ProjectileId, WeaponError> {
        world::fire_player_weapon(&mut self.world, origin, aim, &mut self.events)
    }

    /// Hands every queued event to the caller, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let drained = std::mem::take(&mut self.events);
        if !drained.is_empty() {
            debug!(count = drained.len(), "events drained");
        }
        drained
    }

    /// Current wave lifecycle snapshot.
    #[must_use]
    pub fn wave_state(&self) -> WaveState {
        self.director.snapshot()
    }

    /// Banner shown when the session starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Route enemies follow.
    #[must_use]
    pub fn route(&self) -> &Route {
        query::route(&self.world)
    }

    /// Money currently available.
    #[must_use]
    pub fn balance(&self) -> u32 {
        query::balance(&self.world)
    }

    /// Remaining base integrity.
    #[must_use]
    pub fn base_integrity(&self) -> u32 {
        query::base_integrity(&self.world)
    }

    /// Reports whether the base has been destroyed.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        query::is_defeated(&self.world)
    }

    /// Enemies currently alive on the route.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Towers currently standing.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::towers(&self.world)
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectiles(&self.world)
    }

    /// Read access to the world for any query not mirrored here.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}
