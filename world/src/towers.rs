//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use outpost_defence_core::{CellCoord, TowerCooldownSnapshot, TowerId, TowerKind, TowerSnapshot, TowerSpec};

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// World-space centre of the occupied cell.
    pub(crate) position: Vec2,
    /// Current upgrade level, starting at one.
    pub(crate) level: u8,
    /// Damage carried by fired projectiles.
    pub(crate) damage: u32,
    /// Targeting radius in pixels.
    pub(crate) range: f32,
    /// Time the tower needs between shots.
    pub(crate) fire_interval: Duration,
    /// Time left before the tower may fire again.
    pub(crate) cooldown: Duration,
    /// Money spent on construction and upgrades.
    pub(crate) invested: u32,
    /// Enemies destroyed by the tower's projectiles.
    pub(crate) kill_count: u32,
}

impl TowerState {
    fn from_spec(id: TowerId, spec: &TowerSpec, cell: CellCoord, position: Vec2) -> Self {
        Self {
            id,
            kind: spec.kind,
            cell,
            position,
            level: 1,
            damage: spec.damage,
            range: spec.range,
            fire_interval: spec.fire_interval(),
            cooldown: Duration::ZERO,
            invested: spec.build_cost,
            kill_count: 0,
        }
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            range: self.range,
            level: self.level,
            kill_count: self.kill_count,
        }
    }

    pub(crate) fn cooldown_snapshot(&self) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            kind: self.kind,
            ready_in: self.cooldown,
        }
    }
}

/// Registry that stores towers, the cells they occupy and identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    occupancy: BTreeMap<CellCoord, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Tower standing on the provided cell, if any.
    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.occupancy.get(&cell).copied()
    }

    /// Stores a freshly built tower. The caller checked that the cell is free.
    pub(crate) fn insert(&mut self, spec: &TowerSpec, cell: CellCoord, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.occupancy.insert(cell, id);
        let _ = self
            .entries
            .insert(id, TowerState::from_spec(id, spec, cell, position));
        id
    }

    /// Removes a tower and frees its cell.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        let state = self.entries.remove(&id)?;
        let _ = self.occupancy.remove(&state.cell);
        Some(state)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Iterates over every tower in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Counts every cooldown down by `dt`, stopping at zero.
    pub(crate) fn cool_down(&mut self, dt: Duration) {
        for tower in self.entries.values_mut() {
            tower.cooldown = tower.cooldown.saturating_sub(dt);
        }
    }
}
