//! Enemy population advancing along the route.

use std::collections::BTreeMap;

use glam::Vec2;
use outpost_defence_core::{
    DamageResult, EnemyId, EnemyKind, EnemySnapshot, EnemySpec, Route, SpawnError,
};

/// Single enemy travelling the route.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) progress: f32,
    pub(crate) health: u32,
    pub(crate) speed: f32,
    pub(crate) reward: u32,
    pub(crate) base_damage: u32,
    pub(crate) radius: f32,
    pub(crate) alive: bool,
}

impl Enemy {
    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            progress: self.progress,
            health: self.health,
        }
    }
}

/// Enemy leaving the field this tick by reaching the base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Leak {
    pub(crate) enemy: EnemyId,
    pub(crate) base_damage: u32,
}

/// Owns every enemy on the field.
///
/// Dead or leaked enemies stay in the map flagged as not alive until
/// [`EnemyPopulation::compact`] runs at the end of the tick, so identifiers
/// captured earlier in the tick keep resolving.
#[derive(Debug)]
pub(crate) struct EnemyPopulation {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyPopulation {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Places a new enemy at the spawn point of the route.
    pub(crate) fn spawn(&mut self, spec: &EnemySpec, route: &Route) -> Result<EnemyId, SpawnError> {
        let position = route.spawn_point().ok_or(SpawnError::NoRoute)?;
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            Enemy {
                id,
                kind: spec.kind,
                position,
                progress: 0.0,
                health: spec.health,
                speed: spec.speed.max(0.0),
                reward: spec.reward,
                base_damage: spec.base_damage,
                radius: spec.radius,
                alive: true,
            },
        );
        Ok(id)
    }

    /// Moves every alive enemy `speed * dt` pixels along the route.
    ///
    /// Enemies reaching the end of the route stop being alive and are
    /// reported through `out_leaks` in identifier order.
    pub(crate) fn advance(&mut self, dt_secs: f32, route: &Route, out_leaks: &mut Vec<Leak>) {
        let length = route.length();
        for enemy in self.entries.values_mut().filter(|enemy| enemy.alive) {
            enemy.progress = (enemy.progress + enemy.speed * dt_secs).min(length);
            if let Some(position) = route.point_at(enemy.progress) {
                enemy.position = position;
            }
            if enemy.progress >= length {
                enemy.alive = false;
                out_leaks.push(Leak {
                    enemy: enemy.id,
                    base_damage: enemy.base_damage,
                });
            }
        }
    }

    /// Removes health from an alive enemy.
    ///
    /// Returns `None` when the enemy does not exist or already died.
    pub(crate) fn apply_damage(&mut self, id: EnemyId, amount: u32) -> Option<DamageResult> {
        let enemy = self.entries.get_mut(&id).filter(|enemy| enemy.alive)?;
        let dealt = amount.min(enemy.health);
        enemy.health -= dealt;
        let killed = enemy.health == 0;
        if killed {
            enemy.alive = false;
        }
        Some(DamageResult { dealt, killed })
    }

    /// Looks up an enemy that is still alive.
    pub(crate) fn alive(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id).filter(|enemy| enemy.alive)
    }

    /// Iterates over alive enemies in identifier order.
    pub(crate) fn iter_alive(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values().filter(|enemy| enemy.alive)
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }

    /// Drops every enemy that died or leaked.
    pub(crate) fn compact(&mut self) {
        self.entries.retain(|_, enemy| enemy.alive);
    }
}
