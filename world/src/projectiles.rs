//! Projectiles in flight and their collision resolution.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use outpost_defence_core::{
    EnemyId, EnemyKind, ProjectileId, ProjectileSnapshot, TileGrid, TowerId,
};

use crate::enemies::EnemyPopulation;

/// Parameters of a projectile about to be launched.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) owner: Option<TowerId>,
    pub(crate) origin: Vec2,
    pub(crate) heading: Vec2,
    pub(crate) speed: f32,
    pub(crate) homing_target: Option<EnemyId>,
    pub(crate) damage: u32,
    pub(crate) piercing: u32,
    pub(crate) radius: f32,
}

#[derive(Clone, Debug)]
struct Projectile {
    owner: Option<TowerId>,
    position: Vec2,
    velocity: Vec2,
    speed: f32,
    homing_target: Option<EnemyId>,
    damage: u32,
    piercing_remaining: u32,
    radius: f32,
    hits: BTreeSet<EnemyId>,
}

/// Enemy destroyed by a projectile during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Kill {
    pub(crate) owner: Option<TowerId>,
    pub(crate) enemy: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) reward: u32,
}

/// Owns every projectile in flight.
#[derive(Debug)]
pub(crate) struct ProjectileSystem {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
    scratch_ids: Vec<ProjectileId>,
}

impl ProjectileSystem {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
            scratch_ids: Vec::new(),
        }
    }

    /// Puts a projectile into flight. A zero heading falls back to +x.
    pub(crate) fn launch(&mut self, launch: Launch) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let direction = launch.heading.try_normalize().unwrap_or(Vec2::X);
        let _ = self.entries.insert(
            id,
            Projectile {
                owner: launch.owner,
                position: launch.origin,
                velocity: direction * launch.speed,
                speed: launch.speed,
                homing_target: launch.homing_target,
                damage: launch.damage,
                piercing_remaining: launch.piercing,
                radius: launch.radius,
                hits: BTreeSet::new(),
            },
        );
        id
    }

    /// Moves every projectile, applies damage to every enemy its swept path
    /// overlaps and removes those that are spent or left the map. Kills are
    /// appended to `out_kills` in resolution order.
    pub(crate) fn advance(
        &mut self,
        dt_secs: f32,
        grid: &TileGrid,
        enemies: &mut EnemyPopulation,
        out_kills: &mut Vec<Kill>,
    ) {
        self.scratch_ids.clear();
        self.scratch_ids.extend(self.entries.keys().copied());

        for index in 0..self.scratch_ids.len() {
            let id = self.scratch_ids[index];
            let Some(projectile) = self.entries.get_mut(&id) else {
                continue;
            };

            let from = projectile.travel(dt_secs, enemies);
            let spent = projectile.resolve_hits(from, enemies, out_kills);

            if spent || !grid.contains_point(projectile.position) {
                let _ = self.entries.remove(&id);
            }
        }
    }

    /// Captures every projectile in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.entries
            .iter()
            .map(|(id, projectile)| ProjectileSnapshot {
                id: *id,
                owner: projectile.owner,
                position: projectile.position,
                radius: projectile.radius,
            })
            .collect()
    }
}

impl Projectile {
    /// Moves the projectile and returns where it started from.
    fn travel(&mut self, dt_secs: f32, enemies: &EnemyPopulation) -> Vec2 {
        let from = self.position;
        let step = self.speed * dt_secs;
        let target = self
            .homing_target
            .and_then(|id| enemies.alive(id))
            .map(|enemy| enemy.position);

        match target {
            Some(target) => {
                let offset = target - self.position;
                let distance = offset.length();
                if distance > 0.0 {
                    self.velocity = offset / distance * self.speed;
                }
                if step >= distance {
                    self.position = target;
                } else {
                    self.position += offset / distance * step;
                }
            }
            None => {
                self.homing_target = None;
                self.position += self.velocity * dt_secs;
            }
        }
        from
    }

    /// Damages enemies overlapping the segment travelled since `from`, in
    /// the order the projectile reaches them. Returns `true` once spent.
    fn resolve_hits(
        &mut self,
        from: Vec2,
        enemies: &mut EnemyPopulation,
        out_kills: &mut Vec<Kill>,
    ) -> bool {
        let mut candidates: Vec<(f32, EnemyId, EnemyKind, u32)> = enemies
            .iter_alive()
            .filter(|enemy| !self.hits.contains(&enemy.id))
            .filter_map(|enemy| {
                let along = closest_along(from, self.position, enemy.position);
                let closest = from.lerp(self.position, along);
                let reach = self.radius + enemy.radius;
                (closest.distance_squared(enemy.position) <= reach * reach)
                    .then_some((along, enemy.id, enemy.kind, enemy.reward))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, enemy, kind, reward) in candidates {
            let Some(result) = enemies.apply_damage(enemy, self.damage) else {
                continue;
            };
            let _ = self.hits.insert(enemy);
            if result.killed {
                out_kills.push(Kill {
                    owner: self.owner,
                    enemy,
                    kind,
                    reward,
                });
            }

            if self.piercing_remaining == 0 {
                return true;
            }
            self.piercing_remaining -= 1;
        }

        false
    }
}

/// Fraction of the segment `from → to` at which it passes closest to `point`.
fn closest_along(from: Vec2, to: Vec2, point: Vec2) -> f32 {
    let travel = to - from;
    let length_sq = travel.length_squared();
    if length_sq <= f32::EPSILON {
        return 0.0;
    }
    ((point - from).dot(travel) / length_sq).clamp(0.0, 1.0)
}
