#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Every ready tower engages the enemy in range that travelled furthest along
//! the route, which is the enemy closest to leaking into the base. Towers
//! still cooling down are skipped before any enemy is scanned, so every
//! assignment is a shot the world may fire right away.

use glam::Vec2;
use outpost_defence_core::{
    EnemyId, EnemyView, TowerCooldownView, TowerId, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Cooling towers and towers without an enemy in range
    /// produce no assignment.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        cooldowns: &TowerCooldownView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers, cooldowns);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let max_distance_sq = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                if tower.position.distance_squared(candidate.position) > max_distance_sq {
                    continue;
                }

                let current = BestCandidate {
                    progress: candidate.progress,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView, cooldowns: &TowerCooldownView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            if snapshot.range <= 0.0 || !cooldowns.is_ready(snapshot.id) {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.range,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            if snapshot.health == 0 {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                progress: snapshot.progress,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    progress: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    progress: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{TowerTarget, TowerTargeting};
    use glam::Vec2;
    use outpost_defence_core::{
        CellCoord, EnemyId, EnemyKind, EnemySnapshot, EnemyView, TowerCooldownSnapshot,
        TowerCooldownView, TowerId, TowerKind, TowerSnapshot, TowerView,
    };

    fn tower_view(snapshots: Vec<TowerSnapshot>) -> TowerView {
        TowerView::from_snapshots(snapshots)
    }

    fn all_ready(towers: &TowerView) -> TowerCooldownView {
        cooldowns(towers, |_| Duration::ZERO)
    }

    fn cooldowns(towers: &TowerView, ready_in: impl Fn(TowerId) -> Duration) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            towers
                .iter()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    kind: tower.kind,
                    ready_in: ready_in(tower.id),
                })
                .collect(),
        )
    }

    fn enemy_view(snapshots: Vec<EnemySnapshot>) -> EnemyView {
        EnemyView::from_snapshots(snapshots)
    }

    fn tower_snapshot(id: u32, position: (f32, f32), range: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Basic,
            cell: CellCoord::new(0, 0),
            position: Vec2::new(position.0, position.1),
            range,
            level: 1,
            kill_count: 0,
        }
    }

    fn enemy_snapshot(id: u32, position: (f32, f32), progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Scout,
            position: Vec2::new(position.0, position.1),
            progress,
            health: 30,
        }
    }

    #[test]
    fn targets_enemy_within_range() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (100.0, 100.0), 50.0)]);
        let enemies = enemy_view(vec![enemy_snapshot(2, (130.0, 140.0), 10.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(1),
                enemy: EnemyId::new(2),
            }]
        );
    }

    #[test]
    fn enemy_outside_range_is_ignored() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 50.0)]);
        let enemies = enemy_view(vec![enemy_snapshot(2, (40.0, 40.0), 10.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn furthest_progress_wins() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 200.0)]);
        let enemies = enemy_view(vec![
            enemy_snapshot(1, (10.0, 0.0), 40.0),
            enemy_snapshot(2, (90.0, 0.0), 90.0),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn smaller_enemy_id_is_preferred_when_progress_matches() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 200.0)]);
        let enemies = enemy_view(vec![
            enemy_snapshot(20, (30.0, 0.0), 55.0),
            enemy_snapshot(10, (0.0, 30.0), 55.0),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(10));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 30.0)]);
        let enemies = enemy_view(vec![enemy_snapshot(1, (30.0, 0.0), 5.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert_eq!(out.len(), 1);
    }

    #[test]
    fn zero_range_tower_produces_no_target() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 0.0)]);
        let enemies = enemy_view(vec![enemy_snapshot(1, (0.0, 0.0), 5.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn stale_assignments_are_cleared() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(Vec::new());
        let enemies = enemy_view(vec![enemy_snapshot(1, (1.0, 1.0), 5.0)]);

        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
        }];
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);
        assert!(out.is_empty());

        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 50.0)]);
        let enemies = enemy_view(Vec::new());
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn cooling_towers_are_skipped() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![
            tower_snapshot(1, (0.0, 0.0), 100.0),
            tower_snapshot(2, (10.0, 0.0), 100.0),
        ]);
        let cooling = cooldowns(&towers, |tower| {
            if tower == TowerId::new(1) {
                Duration::from_millis(120)
            } else {
                Duration::ZERO
            }
        });
        let enemies = enemy_view(vec![enemy_snapshot(7, (20.0, 0.0), 5.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &cooling, &enemies, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(2),
                enemy: EnemyId::new(7),
            }]
        );
    }

    #[test]
    fn towers_missing_from_the_cooldown_view_hold_fire() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, (0.0, 0.0), 100.0)]);
        let enemies = enemy_view(vec![enemy_snapshot(1, (5.0, 0.0), 5.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &TowerCooldownView::default(), &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn each_tower_picks_independently() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![
            tower_snapshot(1, (0.0, 0.0), 50.0),
            tower_snapshot(2, (300.0, 0.0), 50.0),
        ]);
        let enemies = enemy_view(vec![
            enemy_snapshot(1, (20.0, 0.0), 20.0),
            enemy_snapshot(2, (280.0, 0.0), 280.0),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &all_ready(&towers), &enemies, &mut out);

        assert_eq!(
            out,
            vec![
                TowerTarget {
                    tower: TowerId::new(1),
                    enemy: EnemyId::new(1),
                },
                TowerTarget {
                    tower: TowerId::new(2),
                    enemy: EnemyId::new(2),
                },
            ]
        );
    }
}
