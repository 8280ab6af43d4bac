use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use outpost_defence_core::{
    CellCoord, Command, EnemyCatalog, EnemyId, EnemyKind, EnemySpec, Event, Route, TileLayer,
    TowerId, TowerKind, TowerTarget, Waypoint, WaypointKind,
};
use outpost_defence_system_tower_targeting::TowerTargeting;
use outpost_defence_world::{self as world, query, Config, World};

#[test]
fn deterministic_replay_prefers_the_leading_enemy() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());

    let spawned: Vec<EnemyId> = first
        .events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 2, "expected exactly two spawn events");

    let engaged: Vec<EnemyId> = first
        .assignments
        .iter()
        .flat_map(|snapshot| snapshot.targets.iter().map(|target| target.enemy))
        .collect();
    assert!(
        engaged.contains(&spawned[0]),
        "the scout must be engaged while it leads"
    );
    assert!(
        engaged.contains(&spawned[1]),
        "the soldier must be engaged once the scout leaked"
    );
}

#[test]
fn assignments_always_pick_the_furthest_enemy_in_range() {
    let mut world = corridor_world();
    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    let mut events = Vec::new();

    for command in scripted_commands() {
        world::apply(&mut world, command, &mut events).expect("command succeeds");

        let towers = query::towers(&world);
        let enemies = query::enemy_view(&world);
        let cooldowns = query::tower_cooldowns(&world);
        targeting.handle(&towers, &cooldowns, &enemies, &mut targets);

        for tower in towers.iter() {
            let best = enemies
                .iter()
                .filter(|enemy| tower.position.distance(enemy.position) <= tower.range)
                .max_by(|a, b| {
                    a.progress
                        .total_cmp(&b.progress)
                        .then(b.id.cmp(&a.id))
                })
                .map(|enemy| enemy.id);
            let assigned = targets
                .iter()
                .find(|target| target.tower == tower.id)
                .map(|target| target.enemy);
            assert_eq!(assigned, best);
        }
    }
}

fn corridor_world() -> World {
    let layer = TileLayer::from_rows(
        32.0,
        &[vec![0; 10], vec![2, 1, 1, 1, 1, 1, 1, 1, 1, 3], vec![0; 10]],
    );
    let route = Route::new(vec![
        Waypoint::new(Vec2::new(16.0, 48.0), CellCoord::new(0, 1), WaypointKind::Start),
        Waypoint::new(Vec2::new(304.0, 48.0), CellCoord::new(9, 1), WaypointKind::End),
    ]);
    let catalog = EnemyCatalog::new(vec![
        enemy(EnemyKind::Scout, 80.0),
        enemy(EnemyKind::Soldier, 40.0),
    ]);
    let mut world = World::new(Config::new(layer, route).with_enemy_catalog(catalog));

    let mut events = Vec::new();
    let _ = world::place_tower(&mut world, TowerKind::Basic, CellCoord::new(5, 2), &mut events)
        .expect("placement succeeds");
    world
}

fn enemy(kind: EnemyKind, speed: f32) -> EnemySpec {
    EnemySpec {
        kind,
        health: 1_000,
        speed,
        reward: 1,
        base_damage: 1,
        radius: 8.0,
    }
}

fn scripted_commands() -> Vec<Command> {
    let tick = Command::Tick {
        dt: Duration::from_millis(250),
    };
    let mut commands = vec![Command::SpawnEnemy {
        kind: EnemyKind::Scout,
    }];
    commands.extend(std::iter::repeat(tick.clone()).take(4));
    commands.push(Command::SpawnEnemy {
        kind: EnemyKind::Soldier,
    });
    commands.extend(std::iter::repeat(tick).take(24));
    commands
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = corridor_world();
    let mut targeting = TowerTargeting::new();
    let mut current_targets = Vec::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated).expect("command succeeds");
        events.extend(generated);

        let towers = query::towers(&world);
        let enemies = query::enemy_view(&world);
        let cooldowns = query::tower_cooldowns(&world);
        targeting.handle(&towers, &cooldowns, &enemies, &mut current_targets);
        assignments.push(TargetSnapshot::from(&current_targets));
    }

    ReplayOutcome {
        events,
        assignments,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    events: Vec<Event>,
    assignments: Vec<TargetSnapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TargetSnapshot {
    targets: Vec<TargetRecord>,
}

impl TargetSnapshot {
    fn from(targets: &[TowerTarget]) -> Self {
        Self {
            targets: targets
                .iter()
                .map(|target| TargetRecord {
                    tower: target.tower,
                    enemy: target.enemy,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TargetRecord {
    tower: TowerId,
    enemy: EnemyId,
}
