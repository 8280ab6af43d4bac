//! Static catalogs describing tower kinds, enemy kinds and wave compositions.
//!
//! Every catalog deserialises from scenario files and provides defaults so a
//! session can start without any external data.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Balanced homing tower.
    Basic,
    /// Fast-firing tower with low damage.
    Rapid,
    /// Slow tower firing piercing straight-line shells.
    Cannon,
}

impl TowerKind {
    /// Every tower kind, in catalog order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Rapid, Self::Cannon];
}

/// Types of enemies that travel the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Fast, fragile enemy.
    Scout,
    /// Average enemy.
    Soldier,
    /// Slow enemy with a large health pool.
    Tank,
}

/// Single step of a tower's upgrade curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTier {
    /// Money debited when the tier is bought.
    pub cost: u32,
    /// Damage added to every projectile.
    pub damage_bonus: u32,
    /// Pixels added to the targeting range.
    pub range_bonus: f32,
}

/// Static description of a tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSpec {
    /// Kind described by this entry.
    pub kind: TowerKind,
    /// Money debited when the tower is placed.
    pub build_cost: u32,
    /// Damage dealt by every projectile at level one.
    pub damage: u32,
    /// Targeting radius in pixels at level one.
    pub range: f32,
    /// Minimum time between two shots in milliseconds.
    pub fire_interval_ms: u64,
    /// Projectile speed in pixels per second.
    pub projectile_speed: f32,
    /// Projectile hit radius in pixels.
    pub projectile_radius: f32,
    /// Additional enemies a projectile may hit after the first.
    #[serde(default)]
    pub piercing: u32,
    /// Whether projectiles track their target instead of flying straight.
    #[serde(default)]
    pub homing: bool,
    /// Upgrade tiers bought in order; level `n` has bought `n - 1` tiers.
    #[serde(default)]
    pub upgrades: Vec<UpgradeTier>,
}

impl TowerSpec {
    /// Minimum time between two shots.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }

    /// Highest level the tower can reach.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        u8::try_from(self.upgrades.len().saturating_add(1)).unwrap_or(u8::MAX)
    }

    /// Upgrade tier that lifts a tower from `level` to `level + 1`.
    #[must_use]
    pub fn tier_after(&self, level: u8) -> Option<&UpgradeTier> {
        let index = usize::from(level).checked_sub(1)?;
        self.upgrades.get(index)
    }
}

/// Catalog of every constructible tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerCatalog {
    entries: Vec<TowerSpec>,
}

impl TowerCatalog {
    /// Creates a catalog from the provided entries.
    #[must_use]
    pub fn new(entries: Vec<TowerSpec>) -> Self {
        Self { entries }
    }

    /// Looks up the description of a tower kind.
    #[must_use]
    pub fn spec(&self, kind: TowerKind) -> Option<&TowerSpec> {
        self.entries.iter().find(|spec| spec.kind == kind)
    }

    /// Iterates over every catalog entry.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSpec> {
        self.entries.iter()
    }
}

impl Default for TowerCatalog {
    fn default() -> Self {
        Self::new(vec![
            TowerSpec {
                kind: TowerKind::Basic,
                build_cost: 50,
                damage: 10,
                range: 96.0,
                fire_interval_ms: 800,
                projectile_speed: 320.0,
                projectile_radius: 4.0,
                piercing: 0,
                homing: true,
                upgrades: vec![
                    UpgradeTier {
                        cost: 40,
                        damage_bonus: 5,
                        range_bonus: 16.0,
                    },
                    UpgradeTier {
                        cost: 80,
                        damage_bonus: 10,
                        range_bonus: 16.0,
                    },
                ],
            },
            TowerSpec {
                kind: TowerKind::Rapid,
                build_cost: 70,
                damage: 4,
                range: 80.0,
                fire_interval_ms: 250,
                projectile_speed: 420.0,
                projectile_radius: 3.0,
                piercing: 0,
                homing: true,
                upgrades: vec![UpgradeTier {
                    cost: 60,
                    damage_bonus: 2,
                    range_bonus: 8.0,
                }],
            },
            TowerSpec {
                kind: TowerKind::Cannon,
                build_cost: 120,
                damage: 30,
                range: 128.0,
                fire_interval_ms: 2_000,
                projectile_speed: 240.0,
                projectile_radius: 6.0,
                piercing: 2,
                homing: false,
                upgrades: vec![UpgradeTier {
                    cost: 100,
                    damage_bonus: 15,
                    range_bonus: 16.0,
                }],
            },
        ])
    }
}

/// Static description of an enemy kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    /// Kind described by this entry.
    pub kind: EnemyKind,
    /// Health on spawn.
    pub health: u32,
    /// Travel speed in pixels per second.
    pub speed: f32,
    /// Money credited when the enemy is destroyed.
    pub reward: u32,
    /// Base integrity removed when the enemy leaks.
    pub base_damage: u32,
    /// Hit radius in pixels.
    pub radius: f32,
}

/// Catalog of every enemy kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyCatalog {
    entries: Vec<EnemySpec>,
}

impl EnemyCatalog {
    /// Creates a catalog from the provided entries.
    #[must_use]
    pub fn new(entries: Vec<EnemySpec>) -> Self {
        Self { entries }
    }

    /// Looks up the description of an enemy kind.
    #[must_use]
    pub fn spec(&self, kind: EnemyKind) -> Option<&EnemySpec> {
        self.entries.iter().find(|spec| spec.kind == kind)
    }

    /// Iterates over every catalog entry.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySpec> {
        self.entries.iter()
    }
}

impl Default for EnemyCatalog {
    fn default() -> Self {
        Self::new(vec![
            EnemySpec {
                kind: EnemyKind::Scout,
                health: 30,
                speed: 90.0,
                reward: 5,
                base_damage: 1,
                radius: 10.0,
            },
            EnemySpec {
                kind: EnemyKind::Soldier,
                health: 80,
                speed: 60.0,
                reward: 10,
                base_damage: 2,
                radius: 12.0,
            },
            EnemySpec {
                kind: EnemyKind::Tank,
                health: 300,
                speed: 35.0,
                reward: 30,
                base_damage: 5,
                radius: 16.0,
            },
        ])
    }
}

/// Straight-line weapon mounted on the player's ship.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSpec {
    /// Damage dealt by every shot.
    pub damage: u32,
    /// Shot speed in pixels per second.
    pub projectile_speed: f32,
    /// Shot collision radius in pixels.
    pub projectile_radius: f32,
    /// Extra enemies a shot may pass through.
    pub piercing: u32,
    /// Minimum time between shots, in milliseconds.
    pub cooldown_ms: u64,
}

impl WeaponSpec {
    /// Minimum time between shots.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            damage: 15,
            projectile_speed: 480.0,
            projectile_radius: 4.0,
            piercing: 0,
            cooldown_ms: 400,
        }
    }
}

/// Group of identical enemies released one after another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Kind of every enemy in the group.
    pub kind: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Delay before each enemy of the group is released, in milliseconds.
    pub spawn_delay_ms: u64,
}

impl SpawnGroup {
    /// Delay before each enemy of the group is released.
    #[must_use]
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }
}

/// Enemies released during a single wave, in release order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveComposition {
    /// Groups released one after another.
    pub groups: Vec<SpawnGroup>,
}

impl WaveComposition {
    /// Total number of enemies across all groups.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Largest group size produced by growing waves past the end of the table.
pub const MAX_OVERFLOW_GROUP_SIZE: u32 = 10_000;

/// Per-wave enemy composition table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTable {
    /// Compositions for waves `1..=waves.len()`.
    pub waves: Vec<WaveComposition>,
    /// Enemies added to every group per wave past the end of the table.
    pub overflow_growth: u32,
}

impl WaveTable {
    /// Composition of the provided one-based wave number.
    ///
    /// Waves past the end of the table repeat the last composition with every
    /// group grown by `overflow_growth` per extra wave, up to
    /// [`MAX_OVERFLOW_GROUP_SIZE`] enemies. Wave zero and empty tables produce
    /// an empty composition.
    #[must_use]
    pub fn composition(&self, wave: u32) -> WaveComposition {
        let Some(index) = usize::try_from(wave).ok().and_then(|wave| wave.checked_sub(1)) else {
            return WaveComposition::default();
        };

        if let Some(configured) = self.waves.get(index) {
            return configured.clone();
        }

        let Some(last) = self.waves.last() else {
            return WaveComposition::default();
        };

        let extra_waves = u32::try_from(index + 1 - self.waves.len()).unwrap_or(u32::MAX);
        let growth = self.overflow_growth.saturating_mul(extra_waves);
        WaveComposition {
            groups: last
                .groups
                .iter()
                .map(|group| SpawnGroup {
                    count: group
                        .count
                        .saturating_add(growth)
                        .min(MAX_OVERFLOW_GROUP_SIZE.max(group.count)),
                    ..*group
                })
                .collect(),
        }
    }
}

impl Default for WaveTable {
    fn default() -> Self {
        let group = |kind, count, spawn_delay_ms| SpawnGroup {
            kind,
            count,
            spawn_delay_ms,
        };
        Self {
            waves: vec![
                WaveComposition {
                    groups: vec![group(EnemyKind::Scout, 5, 800)],
                },
                WaveComposition {
                    groups: vec![
                        group(EnemyKind::Scout, 6, 700),
                        group(EnemyKind::Soldier, 3, 1_200),
                    ],
                },
                WaveComposition {
                    groups: vec![
                        group(EnemyKind::Soldier, 6, 900),
                        group(EnemyKind::Tank, 1, 2_000),
                    ],
                },
            ],
            overflow_growth: 2,
        }
    }
}
