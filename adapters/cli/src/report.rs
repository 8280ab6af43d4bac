//! Turns the simulation's event stream into log lines and a run summary.

use std::fmt;

use outpost_defence_core::Event;
use tracing::{debug, info, trace, warn};

/// Totals accumulated over a headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) waves_completed: u32,
    pub(crate) kills: u32,
    pub(crate) leaks: u32,
    pub(crate) shots: u32,
    pub(crate) earned: u64,
    pub(crate) spent: u64,
    pub(crate) defeated: bool,
}

impl Summary {
    /// Folds one event into the totals and logs it.
    pub(crate) fn record(&mut self, event: &Event) {
        match event {
            Event::TimeAdvanced { dt } => trace!(?dt, "time advanced"),
            Event::WavePhaseChanged { wave, phase } => debug!(wave, ?phase, "wave phase changed"),
            Event::PreparationCountdown {
                wave,
                remaining,
                urgent,
            } => {
                if *urgent {
                    info!(wave, remaining = ?remaining, "wave incoming");
                } else {
                    debug!(wave, remaining = ?remaining, "preparing");
                }
            }
            Event::WaveStarted { wave } => info!(wave, "wave started"),
            Event::WaveCompleted { wave } => {
                self.waves_completed = self.waves_completed.max(*wave);
                info!(wave, "wave completed");
            }
            Event::EnemySpawned { enemy, kind } => debug!(?enemy, ?kind, "enemy spawned"),
            Event::EnemyKilled {
                enemy,
                kind,
                reward,
            } => {
                self.kills += 1;
                debug!(?enemy, ?kind, reward, "enemy killed");
            }
            Event::EnemyReachedBase { enemy } => {
                self.leaks += 1;
                debug!(?enemy, "enemy reached the base");
            }
            Event::BaseDamaged { damage, integrity } => {
                warn!(damage, integrity, "base damaged");
            }
            Event::BaseDestroyed => {
                self.defeated = true;
                warn!("base destroyed");
            }
            Event::MoneyChanged { amount, total } => {
                if *amount >= 0 {
                    self.earned += amount.unsigned_abs();
                } else {
                    self.spent += amount.unsigned_abs();
                }
                trace!(amount, total, "balance changed");
            }
            Event::TowerPlaced { tower, kind, cell } => {
                info!(?tower, ?kind, ?cell, "tower placed");
            }
            Event::TowerUpgraded { tower, level } => info!(?tower, level, "tower upgraded"),
            Event::TowerSold { tower, value } => info!(?tower, value, "tower sold"),
            Event::ProjectileFired { .. } => self.shots += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.defeated { "defeat" } else { "holding" };
        write!(
            f,
            "{outcome}: {} waves cleared, {} kills, {} leaks, {} shots, earned {}, spent {}",
            self.waves_completed, self.kills, self.leaks, self.shots, self.earned, self.spent
        )
    }
}
