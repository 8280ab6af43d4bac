//! Straight-line weapon mounted on the player's ship.

use std::time::Duration;

use glam::Vec2;
use outpost_defence_core::{WeaponError, WeaponSpec};

#[derive(Clone, Debug)]
pub(crate) struct PlayerWeapon {
    pub(crate) spec: WeaponSpec,
    cooldown: Duration,
}

impl PlayerWeapon {
    pub(crate) fn new(spec: WeaponSpec) -> Self {
        Self {
            spec,
            cooldown: Duration::ZERO,
        }
    }

    pub(crate) fn ready_in(&self) -> Duration {
        self.cooldown
    }

    pub(crate) fn cool_down(&mut self, dt: Duration) {
        self.cooldown = self.cooldown.saturating_sub(dt);
    }

    /// Validates a shot and starts the cooldown, returning the unit heading.
    pub(crate) fn trigger(&mut self, origin: Vec2, aim: Vec2) -> Result<Vec2, WeaponError> {
        if !self.cooldown.is_zero() {
            return Err(WeaponError::CoolingDown);
        }
        let heading = (aim - origin).try_normalize().ok_or(WeaponError::ZeroAim)?;
        self.cooldown = self.spec.cooldown();
        Ok(heading)
    }
}
