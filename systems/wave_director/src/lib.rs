#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave lifecycle state machine that schedules enemy spawns.
//!
//! The director cycles `Preparation → Spawning → Combat → Reward` and back to
//! the preparation of the next wave. It never touches the world: spawn
//! requests and wave rewards leave as [`Command`] values, and lifecycle
//! changes are announced through [`Event`] values.

use std::{collections::VecDeque, time::Duration};

use outpost_defence_core::{Command, EnemyKind, Event, SpawnError, WavePhase, WaveTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    preparation: Duration,
    countdown_step: Duration,
    urgency_window: Duration,
    reward_delay: Duration,
    reward_per_wave: u32,
    waves: WaveTable,
}

impl Config {
    /// Creates a new configuration from explicit timings and the wave table.
    #[must_use]
    pub fn new(
        preparation: Duration,
        countdown_step: Duration,
        urgency_window: Duration,
        reward_delay: Duration,
        reward_per_wave: u32,
        waves: WaveTable,
    ) -> Self {
        Self {
            preparation,
            countdown_step,
            urgency_window,
            reward_delay,
            reward_per_wave,
            waves,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(10),
            Duration::from_secs(1),
            Duration::from_secs(5),
            Duration::from_secs(2),
            50,
            WaveTable::default(),
        )
    }
}

/// Snapshot of the wave lifecycle exposed to HUD consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    /// One-based number of the current wave.
    pub wave: u32,
    /// Active phase of the current wave.
    pub phase: WavePhase,
    /// Time left in the preparation countdown.
    pub preparation_remaining: Duration,
    /// Enemies of the current wave that have not been requested yet.
    pub remaining_to_spawn: usize,
    /// Alive enemies reported by the most recent tick.
    pub alive: usize,
}

#[derive(Clone, Copy, Debug)]
struct PendingGroup {
    kind: EnemyKind,
    remaining: u32,
    delay: Duration,
}

/// Pure system driving the wave lifecycle.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    wave: u32,
    phase: WavePhase,
    preparation_remaining: Duration,
    countdown_accumulator: Duration,
    spawn_accumulator: Duration,
    next_delay: Duration,
    reward_remaining: Duration,
    pending: VecDeque<PendingGroup>,
    alive: usize,
}

impl WaveDirector {
    /// Creates a director preparing the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let preparation_remaining = config.preparation;
        Self {
            config,
            wave: 1,
            phase: WavePhase::Preparation,
            preparation_remaining,
            countdown_accumulator: Duration::ZERO,
            spawn_accumulator: Duration::ZERO,
            next_delay: Duration::ZERO,
            reward_remaining: Duration::ZERO,
            pending: VecDeque::new(),
            alive: 0,
        }
    }

    /// Advances the lifecycle by `dt`.
    ///
    /// `alive` is the number of enemies alive before this tick's spawns and
    /// `route_ready` reports whether a non-empty route exists.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::NoRoute`] when the preparation countdown ends
    /// without a route. The director then stays in preparation and requests
    /// nothing.
    pub fn handle(
        &mut self,
        dt: Duration,
        alive: usize,
        route_ready: bool,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SpawnError> {
        self.alive = alive;

        match self.phase {
            WavePhase::Preparation => {
                self.count_down(dt, out_events);
                if self.preparation_remaining.is_zero() {
                    if !route_ready {
                        return Err(SpawnError::NoRoute);
                    }
                    self.begin_spawning(out_events);
                    self.release_spawns(Duration::ZERO, out_commands, out_events);
                }
            }
            WavePhase::Spawning => self.release_spawns(dt, out_commands, out_events),
            WavePhase::Combat => {
                if alive == 0 && self.pending.is_empty() {
                    self.enter_reward(out_commands, out_events);
                }
            }
            WavePhase::Reward => {
                self.reward_remaining = self.reward_remaining.saturating_sub(dt);
                if self.reward_remaining.is_zero() {
                    self.enter_next_preparation(out_events);
                }
            }
        }

        Ok(())
    }

    /// Captures the current lifecycle state.
    #[must_use]
    pub fn snapshot(&self) -> WaveState {
        WaveState {
            wave: self.wave,
            phase: self.phase,
            preparation_remaining: self.preparation_remaining,
            remaining_to_spawn: self.remaining_to_spawn(),
            alive: self.alive,
        }
    }

    fn remaining_to_spawn(&self) -> usize {
        self.pending.iter().fold(0, |total: usize, group| {
            total.saturating_add(usize::try_from(group.remaining).unwrap_or(usize::MAX))
        })
    }

    fn count_down(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let step = self.config.countdown_step;
        if step.is_zero() {
            self.preparation_remaining = Duration::ZERO;
            return;
        }

        self.countdown_accumulator = self.countdown_accumulator.saturating_add(dt);
        while !self.preparation_remaining.is_zero() && self.countdown_accumulator >= step {
            self.countdown_accumulator -= step;
            self.preparation_remaining = self.preparation_remaining.saturating_sub(step);
            out_events.push(Event::PreparationCountdown {
                wave: self.wave,
                remaining: self.preparation_remaining,
                urgent: self.preparation_remaining <= self.config.urgency_window,
            });
        }

        if self.preparation_remaining.is_zero() {
            self.countdown_accumulator = Duration::ZERO;
        }
    }

    fn begin_spawning(&mut self, out_events: &mut Vec<Event>) {
        let composition = self.config.waves.composition(self.wave);
        self.pending.clear();
        self.pending.extend(
            composition
                .groups
                .iter()
                .filter(|group| group.count > 0)
                .map(|group| PendingGroup {
                    kind: group.kind,
                    remaining: group.count,
                    delay: group.spawn_delay(),
                }),
        );

        self.spawn_accumulator = Duration::ZERO;
        self.next_delay = Duration::ZERO;
        self.phase = WavePhase::Spawning;
        info!(
            wave = self.wave,
            enemies = self.remaining_to_spawn(),
            "wave started"
        );
        out_events.push(Event::WaveStarted { wave: self.wave });
        out_events.push(Event::WavePhaseChanged {
            wave: self.wave,
            phase: WavePhase::Spawning,
        });
    }

    fn release_spawns(
        &mut self,
        dt: Duration,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        self.spawn_accumulator = self.spawn_accumulator.saturating_add(dt);
        while let Some(group) = self.pending.front_mut() {
            if self.spawn_accumulator < self.next_delay {
                break;
            }
            self.spawn_accumulator -= self.next_delay;
            let kind = group.kind;
            group.remaining -= 1;
            if group.remaining == 0 {
                let _ = self.pending.pop_front();
            }
            // Every enemy after the first waits for its own group's delay.
            self.next_delay = self
                .pending
                .front()
                .map_or(Duration::ZERO, |next| next.delay);
            debug!(wave = self.wave, kind = ?kind, "spawn requested");
            out_commands.push(Command::SpawnEnemy { kind });
        }

        if self.pending.is_empty() {
            self.phase = WavePhase::Combat;
            out_events.push(Event::WavePhaseChanged {
                wave: self.wave,
                phase: WavePhase::Combat,
            });
        }
    }

    fn enter_reward(&mut self, out_commands: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        let amount = self.wave.saturating_mul(self.config.reward_per_wave);
        self.phase = WavePhase::Reward;
        self.reward_remaining = self.config.reward_delay;
        info!(wave = self.wave, reward = amount, "wave completed");
        out_events.push(Event::WavePhaseChanged {
            wave: self.wave,
            phase: WavePhase::Reward,
        });
        out_events.push(Event::WaveCompleted { wave: self.wave });
        out_commands.push(Command::CreditWaveReward {
            wave: self.wave,
            amount,
        });
    }

    fn enter_next_preparation(&mut self, out_events: &mut Vec<Event>) {
        self.wave = self.wave.saturating_add(1);
        self.phase = WavePhase::Preparation;
        self.preparation_remaining = self.config.preparation;
        self.countdown_accumulator = Duration::ZERO;
        out_events.push(Event::WavePhaseChanged {
            wave: self.wave,
            phase: WavePhase::Preparation,
        });
    }
}
