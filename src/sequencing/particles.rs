//! Particle Spawner
//!
//! Emits one falling-emoji particle per interval and removes each particle
//! once its own lifetime has elapsed. The live set is keyed by a monotonic id,
//! so iterating it yields particles in insertion order.
//!
//! Stopping the spawner cancels the interval and every pending expiry and
//! drains the live set: nothing the spawner scheduled outlives it.

use super::timers::{TimerId, TimerQueue};
use super::{serialize_millis, TimerEvent};
use crate::config::ParticleConfig;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Identifier unique among all particles a spawner has created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single falling emoji
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub id: ParticleId,
    pub symbol: String,
    /// Offset from the left edge, percent of width in `[0, 100)`
    pub horizontal_position: f64,
    pub lifetime_secs: f64,
    /// Virtual time of insertion
    #[serde(rename = "born_at_ms", serialize_with = "serialize_millis")]
    pub born_at: Duration,
}

impl Particle {
    /// Lifetime as a `Duration`, saturating when the seconds value cannot be represented
    pub fn lifetime(&self) -> Duration {
        Duration::try_from_secs_f64(self.lifetime_secs).unwrap_or(Duration::MAX)
    }

    pub fn expires_at(&self) -> Duration {
        self.born_at.saturating_add(self.lifetime())
    }

    /// Fall progress from 0.0 (just spawned) to 1.0 (expiring)
    pub fn progress(&self, now: Duration) -> f64 {
        let age = now.saturating_sub(self.born_at).as_secs_f64();
        (age / self.lifetime_secs).clamp(0.0, 1.0)
    }
}

pub struct ParticleSpawner<R: Rng = StdRng> {
    config: ParticleConfig,
    rng: R,
    next_id: u64,
    live: BTreeMap<ParticleId, Particle>,
    tick_timer: Option<TimerId>,
    expiries: HashMap<ParticleId, TimerId>,
}

impl<R: Rng> ParticleSpawner<R> {
    pub fn new(config: ParticleConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            next_id: 0,
            live: BTreeMap::new(),
            tick_timer: None,
            expiries: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.tick_timer.is_some()
    }

    /// Begin ticking; the first particle appears one interval after `now`.
    ///
    /// Returns false without scheduling anything if already running.
    pub fn start(&mut self, timers: &mut TimerQueue<TimerEvent>, now: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        let interval = self.config.spawn_interval();
        let id = timers.schedule_repeating(now + interval, interval, TimerEvent::SpawnTick);
        self.tick_timer = Some(id);
        tracing::debug!(interval_ms = interval.as_millis() as u64, "Particle spawner started");
        true
    }

    /// Cancel the interval and all pending expiries, draining the live set.
    ///
    /// Returns how many particles were drained. Safe to call when stopped.
    pub fn stop(&mut self, timers: &mut TimerQueue<TimerEvent>) -> usize {
        if let Some(id) = self.tick_timer.take() {
            timers.cancel(id);
        }
        for (_, timer) in self.expiries.drain() {
            timers.cancel(timer);
        }
        let drained = self.live.len();
        self.live.clear();
        if drained > 0 {
            tracing::debug!(drained, "Particle spawner stopped");
        }
        drained
    }

    /// Handle a spawn tick at virtual time `at`
    pub fn on_tick(&mut self, timers: &mut TimerQueue<TimerEvent>, at: Duration) -> Option<&Particle> {
        if !self.is_running() {
            return None;
        }
        let particle = self.synthesize(at);
        let id = particle.id;
        let timer = timers.schedule_once(particle.expires_at(), TimerEvent::Expire(id));
        self.expiries.insert(id, timer);
        self.live.insert(id, particle);
        self.live.get(&id)
    }

    /// Handle a particle's expiry, removing it by id
    pub fn on_expire(&mut self, id: ParticleId) -> Option<Particle> {
        self.expiries.remove(&id);
        self.live.remove(&id)
    }

    fn synthesize(&mut self, at: Duration) -> Particle {
        let id = ParticleId(self.next_id);
        self.next_id += 1;

        let symbol = match self.config.symbols.len() {
            0 => String::new(),
            n => self.config.symbols[self.rng.random_range(0..n)].clone(),
        };
        let horizontal_position = self.rng.random_range(0.0..100.0);
        let min = self.config.min_lifetime_secs;
        let spread = self.config.lifetime_spread_secs;
        let max = min + spread;
        // A spread below the float resolution of `min` leaves an empty range
        let lifetime_secs = if max > min && (max - min).is_finite() {
            self.rng.random_range(min..max)
        } else {
            min
        };

        Particle {
            id,
            symbol,
            horizontal_position,
            lifetime_secs,
            born_at: at,
        }
    }

    /// Live particles in insertion order
    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.live.values()
    }

    pub fn snapshot(&self) -> Vec<Particle> {
        self.live.values().cloned().collect()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.live.get(&id)
    }

    /// Timers this spawner currently owns (interval plus expiries)
    pub fn pending_timers(&self) -> usize {
        self.expiries.len() + usize::from(self.tick_timer.is_some())
    }
}
