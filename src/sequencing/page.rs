//! Landing Page
//!
//! Composes the intro sequencer and the particle spawner over one timer
//! queue. The page is the only reader of the `main content revealed` handoff:
//! when the intro completes it is disposed and the spawner starts at the
//! completion instant. Variants without an intro start spawning on mount.

use super::intro::{AudioOutcome, ChoiceOutcome, IntroSequencer, IntroView};
use super::particles::{Particle, ParticleId, ParticleSpawner};
use super::timers::TimerQueue;
use super::{millis, serialize_millis, TimerEvent};
use crate::audio::{self, Playback};
use crate::config::Config;
use crate::errors::IntroError;
use crate::observability::telemetry::sanitize_for_log;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Something observable that happened on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEvent {
    #[serde(rename = "at_ms", serialize_with = "serialize_millis")]
    pub at: Duration,
    #[serde(flatten)]
    pub kind: PageEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEventKind {
    Mounted { intro: bool },
    HighlightMoved { index: usize },
    ChoiceMade { index: usize },
    AudioStarted,
    AudioFailed { reason: String },
    StepEntered { step: usize, payload: String },
    IntroCompleted,
    SpawnerStarted,
    ParticleSpawned { particle: Particle },
    ParticleExpired { id: ParticleId },
    SpawnerStopped { drained: usize },
    Unmounted,
}

impl PageEvent {
    fn new(at: Duration, kind: PageEventKind) -> Self {
        Self { at, kind }
    }
}

/// One line per event; configured text has its control characters escaped
impl fmt::Display for PageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>9.1}ms  ", millis(self.at))?;
        match &self.kind {
            PageEventKind::Mounted { intro } => {
                write!(f, "mounted ({})", if *intro { "intro" } else { "no intro" })
            }
            PageEventKind::HighlightMoved { index } => write!(f, "highlight -> icon {}", index),
            PageEventKind::ChoiceMade { index } => write!(f, "icon {} chosen", index),
            PageEventKind::AudioStarted => write!(f, "audio started"),
            PageEventKind::AudioFailed { reason } => {
                write!(f, "audio failed: {}", sanitize_for_log(reason))
            }
            PageEventKind::StepEntered { step, payload } => {
                write!(f, "step {}: {}", step, sanitize_for_log(payload))
            }
            PageEventKind::IntroCompleted => write!(f, "intro complete, main content revealed"),
            PageEventKind::SpawnerStarted => write!(f, "spawner started"),
            PageEventKind::ParticleSpawned { particle } => write!(
                f,
                "spawn {} {} at {:.1}% for {:.2}s",
                particle.id,
                sanitize_for_log(&particle.symbol),
                particle.horizontal_position,
                particle.lifetime_secs
            ),
            PageEventKind::ParticleExpired { id } => write!(f, "expire {}", id),
            PageEventKind::SpawnerStopped { drained } => {
                write!(f, "spawner stopped ({} drained)", drained)
            }
            PageEventKind::Unmounted => write!(f, "unmounted"),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub particles: Vec<Particle>,
    pub intro: Option<IntroView>,
    pub main_content_revealed: bool,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            particles: Vec::new(),
            intro: None,
            main_content_revealed: false,
        }
    }
}

pub struct LandingPage<R: Rng = StdRng> {
    timers: TimerQueue<TimerEvent>,
    /// Present until the intro completes
    intro: Option<IntroSequencer>,
    has_intro: bool,
    spawner: ParticleSpawner<R>,
    audio: Box<dyn Playback>,
    revealed: bool,
    mounted: bool,
    now: Duration,
}

impl LandingPage<StdRng> {
    /// Build a page from config, playing audio through the configured player
    pub fn from_config(config: &Config) -> Self {
        Self::with_playback(config, audio::from_config(&config.audio))
    }

    pub fn with_playback(config: &Config, audio: Box<dyn Playback>) -> Self {
        let rng = match config.particles.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let spawner = ParticleSpawner::new(config.particles.clone(), rng);
        let intro = config
            .intro
            .enabled
            .then(|| IntroSequencer::new(config.intro.clone()));
        Self::from_parts(spawner, intro, audio)
    }
}

impl<R: Rng> LandingPage<R> {
    pub fn from_parts(
        spawner: ParticleSpawner<R>,
        intro: Option<IntroSequencer>,
        audio: Box<dyn Playback>,
    ) -> Self {
        Self {
            timers: TimerQueue::new(),
            has_intro: intro.is_some(),
            intro,
            spawner,
            audio,
            revealed: false,
            mounted: false,
            now: Duration::ZERO,
        }
    }

    /// Whether the page was built with an intro, completed or not
    pub fn has_intro(&self) -> bool {
        self.has_intro
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn main_content_revealed(&self) -> bool {
        self.revealed
    }

    /// Virtual time the page has been advanced to
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Timers that can still fire
    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }

    pub fn spawner(&self) -> &ParticleSpawner<R> {
        &self.spawner
    }

    pub fn intro(&self) -> Option<&IntroSequencer> {
        self.intro.as_ref()
    }

    pub fn mount(&mut self, now: Duration) -> Vec<PageEvent> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        self.now = now;

        let mut events = vec![PageEvent::new(
            now,
            PageEventKind::Mounted {
                intro: self.intro.is_some(),
            },
        )];
        match self.intro.as_mut() {
            Some(intro) => intro.mount(&mut self.timers, now),
            None => {
                self.revealed = true;
                self.start_spawner(now, &mut events);
            }
        }
        tracing::info!(intro = self.intro.is_some(), "Page mounted");
        events
    }

    /// Fire every timer due at or before `now`, in order
    pub fn advance_to(&mut self, now: Duration) -> Vec<PageEvent> {
        let mut events = Vec::new();
        if !self.mounted {
            return events;
        }
        let now = now.max(self.now);

        while let Some(fired) = self.timers.pop_due(now) {
            self.dispatch(fired.event, fired.at, &mut events);
        }
        self.now = now;
        events
    }

    fn dispatch(&mut self, event: TimerEvent, at: Duration, events: &mut Vec<PageEvent>) {
        match event {
            TimerEvent::SpawnTick => {
                if let Some(particle) = self.spawner.on_tick(&mut self.timers, at) {
                    tracing::trace!(id = particle.id.0, "Particle spawned");
                    events.push(PageEvent::new(
                        at,
                        PageEventKind::ParticleSpawned {
                            particle: particle.clone(),
                        },
                    ));
                }
            }
            TimerEvent::Expire(id) => {
                if self.spawner.on_expire(id).is_some() {
                    events.push(PageEvent::new(at, PageEventKind::ParticleExpired { id }));
                }
            }
            TimerEvent::HighlightTick => {
                if let Some(index) = self.intro.as_mut().and_then(|i| i.on_highlight_tick()) {
                    events.push(PageEvent::new(at, PageEventKind::HighlightMoved { index }));
                }
            }
            TimerEvent::AdvanceStep => {
                let Some(intro) = self.intro.as_mut() else {
                    return;
                };
                if intro.on_advance(&mut self.timers, at).is_none() {
                    return;
                }
                if intro.main_content_revealed() {
                    self.finish_intro(at, events);
                } else {
                    events.push(step_entered(intro, at));
                }
            }
        }
    }

    /// The user picked one of the offered icons.
    ///
    /// A choice on a page that is not mounted, or whose intro has already
    /// completed, changes nothing. Only a page built without an intro rejects it.
    pub fn on_user_choice(&mut self, index: usize, now: Duration) -> Result<Vec<PageEvent>, IntroError> {
        if !self.has_intro {
            return Err(IntroError::NoIntro);
        }
        if !self.mounted {
            tracing::debug!(index, "Choice ignored, page not mounted");
            return Ok(Vec::new());
        }
        let mut events = self.advance_to(now);
        let now = self.now;

        let Some(intro) = self.intro.as_mut() else {
            tracing::debug!(index, "Choice ignored, intro already complete");
            return Ok(events);
        };
        let outcome = intro.on_user_choice(index, &mut self.timers, &mut *self.audio, now)?;

        let ChoiceOutcome::Accepted { audio, .. } = outcome else {
            tracing::debug!(index, "Choice ignored, intro already started");
            return Ok(events);
        };

        events.push(PageEvent::new(now, PageEventKind::ChoiceMade { index }));
        match audio {
            Some(AudioOutcome::Started) => {
                events.push(PageEvent::new(now, PageEventKind::AudioStarted));
            }
            Some(AudioOutcome::Failed(reason)) => {
                events.push(PageEvent::new(now, PageEventKind::AudioFailed { reason }));
            }
            None => {}
        }

        if intro.main_content_revealed() {
            self.finish_intro(now, &mut events);
        } else {
            events.push(step_entered(intro, now));
        }
        Ok(events)
    }

    fn finish_intro(&mut self, at: Duration, events: &mut Vec<PageEvent>) {
        if let Some(mut intro) = self.intro.take() {
            intro.dispose(&mut self.timers);
        }
        self.revealed = true;
        events.push(PageEvent::new(at, PageEventKind::IntroCompleted));
        tracing::info!(at_ms = at.as_millis() as u64, "Main content revealed");
        self.start_spawner(at, events);
    }

    fn start_spawner(&mut self, at: Duration, events: &mut Vec<PageEvent>) {
        if self.spawner.start(&mut self.timers, at) {
            events.push(PageEvent::new(at, PageEventKind::SpawnerStarted));
        }
    }

    /// Tear everything down; no timer survives
    pub fn unmount(&mut self) -> Vec<PageEvent> {
        if !self.mounted {
            return Vec::new();
        }
        let at = self.now;
        let mut events = Vec::new();

        if let Some(intro) = self.intro.as_mut() {
            intro.dispose(&mut self.timers);
        }
        let was_running = self.spawner.is_running();
        let drained = self.spawner.stop(&mut self.timers);
        if was_running {
            events.push(PageEvent::new(at, PageEventKind::SpawnerStopped { drained }));
        }
        self.audio.stop();
        self.timers.clear();
        self.mounted = false;

        events.push(PageEvent::new(at, PageEventKind::Unmounted));
        tracing::info!("Page unmounted");
        events
    }

    pub fn view(&self) -> PageView {
        PageView {
            elapsed: self.now,
            particles: self.spawner.snapshot(),
            intro: self.intro.as_ref().map(IntroSequencer::view),
            main_content_revealed: self.revealed,
        }
    }
}

impl<R: Rng> Drop for LandingPage<R> {
    fn drop(&mut self) {
        if self.mounted {
            self.unmount();
        }
    }
}

fn step_entered(intro: &IntroSequencer, at: Duration) -> PageEvent {
    PageEvent::new(
        at,
        PageEventKind::StepEntered {
            step: intro.step(),
            payload: intro.payload().unwrap_or_default().to_string(),
        },
    )
}
