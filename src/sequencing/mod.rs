//! Timed UI Sequencing
//!
//! The two stateful pieces of a landing page and the event loop they share:
//! - `ParticleSpawner`: periodic falling-emoji particles with per-particle expiry
//! - `IntroSequencer`: icon choice, timed splash steps, then main content
//! - `LandingPage`: composes both over one `TimerQueue`
//!
//! Everything here runs on virtual time (a `Duration` since mount) and never
//! sleeps; drivers in `runtime` and `ui::tui` feed it wall-clock time.

pub mod intro;
pub mod page;
pub mod particles;
pub mod timers;

pub use intro::{AudioOutcome, ChoiceOutcome, IntroPhase, IntroSequencer, IntroView};
pub use page::{LandingPage, PageEvent, PageEventKind, PageView};
pub use particles::{Particle, ParticleId, ParticleSpawner};
pub use timers::{Fired, TimerId, TimerQueue};

use serde::Serializer;
use std::time::Duration;

/// Everything that can be scheduled on a page's timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Spawner interval elapsed
    SpawnTick,
    /// A particle's lifetime elapsed
    Expire(ParticleId),
    /// Move the choice highlight
    HighlightTick,
    /// Leave the current intro step
    AdvanceStep,
}

/// Serialize a virtual timestamp as fractional milliseconds
pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(millis(*d))
}

pub(crate) fn millis(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}
