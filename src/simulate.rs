//! Virtual-time simulation
//!
//! Steps a page through a fixed duration without sleeping and records every
//! event, for inspecting a variant's timing from the command line.

use crate::audio::NullPlayback;
use crate::config::Config;
use crate::errors::Result;
use crate::sequencing::{LandingPage, PageEvent, PageEventKind, PageView};
use serde::Serialize;
use std::time::Duration;

/// When to stop, and optionally when and which icon to choose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationPlan {
    pub duration: Duration,
    pub choice: Option<(Duration, usize)>,
}

impl SimulationPlan {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            choice: None,
        }
    }

    pub fn choose_at(mut self, at: Duration, index: usize) -> Self {
        self.choice = Some((at, index));
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub events: Vec<PageEvent>,
    /// View just before the page was unmounted
    pub final_view: PageView,
}

impl Timeline {
    pub fn count(&self, pred: impl Fn(&PageEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Time of the first event matching `pred`
    pub fn first(&self, pred: impl Fn(&PageEventKind) -> bool) -> Option<Duration> {
        self.events.iter().find(|e| pred(&e.kind)).map(|e| e.at)
    }
}

/// Run `config` for `plan.duration` of virtual time.
///
/// Audio is never played; a choice reports `AudioStarted` as if it were.
pub fn simulate(config: &Config, plan: &SimulationPlan) -> Result<Timeline> {
    let mut page = LandingPage::with_playback(config, Box::new(NullPlayback));
    let mut events = page.mount(Duration::ZERO);

    if let Some((at, index)) = plan.choice {
        if at <= plan.duration {
            events.extend(page.on_user_choice(index, at)?);
        }
    }
    events.extend(page.advance_to(plan.duration));

    let final_view = page.view();
    events.extend(page.unmount());

    Ok(Timeline { events, final_view })
}
