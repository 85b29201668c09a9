//! Intro Sequencer
//!
//! Finite-step splash state machine:
//!
//! ```text
//! AwaitingChoice (step 0) --choice--> Advancing(1) --delay--> ... Advancing(N) --delay--> Complete
//! ```
//!
//! While awaiting the choice a highlight cycles over the offered icons. The
//! first choice starts the background audio; a playback failure is reported
//! in the outcome and never blocks the transition.

use super::timers::{TimerId, TimerQueue};
use super::TimerEvent;
use crate::audio::Playback;
use crate::config::IntroConfig;
use crate::errors::IntroError;
use crate::observability::telemetry::{record_state_transition, sanitize_for_log};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum IntroPhase {
    AwaitingChoice,
    Advancing(usize),
    Complete,
}

impl fmt::Display for IntroPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntroPhase::AwaitingChoice => write!(f, "awaiting-choice"),
            IntroPhase::Advancing(step) => write!(f, "advancing({})", step),
            IntroPhase::Complete => write!(f, "complete"),
        }
    }
}

/// Result of the one audio attempt made on the first choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutcome {
    Started,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// The choice moved the intro out of `AwaitingChoice`
    Accepted {
        index: usize,
        audio: Option<AudioOutcome>,
        phase: IntroPhase,
    },
    /// The intro already left `AwaitingChoice`; nothing happened
    Ignored,
}

/// Read-only state handed to the view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntroView {
    pub phase: IntroPhase,
    pub step: usize,
    pub payload: Option<String>,
    pub selection_highlight_index: usize,
    pub choices: Vec<String>,
    pub chosen: Option<usize>,
    pub main_content_revealed: bool,
}

pub struct IntroSequencer {
    script: IntroConfig,
    step: usize,
    highlight_index: usize,
    chosen: Option<usize>,
    audio_attempted: bool,
    highlight_timer: Option<TimerId>,
    advance_timer: Option<TimerId>,
}

impl IntroSequencer {
    pub fn new(script: IntroConfig) -> Self {
        Self {
            script,
            step: 0,
            highlight_index: 0,
            chosen: None,
            audio_attempted: false,
            highlight_timer: None,
            advance_timer: None,
        }
    }

    pub fn phase(&self) -> IntroPhase {
        match self.step {
            0 => IntroPhase::AwaitingChoice,
            k if k <= self.script.len() => IntroPhase::Advancing(k),
            _ => IntroPhase::Complete,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn main_content_revealed(&self) -> bool {
        self.phase() == IntroPhase::Complete
    }

    pub fn payload(&self) -> Option<&str> {
        self.script.payload_for(self.step)
    }

    pub fn selection_highlight_index(&self) -> usize {
        self.highlight_index
    }

    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    pub fn script(&self) -> &IntroConfig {
        &self.script
    }

    /// Start the highlight cycle. Only meaningful while awaiting the choice.
    pub fn mount(&mut self, timers: &mut TimerQueue<TimerEvent>, now: Duration) {
        if self.phase() != IntroPhase::AwaitingChoice || self.highlight_timer.is_some() {
            return;
        }
        if self.script.choices.len() > 1 {
            let interval = self.script.highlight_interval();
            self.highlight_timer = Some(timers.schedule_repeating(
                now + interval,
                interval,
                TimerEvent::HighlightTick,
            ));
        }
    }

    /// Move the highlight to the next icon. Returns the new index.
    pub fn on_highlight_tick(&mut self) -> Option<usize> {
        if self.phase() != IntroPhase::AwaitingChoice || self.script.choices.is_empty() {
            return None;
        }
        self.highlight_index = (self.highlight_index + 1) % self.script.choices.len();
        Some(self.highlight_index)
    }

    /// The user picked icon `index`.
    ///
    /// Only the first choice has an effect: it stops the highlight cycle,
    /// attempts audio once and enters step 1.
    pub fn on_user_choice(
        &mut self,
        index: usize,
        timers: &mut TimerQueue<TimerEvent>,
        playback: &mut dyn Playback,
        now: Duration,
    ) -> Result<ChoiceOutcome, IntroError> {
        if self.phase() != IntroPhase::AwaitingChoice {
            return Ok(ChoiceOutcome::Ignored);
        }
        let available = self.script.choices.len();
        if index >= available {
            return Err(IntroError::ChoiceOutOfRange { index, available });
        }

        if let Some(id) = self.highlight_timer.take() {
            timers.cancel(id);
        }
        self.chosen = Some(index);

        let audio = if self.audio_attempted {
            None
        } else {
            self.audio_attempted = true;
            Some(match playback.play_from_start() {
                Ok(()) => AudioOutcome::Started,
                Err(e) => {
                    tracing::warn!(
                        error = %sanitize_for_log(&e.to_string()),
                        "Audio playback failed to start"
                    );
                    AudioOutcome::Failed(e.to_string())
                }
            })
        };

        self.enter_step(1, timers, now);
        Ok(ChoiceOutcome::Accepted {
            index,
            audio,
            phase: self.phase(),
        })
    }

    /// The current step's delay elapsed. Returns the phase entered.
    pub fn on_advance(&mut self, timers: &mut TimerQueue<TimerEvent>, at: Duration) -> Option<IntroPhase> {
        self.advance_timer = None;
        match self.phase() {
            IntroPhase::Advancing(k) => {
                self.enter_step(k + 1, timers, at);
                Some(self.phase())
            }
            _ => None,
        }
    }

    fn enter_step(&mut self, step: usize, timers: &mut TimerQueue<TimerEvent>, now: Duration) {
        let from = self.phase();
        self.step = step;
        let to = self.phase();
        record_state_transition(&from.to_string(), &to.to_string());

        if let IntroPhase::Advancing(k) = to {
            let delay = self.script.delay_for(k);
            self.advance_timer = Some(timers.schedule_once(now + delay, TimerEvent::AdvanceStep));
        }
    }

    /// Cancel every timer this sequencer owns
    pub fn dispose(&mut self, timers: &mut TimerQueue<TimerEvent>) {
        if let Some(id) = self.highlight_timer.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.advance_timer.take() {
            timers.cancel(id);
        }
    }

    pub fn pending_timers(&self) -> usize {
        usize::from(self.highlight_timer.is_some()) + usize::from(self.advance_timer.is_some())
    }

    pub fn view(&self) -> IntroView {
        IntroView {
            phase: self.phase(),
            step: self.step,
            payload: self.payload().map(str::to_string),
            selection_highlight_index: self.highlight_index,
            choices: self.script.choices.clone(),
            chosen: self.chosen,
            main_content_revealed: self.main_content_revealed(),
        }
    }
}
