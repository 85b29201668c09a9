//! Intro sequencer state machine

use coinfall::audio::{NullPlayback, Playback};
use coinfall::config::{IntroConfig, IntroStep};
use coinfall::errors::{IntroError, PlaybackError};
use coinfall::sequencing::{
    AudioOutcome, ChoiceOutcome, IntroPhase, IntroSequencer, TimerEvent, TimerQueue,
};
use std::path::PathBuf;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn script(steps: &[&str]) -> IntroConfig {
    IntroConfig {
        enabled: true,
        step_delay_ms: 1700,
        steps: steps
            .iter()
            .map(|p| IntroStep {
                payload: p.to_string(),
                delay_ms: None,
            })
            .collect(),
        ..IntroConfig::default()
    }
}

/// Playback that counts start attempts
#[derive(Default)]
struct CountingPlayback {
    starts: usize,
    fail: bool,
}

impl Playback for CountingPlayback {
    fn play_from_start(&mut self) -> Result<(), PlaybackError> {
        self.starts += 1;
        if self.fail {
            return Err(PlaybackError::AssetMissing {
                path: PathBuf::from("missing.mp3"),
            });
        }
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Fire advance timers up to `now`, returning (time, phase) per transition
fn run_until(
    intro: &mut IntroSequencer,
    timers: &mut TimerQueue<TimerEvent>,
    now: Duration,
) -> Vec<(Duration, IntroPhase)> {
    let mut transitions = Vec::new();
    while let Some(fired) = timers.pop_due(now) {
        match fired.event {
            TimerEvent::AdvanceStep => {
                if let Some(phase) = intro.on_advance(timers, fired.at) {
                    transitions.push((fired.at, phase));
                }
            }
            TimerEvent::HighlightTick => {
                intro.on_highlight_tick();
            }
            _ => {}
        }
    }
    transitions
}

#[test]
fn test_four_steps_at_fixed_delay() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&["you chose wisely", "💰", "💸", "🚀"]));
    intro.mount(&mut timers, Duration::ZERO);

    let outcome = intro
        .on_user_choice(0, &mut timers, &mut NullPlayback, Duration::ZERO)
        .unwrap();
    assert_eq!(
        outcome,
        ChoiceOutcome::Accepted {
            index: 0,
            audio: Some(AudioOutcome::Started),
            phase: IntroPhase::Advancing(1),
        }
    );
    assert_eq!(intro.payload(), Some("you chose wisely"));

    let transitions = run_until(&mut intro, &mut timers, ms(10_000));
    assert_eq!(
        transitions,
        vec![
            (ms(1700), IntroPhase::Advancing(2)),
            (ms(3400), IntroPhase::Advancing(3)),
            (ms(5100), IntroPhase::Advancing(4)),
            (ms(6800), IntroPhase::Complete),
        ]
    );
    assert!(intro.main_content_revealed());
    assert_eq!(intro.payload(), None);
    assert_eq!(timers.active_count(), 0);
}

#[test]
fn test_nothing_happens_without_a_choice() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&["a", "b"]));
    intro.mount(&mut timers, Duration::ZERO);

    assert!(run_until(&mut intro, &mut timers, ms(60_000)).is_empty());
    assert_eq!(intro.phase(), IntroPhase::AwaitingChoice);
    assert!(!intro.main_content_revealed());
}

#[test]
fn test_highlight_cycles_while_waiting() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&["a"]));
    intro.mount(&mut timers, Duration::ZERO);

    run_until(&mut intro, &mut timers, ms(1000));
    // two 500ms ticks over three icons
    assert_eq!(intro.selection_highlight_index(), 2);
    run_until(&mut intro, &mut timers, ms(1500));
    assert_eq!(intro.selection_highlight_index(), 0);
}

#[test]
fn test_choice_stops_highlight() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&["a", "b"]));
    intro.mount(&mut timers, Duration::ZERO);
    run_until(&mut intro, &mut timers, ms(500));

    intro
        .on_user_choice(2, &mut timers, &mut NullPlayback, ms(600))
        .unwrap();
    let frozen = intro.selection_highlight_index();
    run_until(&mut intro, &mut timers, ms(2000));
    assert_eq!(intro.selection_highlight_index(), frozen);
    assert_eq!(intro.chosen(), Some(2));
}

#[test]
fn test_second_choice_is_ignored() {
    let mut timers = TimerQueue::new();
    let mut playback = CountingPlayback::default();
    let mut intro = IntroSequencer::new(script(&["a", "b"]));
    intro.mount(&mut timers, Duration::ZERO);

    intro
        .on_user_choice(0, &mut timers, &mut playback, ms(100))
        .unwrap();
    let again = intro
        .on_user_choice(1, &mut timers, &mut playback, ms(200))
        .unwrap();

    assert_eq!(again, ChoiceOutcome::Ignored);
    assert_eq!(intro.chosen(), Some(0));
    assert_eq!(playback.starts, 1);

    // the first choice's schedule is untouched
    let transitions = run_until(&mut intro, &mut timers, ms(10_000));
    assert_eq!(transitions[0].0, ms(1800));
}

#[test]
fn test_audio_failure_does_not_block() {
    let mut timers = TimerQueue::new();
    let mut playback = CountingPlayback {
        fail: true,
        ..CountingPlayback::default()
    };
    let mut intro = IntroSequencer::new(script(&["a"]));
    intro.mount(&mut timers, Duration::ZERO);

    let outcome = intro
        .on_user_choice(1, &mut timers, &mut playback, Duration::ZERO)
        .unwrap();
    match outcome {
        ChoiceOutcome::Accepted { audio, phase, .. } => {
            assert!(matches!(audio, Some(AudioOutcome::Failed(_))));
            assert_eq!(phase, IntroPhase::Advancing(1));
        }
        ChoiceOutcome::Ignored => panic!("first choice must be accepted"),
    }

    let transitions = run_until(&mut intro, &mut timers, ms(1700));
    assert_eq!(transitions, vec![(ms(1700), IntroPhase::Complete)]);
}

#[test]
fn test_out_of_range_choice_is_rejected() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&["a"]));
    intro.mount(&mut timers, Duration::ZERO);

    let err = intro
        .on_user_choice(3, &mut timers, &mut NullPlayback, Duration::ZERO)
        .unwrap_err();
    assert_eq!(
        err,
        IntroError::ChoiceOutOfRange {
            index: 3,
            available: 3
        }
    );
    assert_eq!(intro.phase(), IntroPhase::AwaitingChoice);
    assert_eq!(intro.chosen(), None);
}

#[test]
fn test_empty_script_completes_on_choice() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&[]));
    intro.mount(&mut timers, Duration::ZERO);

    let outcome = intro
        .on_user_choice(0, &mut timers, &mut NullPlayback, Duration::ZERO)
        .unwrap();
    assert!(matches!(
        outcome,
        ChoiceOutcome::Accepted {
            phase: IntroPhase::Complete,
            ..
        }
    ));
    assert!(intro.main_content_revealed());
    assert_eq!(timers.active_count(), 0);
}

#[test]
fn test_per_step_delay_override() {
    let mut config = script(&["a", "b", "c"]);
    config.steps[1].delay_ms = Some(300);

    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(config);
    intro.mount(&mut timers, Duration::ZERO);
    intro
        .on_user_choice(0, &mut timers, &mut NullPlayback, Duration::ZERO)
        .unwrap();

    let times: Vec<Duration> = run_until(&mut intro, &mut timers, ms(10_000))
        .into_iter()
        .map(|(at, _)| at)
        .collect();
    assert_eq!(times, vec![ms(1700), ms(2000), ms(3700)]);
}

#[test]
fn test_dispose_cancels_pending_advance() {
    let mut timers = TimerQueue::new();
    let mut intro = IntroSequencer::new(script(&["a", "b"]));
    intro.mount(&mut timers, Duration::ZERO);
    intro
        .on_user_choice(0, &mut timers, &mut NullPlayback, Duration::ZERO)
        .unwrap();

    intro.dispose(&mut timers);
    assert_eq!(intro.pending_timers(), 0);
    assert_eq!(timers.active_count(), 0);
    assert!(run_until(&mut intro, &mut timers, ms(10_000)).is_empty());
    assert_eq!(intro.step(), 1);
}
