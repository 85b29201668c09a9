//! Landing page composition, driven through `simulate` and directly

use coinfall::audio::{NullPlayback, Playback};
use coinfall::config::{Config, IntroStep, Preset};
use coinfall::errors::{IntroError, PlaybackError};
use coinfall::sequencing::{LandingPage, PageEventKind};
use coinfall::simulate::{simulate, SimulationPlan};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Playback whose start count stays readable after the page takes it
#[derive(Clone, Default)]
struct SharedPlayback {
    starts: Arc<AtomicUsize>,
}

impl Playback for SharedPlayback {
    fn play_from_start(&mut self) -> Result<(), PlaybackError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Four steps at 1700ms, 200ms spawn interval, two symbols
fn splash_config() -> Config {
    let mut config = Config::preset(Preset::Splash);
    config.audio.asset = None;
    config.particles.symbols = vec!["💰".to_string(), "🚀".to_string()];
    config.particles.spawn_interval_ms = 200;
    config.particles.seed = Some(11);
    config.intro.step_delay_ms = 1700;
    config.intro.steps = ["you chose wisely", "💰", "💸", "🚀"]
        .iter()
        .map(|p| IntroStep {
            payload: p.to_string(),
            delay_ms: None,
        })
        .collect();
    config
}

#[test]
fn test_splash_timeline() {
    let plan = SimulationPlan::new(ms(8000)).choose_at(Duration::ZERO, 0);
    let timeline = simulate(&splash_config(), &plan).unwrap();

    let steps: Vec<(Duration, usize)> = timeline
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            PageEventKind::StepEntered { step, .. } => Some((e.at, *step)),
            _ => None,
        })
        .collect();
    assert_eq!(
        steps,
        vec![(ms(0), 1), (ms(1700), 2), (ms(3400), 3), (ms(5100), 4)]
    );

    let completed = timeline.first(|k| *k == PageEventKind::IntroCompleted);
    assert_eq!(completed, Some(ms(6800)));

    let first_spawn = timeline.first(|k| matches!(k, PageEventKind::ParticleSpawned { .. }));
    assert_eq!(first_spawn, Some(ms(7000)));
    assert!(timeline.final_view.main_content_revealed);
}

#[test]
fn test_no_particles_before_reveal() {
    let plan = SimulationPlan::new(ms(6799)).choose_at(Duration::ZERO, 1);
    let timeline = simulate(&splash_config(), &plan).unwrap();

    assert_eq!(
        timeline.count(|k| matches!(k, PageEventKind::ParticleSpawned { .. })),
        0
    );
    assert!(!timeline.final_view.main_content_revealed);
    assert!(timeline.final_view.particles.is_empty());
}

#[test]
fn test_late_choice_shifts_the_schedule() {
    let plan = SimulationPlan::new(ms(12_000)).choose_at(ms(2500), 2);
    let timeline = simulate(&splash_config(), &plan).unwrap();

    assert_eq!(
        timeline.first(|k| *k == PageEventKind::IntroCompleted),
        Some(ms(2500 + 6800))
    );
    let highlights = timeline.count(|k| matches!(k, PageEventKind::HighlightMoved { .. }));
    assert_eq!(highlights, 5);
}

#[test]
fn test_choice_reports_audio() {
    let plan = SimulationPlan::new(ms(100)).choose_at(Duration::ZERO, 0);
    let timeline = simulate(&splash_config(), &plan).unwrap();
    assert_eq!(
        timeline.count(|k| *k == PageEventKind::AudioStarted),
        1
    );
}

#[test]
fn test_missing_asset_is_not_fatal() {
    let mut config = splash_config();
    config.audio.asset = Some("definitely/not/here.mp3".into());
    let mut page = LandingPage::from_config(&config);
    page.mount(Duration::ZERO);

    let events = page.on_user_choice(0, Duration::ZERO).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, PageEventKind::AudioFailed { .. })));

    page.advance_to(ms(6800));
    assert!(page.main_content_revealed());
}

#[test]
fn test_gallery_ids_unique_across_lifetime() {
    let mut config = Config::default();
    config.particles.seed = Some(5);
    let timeline = simulate(&config, &SimulationPlan::new(ms(20_000))).unwrap();

    let ids: Vec<u64> = timeline
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            PageEventKind::ParticleSpawned { particle } => Some(particle.id.0),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 100);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

    let expired = timeline.count(|k| matches!(k, PageEventKind::ParticleExpired { .. }));
    assert_eq!(expired + timeline.final_view.particles.len(), ids.len());
}

#[test]
fn test_unmount_is_total() {
    let mut page = LandingPage::with_playback(&splash_config(), Box::new(NullPlayback));
    page.mount(Duration::ZERO);
    page.on_user_choice(0, ms(10)).unwrap();
    page.advance_to(ms(9000));
    assert!(page.spawner().live_count() > 0);

    let events = page.unmount();
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, PageEventKind::SpawnerStopped { drained } if drained > 0)));
    assert_eq!(page.active_timers(), 0);
    assert!(page.advance_to(ms(60_000)).is_empty());
    assert!(page.view().particles.is_empty());
}

#[test]
fn test_unmount_during_intro() {
    let mut page = LandingPage::with_playback(&splash_config(), Box::new(NullPlayback));
    page.mount(Duration::ZERO);
    page.on_user_choice(0, Duration::ZERO).unwrap();
    page.advance_to(ms(2000));

    page.unmount();
    assert_eq!(page.active_timers(), 0);
    assert!(!page.main_content_revealed());
}

#[test]
fn test_choice_before_mount_changes_nothing() {
    let playback = SharedPlayback::default();
    let mut page = LandingPage::with_playback(&splash_config(), Box::new(playback.clone()));

    assert_eq!(page.on_user_choice(0, ms(10)), Ok(Vec::new()));
    assert_eq!(page.active_timers(), 0);
    assert_eq!(playback.starts.load(Ordering::SeqCst), 0);

    // the choice was not remembered either
    page.mount(ms(20));
    assert!(page.advance_to(ms(20_000)).iter().all(|e| !matches!(
        e.kind,
        PageEventKind::StepEntered { .. } | PageEventKind::IntroCompleted
    )));
}

#[test]
fn test_choice_after_unmount_changes_nothing() {
    let playback = SharedPlayback::default();
    let mut page = LandingPage::with_playback(&splash_config(), Box::new(playback.clone()));
    page.mount(Duration::ZERO);
    page.unmount();

    assert_eq!(page.on_user_choice(0, ms(10)), Ok(Vec::new()));
    assert_eq!(page.active_timers(), 0);
    assert_eq!(playback.starts.load(Ordering::SeqCst), 0);
    assert!(!page.is_mounted());
    assert!(page.advance_to(ms(10_000)).is_empty());
}

#[test]
fn test_choice_after_completion_is_a_no_op() {
    let playback = SharedPlayback::default();
    let mut page = LandingPage::with_playback(&splash_config(), Box::new(playback.clone()));
    page.mount(Duration::ZERO);
    page.on_user_choice(1, Duration::ZERO).unwrap();
    page.advance_to(ms(6800));
    assert!(page.main_content_revealed());
    assert!(page.has_intro());

    let events = page.on_user_choice(0, ms(7000)).unwrap();
    assert!(events
        .iter()
        .all(|e| matches!(e.kind, PageEventKind::ParticleSpawned { .. } | PageEventKind::ParticleExpired { .. })));
    assert_eq!(playback.starts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_choice_on_gallery_is_an_error() {
    let mut page = LandingPage::with_playback(&Config::default(), Box::new(NullPlayback));
    page.mount(Duration::ZERO);
    assert_eq!(page.on_user_choice(0, ms(5)), Err(IntroError::NoIntro));
}

#[test]
fn test_seeded_runs_are_identical() {
    let mut config = Config::default();
    config.particles.seed = Some(99);
    let plan = SimulationPlan::new(ms(3000));

    let a = simulate(&config, &plan).unwrap();
    let b = simulate(&config, &plan).unwrap();
    assert_eq!(a.events, b.events);
}
