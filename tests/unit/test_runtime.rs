//! Async driver on a paused tokio clock

use coinfall::audio::NullPlayback;
use coinfall::config::{Config, Preset};
use coinfall::runtime::{spawn_page, PageInput};
use coinfall::sequencing::{LandingPage, PageEvent, PageEventKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn page(preset: Preset) -> LandingPage {
    let mut config = Config::preset(preset);
    config.particles.seed = Some(21);
    LandingPage::with_playback(&config, Box::new(NullPlayback))
}

fn recorder() -> (Arc<Mutex<Vec<PageEvent>>>, impl FnMut(&PageEvent) + Send + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |e: &PageEvent| sink.lock().unwrap().push(e.clone()))
}

#[tokio::test(start_paused = true)]
async fn test_splash_transitions_on_the_clock() {
    let (events, on_event) = recorder();
    let handle = spawn_page(page(Preset::Splash), on_event);
    assert!(handle.choose(0).await);

    tokio::time::sleep(ms(7100)).await;
    let summary = tokio_test::assert_ok!(handle.shutdown().await);
    assert!(summary.main_content_revealed);

    let events = events.lock().unwrap();
    let completed = events
        .iter()
        .find(|e| e.kind == PageEventKind::IntroCompleted)
        .map(|e| e.at);
    assert_eq!(completed, Some(ms(6800)));
    assert_eq!(events.last().map(|e| &e.kind), Some(&PageEventKind::Unmounted));
}

#[tokio::test(start_paused = true)]
async fn test_views_are_published() {
    let handle = spawn_page(page(Preset::Gallery), |_| {});
    let mut views = handle.subscribe();

    tokio::time::sleep(ms(250)).await;
    assert!(views.has_changed().unwrap());
    let view = views.borrow_and_update().clone();
    assert_eq!(view.particles.len(), 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_rejected_choice_keeps_running() {
    let handle = spawn_page(page(Preset::Splash), |_| {});
    assert!(handle.choose(7).await);
    assert!(handle.choose(1).await);

    tokio::time::sleep(ms(7000)).await;
    assert!(handle.view().main_content_revealed);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_through_cloned_sender() {
    let handle = spawn_page(page(Preset::Gallery), |_| {});
    let inputs = handle.inputs();

    tokio::time::sleep(ms(1000)).await;
    inputs.send(PageInput::Shutdown).await.unwrap();

    let summary = handle.shutdown().await.unwrap();
    assert_eq!(summary.particles_spawned, 5);
    assert_eq!(summary.elapsed, ms(1000));
}
