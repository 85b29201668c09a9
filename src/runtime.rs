//! Async Page Driver
//!
//! Runs a `LandingPage` against the tokio clock. The driver task owns the
//! page: it sleeps until the next timer deadline or the next input, advances
//! the page to the elapsed wall time and publishes a fresh `PageView` on a
//! watch channel. The page is unmounted on every exit path.

use crate::sequencing::{LandingPage, PageEvent, PageEventKind, PageView};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// External input delivered to a running page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageInput {
    /// The user picked one of the offered icons
    Choose(usize),
    /// Unmount and stop the driver
    Shutdown,
}

/// What a finished driver observed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverSummary {
    pub events: usize,
    pub particles_spawned: usize,
    pub main_content_revealed: bool,
    pub elapsed: Duration,
}

/// Handle to a running driver task
pub struct DriverHandle {
    inputs: mpsc::Sender<PageInput>,
    views: watch::Receiver<PageView>,
    task: JoinHandle<DriverSummary>,
}

impl DriverHandle {
    /// Sender for inputs; may be cloned into other tasks
    pub fn inputs(&self) -> mpsc::Sender<PageInput> {
        self.inputs.clone()
    }

    /// Latest published view
    pub fn view(&self) -> PageView {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageView> {
        self.views.clone()
    }

    pub async fn choose(&self, index: usize) -> bool {
        self.inputs.send(PageInput::Choose(index)).await.is_ok()
    }

    /// Request shutdown and wait for the driver to unmount the page
    pub async fn shutdown(self) -> anyhow::Result<DriverSummary> {
        // The driver may already be gone if every sender was dropped
        let _ = self.inputs.send(PageInput::Shutdown).await;
        Ok(self.task.await?)
    }
}

/// Spawn a driver task for `page`, calling `on_event` for every page event
pub fn spawn_page<F>(page: LandingPage, on_event: F) -> DriverHandle
where
    F: FnMut(&PageEvent) + Send + 'static,
{
    let (input_tx, input_rx) = mpsc::channel(16);
    let (view_tx, view_rx) = watch::channel(PageView::default());
    let task = tokio::spawn(drive(page, input_rx, view_tx, on_event));
    DriverHandle {
        inputs: input_tx,
        views: view_rx,
        task,
    }
}

async fn drive<F>(
    mut page: LandingPage,
    mut inputs: mpsc::Receiver<PageInput>,
    views: watch::Sender<PageView>,
    mut on_event: F,
) -> DriverSummary
where
    F: FnMut(&PageEvent),
{
    let origin = Instant::now();
    let mut summary = DriverSummary::default();
    let mut emit = |events: Vec<PageEvent>, summary: &mut DriverSummary| {
        for event in &events {
            if matches!(event.kind, PageEventKind::ParticleSpawned { .. }) {
                summary.particles_spawned += 1;
            }
            on_event(event);
        }
        summary.events += events.len();
    };

    emit(page.mount(Duration::ZERO), &mut summary);
    views.send_replace(page.view());

    loop {
        // deadlines past the clock's range never fire
        let deadline = page.next_deadline().and_then(|d| origin.checked_add(d));
        tokio::select! {
            _ = sleep_until(deadline.unwrap_or(origin)), if deadline.is_some() => {
                emit(page.advance_to(origin.elapsed()), &mut summary);
            }
            input = inputs.recv() => match input {
                Some(PageInput::Choose(index)) => {
                    match page.on_user_choice(index, origin.elapsed()) {
                        Ok(events) => emit(events, &mut summary),
                        Err(e) => tracing::warn!(error = %e, "Choice rejected"),
                    }
                }
                Some(PageInput::Shutdown) | None => break,
            },
        }
        views.send_replace(page.view());
    }

    emit(page.advance_to(origin.elapsed()), &mut summary);
    summary.main_content_revealed = page.main_content_revealed();
    summary.elapsed = page.now();
    emit(page.unmount(), &mut summary);
    views.send_replace(page.view());
    summary
}
