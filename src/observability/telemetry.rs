//! Telemetry
//!
//! Structured logging for the page event loop.
//! Features:
//! - Configurable log levels via RUST_LOG
//! - Compact stderr output for headless commands
//! - File output for the terminal UI, which owns the screen
//! - Intro state transition logging

use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file written while the terminal UI is active
pub const LOG_FILE_NAME: &str = "coinfall.log";

/// Initialize global tracing on stderr.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` and the
/// default stays at `warn` so command output is not interleaved with logs.
pub fn init_tracing(verbose: bool) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "coinfall=debug".to_string()
        } else {
            "warn".to_string()
        }
    });
    init_tracing_with_filter(&filter);
}

/// Initialize with custom filter string
pub fn init_tracing_with_filter(filter: &str) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_level(true)
            .compact()
            .with_writer(std::io::stderr);

        let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    });
}

/// Initialize tracing into `dir/coinfall.log`.
///
/// The returned guard flushes buffered lines when dropped and must be held
/// for as long as the UI runs.
pub fn init_file_tracing(dir: &Path, verbose: bool) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let level = if verbose { "coinfall=debug" } else { "coinfall=info" };
        level.to_string()
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .try_init();

    Ok(guard)
}

/// Sanitize a string for safe log output by escaping control characters.
/// Applied to configured text (step payloads, symbols, player errors) before
/// it reaches a log line or the event listing.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Record intro state transition
pub fn record_state_transition(from: &str, to: &str) {
    let safe_from = sanitize_for_log(from);
    let safe_to = sanitize_for_log(to);
    info!(
        from = safe_from.as_str(),
        to = safe_to.as_str(),
        "Intro state transition"
    );
}

/// Initialize tracing for tests with a simple subscriber
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
