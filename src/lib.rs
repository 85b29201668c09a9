//! Coinfall - timed UI sequencing for a landing page
//!
//! Two timer-driven components share one virtual clock:
//!
//! - **Particles**: emoji spawned at a fixed interval, each falling for a
//!   random lifetime before it is removed
//! - **Intro**: an icon choice followed by a finite splash script that
//!   reveals the main content when it completes
//!
//! The core is sans-IO. A `LandingPage` owns a `TimerQueue` and is advanced
//! explicitly, so the same page runs under the tokio driver (`runtime`), the
//! terminal UI (`ui::tui`) or a pure virtual-time `simulate`.
//!
//! # Quick Start
//!
//! ```ignore
//! use coinfall::{Config, LandingPage};
//! use std::time::Duration;
//!
//! let config = Config::load(None)?;
//! let mut page = LandingPage::from_config(&config);
//! page.mount(Duration::ZERO);
//! page.advance_to(Duration::from_secs(1));
//! println!("{} particles", page.view().particles.len());
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod runtime;
pub mod sequencing;
pub mod simulate;
pub mod ui;

pub use config::{Config, Preset};
pub use errors::{CoinfallError, Result};
pub use sequencing::{IntroSequencer, LandingPage, PageEvent, PageView, ParticleSpawner};
