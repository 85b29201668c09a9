//! Built-in landing page variants

use super::Config;
use std::path::PathBuf;

/// Which landing page variant to start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Framed artwork with falling emoji from the first frame (default)
    #[default]
    Gallery,
    /// Icon choice and timed splash script before the main content
    Splash,
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Gallery => write!(f, "gallery"),
            Preset::Splash => write!(f, "splash"),
        }
    }
}

impl Config {
    /// Switch the variant-defining settings without touching the rest.
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Gallery => {
                self.intro.enabled = false;
            }
            Preset::Splash => {
                self.intro.enabled = true;
                if self.audio.asset.is_none() {
                    self.audio.asset = Some(PathBuf::from("assets/theme.mp3"));
                }
            }
        }
    }
}
