//! Configuration Management
//!
//! Loads the per-variant constants of a landing page from TOML files.
//! Configuration includes:
//! - Particle settings (symbol set, spawn interval, lifetime range, seed)
//! - Intro script (choices, highlight cycle, per-step payloads and delays)
//! - Audio asset and the external player used to start it
//! - Static main-content strings shown once the intro completes

mod presets;

pub use presets::Preset;

use crate::errors::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Longest particle lifetime (`min + spread`) a config may ask for
pub const MAX_LIFETIME_SECS: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub particles: ParticleConfig,

    #[serde(default)]
    pub intro: IntroConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default = "default_spawn_interval")]
    pub spawn_interval_ms: u64,
    #[serde(default = "default_min_lifetime")]
    pub min_lifetime_secs: f64,
    #[serde(default = "default_lifetime_spread")]
    pub lifetime_spread_secs: f64,
    /// Fixed RNG seed; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Delay spent in each step unless the step overrides it
    #[serde(default = "default_step_delay")]
    pub step_delay_ms: u64,
    #[serde(default = "default_highlight_interval")]
    pub highlight_interval_ms: u64,
    #[serde(default = "default_choices")]
    pub choices: Vec<String>,
    #[serde(default = "default_steps")]
    pub steps: Vec<IntroStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroStep {
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Background track started on the first choice; no audio when unset
    #[serde(default)]
    pub asset: Option<PathBuf>,
    #[serde(default = "default_player")]
    pub player: String,
    #[serde(default = "default_player_args")]
    pub player_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default = "default_blurb")]
    pub blurb: String,
    #[serde(default = "default_caption")]
    pub caption: String,
    #[serde(default = "default_links")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            spawn_interval_ms: default_spawn_interval(),
            min_lifetime_secs: default_min_lifetime(),
            lifetime_spread_secs: default_lifetime_spread(),
            seed: None,
        }
    }
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            step_delay_ms: default_step_delay(),
            highlight_interval_ms: default_highlight_interval(),
            choices: default_choices(),
            steps: default_steps(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            asset: None,
            player: default_player(),
            player_args: default_player_args(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            blurb: default_blurb(),
            caption: default_caption(),
            links: default_links(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    [
        "📈", "📉", "💹", "💲", "💱", "🤑", "💰", "💵", "💸", "💳", "🏦", "💴", "🧲", "🐂", "🐾",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_spawn_interval() -> u64 {
    200
}
fn default_min_lifetime() -> f64 {
    3.0
}
fn default_lifetime_spread() -> f64 {
    2.0
}
fn default_step_delay() -> u64 {
    1700
}
fn default_highlight_interval() -> u64 {
    500
}
fn default_choices() -> Vec<String> {
    vec!["🐂".to_string(), "🐻".to_string(), "🐸".to_string()]
}
fn default_steps() -> Vec<IntroStep> {
    ["you chose wisely", "💰", "💸", "🚀"]
        .iter()
        .map(|payload| IntroStep {
            payload: payload.to_string(),
            delay_ms: None,
        })
        .collect()
}
fn default_player() -> String {
    "ffplay".to_string()
}
fn default_player_args() -> Vec<String> {
    ["-nodisp", "-autoexit", "-loglevel", "quiet"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_title() -> String {
    "Freaky Lisa".to_string()
}
fn default_subtitle() -> String {
    "(circa 2024)".to_string()
}
fn default_blurb() -> String {
    "Calm, collected, and unshaken, no matter how turbulent the market becomes.".to_string()
}
fn default_caption() -> String {
    "CA: uploading...".to_string()
}
fn default_links() -> Vec<Link> {
    vec![
        Link {
            label: "Twitter".to_string(),
            url: "https://x.com/dogcassocoin".to_string(),
        },
        Link {
            label: "Telegram".to_string(),
            url: "https://t.me/dcassosol".to_string(),
        },
    ]
}

impl ParticleConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Mean lifetime, used to estimate the steady-state live set size
    pub fn mean_lifetime_secs(&self) -> f64 {
        self.min_lifetime_secs + self.lifetime_spread_secs / 2.0
    }
}

impl IntroConfig {
    /// Number of scripted steps (N)
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn highlight_interval(&self) -> Duration {
        Duration::from_millis(self.highlight_interval_ms)
    }

    /// Time spent in step `step` (1-based) before auto-advancing
    pub fn delay_for(&self, step: usize) -> Duration {
        let ms = step
            .checked_sub(1)
            .and_then(|i| self.steps.get(i))
            .and_then(|s| s.delay_ms)
            .unwrap_or(self.step_delay_ms);
        Duration::from_millis(ms)
    }

    /// Payload displayed while in step `step` (1-based)
    pub fn payload_for(&self, step: usize) -> Option<&str> {
        step.checked_sub(1)
            .and_then(|i| self.steps.get(i))
            .map(|s| s.payload.as_str())
    }
}

impl Config {
    /// Built-in configuration for a preset variant
    pub fn preset(preset: Preset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Read and validate the configuration
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file and apply env overrides without validating, for callers
    /// that layer more overrides on top before calling [`Config::validate`]
    pub fn read(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config from {}", p))?;
                toml::from_str(&content).context("Failed to parse config")?
            }
            None => {
                let home_config = dirs::home_dir().map(|h| h.join(".config/coinfall/config.toml"));

                let mut default_paths = vec![PathBuf::from("coinfall.toml")];
                default_paths.extend(home_config);

                let mut loaded = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        tracing::debug!(path = %p.display(), "Loaded config");
                        loaded = Some(toml::from_str(&content).context("Failed to parse config")?);
                        break;
                    }
                }
                loaded.unwrap_or_else(|| {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                })
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(seed) = std::env::var("COINFALL_SEED") {
            if let Ok(s) = seed.parse::<u64>() {
                self.particles.seed = Some(s);
            }
        }
        if let Ok(interval) = std::env::var("COINFALL_SPAWN_INTERVAL_MS") {
            if let Ok(ms) = interval.parse::<u64>() {
                self.particles.spawn_interval_ms = ms;
            }
        }
        if let Ok(delay) = std::env::var("COINFALL_STEP_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                self.intro.step_delay_ms = ms;
            }
        }
        if let Ok(asset) = std::env::var("COINFALL_AUDIO_ASSET") {
            self.audio.asset = Some(PathBuf::from(asset));
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let p = &self.particles;
        if p.symbols.is_empty() {
            return Err(ConfigError::EmptySymbols);
        }
        if p.spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "particles.spawn_interval_ms",
            });
        }
        let lifetime_ok = p.min_lifetime_secs.is_finite()
            && p.lifetime_spread_secs.is_finite()
            && p.min_lifetime_secs > 0.0
            && p.lifetime_spread_secs >= 0.0
            && p.min_lifetime_secs + p.lifetime_spread_secs <= MAX_LIFETIME_SECS;
        if !lifetime_ok {
            return Err(ConfigError::InvalidLifetime {
                min: p.min_lifetime_secs,
                spread: p.lifetime_spread_secs,
            });
        }

        let intro = &self.intro;
        if !intro.enabled {
            return Ok(());
        }
        if intro.choices.is_empty() {
            return Err(ConfigError::NoChoices);
        }
        if intro.highlight_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "intro.highlight_interval_ms",
            });
        }
        for (i, step) in intro.steps.iter().enumerate() {
            let n = i + 1;
            if step.payload.trim().is_empty() {
                return Err(ConfigError::EmptyPayload { step: n });
            }
            if intro.delay_for(n).is_zero() {
                return Err(ConfigError::ZeroStepDelay { step: n });
            }
        }
        Ok(())
    }
}
