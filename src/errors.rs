use std::path::PathBuf;
use thiserror::Error;

/// The central error type for coinfall.
///
/// Audio playback is the only thing that can fail while a page is running,
/// and that failure is soft: [`PlaybackError`] is logged and reported as a
/// page event, never raised through here.
#[derive(Error, Debug)]
pub enum CoinfallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Intro error: {0}")]
    Intro(#[from] IntroError),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("particle symbol set is empty")]
    EmptySymbols,

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("invalid lifetime range: min {min}s, spread {spread}s")]
    InvalidLifetime { min: f64, spread: f64 },

    #[error("intro is enabled but no choice icons are configured")]
    NoChoices,

    #[error("intro step {step} has an empty payload")]
    EmptyPayload { step: usize },

    #[error("intro step {step} has a zero delay")]
    ZeroStepDelay { step: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("audio asset not found: {}", path.display())]
    AssetMissing { path: PathBuf },

    #[error("failed to start player '{program}': {message}")]
    Spawn { program: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntroError {
    #[error("choice {index} is out of range ({available} icons offered)")]
    ChoiceOutOfRange { index: usize, available: usize },

    #[error("page has no intro sequence")]
    NoIntro,
}

pub type Result<T> = std::result::Result<T, CoinfallError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<CoinfallError>() {
        return match err {
            CoinfallError::Config(_) => EXIT_CONFIG_ERROR,
            _ => EXIT_ERROR,
        };
    }

    if e.downcast_ref::<ConfigError>().is_some() {
        return EXIT_CONFIG_ERROR;
    }

    // Parse failures from `Config::load` arrive as plain anyhow context chains
    if e.chain()
        .any(|cause| cause.downcast_ref::<toml::de::Error>().is_some())
    {
        return EXIT_CONFIG_ERROR;
    }

    EXIT_ERROR
}
