//! Background Audio
//!
//! The only fallible action of a running page. Playback is started from the
//! beginning on the first icon choice; a failure is reported to the caller,
//! which logs it and carries on.

use crate::config::AudioConfig;
use crate::errors::PlaybackError;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Something that can play the page's background track
pub trait Playback: Send {
    /// Start playback from position zero, restarting if already playing
    fn play_from_start(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback; a no-op when nothing is playing
    fn stop(&mut self);
}

/// Used when no audio asset is configured
#[derive(Debug, Default)]
pub struct NullPlayback;

impl Playback for NullPlayback {
    fn play_from_start(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Plays the asset through an external player process
#[derive(Debug)]
pub struct CommandPlayback {
    program: String,
    args: Vec<String>,
    asset: PathBuf,
    child: Option<Child>,
}

impl CommandPlayback {
    pub fn new(program: impl Into<String>, args: Vec<String>, asset: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            asset: asset.into(),
            child: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.child.is_some()
    }
}

impl Playback for CommandPlayback {
    fn play_from_start(&mut self) -> Result<(), PlaybackError> {
        if !self.asset.is_file() {
            return Err(PlaybackError::AssetMissing {
                path: self.asset.clone(),
            });
        }

        self.stop();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.asset)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(pid = child.id(), asset = %self.asset.display(), "Audio player started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // The player may already have exited on its own
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("Audio player stopped");
        }
    }
}

impl Drop for CommandPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build the playback backend described by the config
pub fn from_config(audio: &AudioConfig) -> Box<dyn Playback> {
    match &audio.asset {
        Some(asset) => Box::new(CommandPlayback::new(
            audio.player.clone(),
            audio.player_args.clone(),
            asset.clone(),
        )),
        None => Box::new(NullPlayback),
    }
}
