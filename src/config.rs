/// Machine configuration, stored as RON
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DrumError, Result};
use crate::feedback::DEFAULT_FLASH_MS;
use crate::sequencer::recorder::DEFAULT_PLAYBACK_TAIL_MS;
use crate::sequencer::{DEFAULT_BEATS_PER_SEQUENCE, DEFAULT_TICK_INTERVAL_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputBackend {
    /// WAV samples played through the default audio device
    Audio,
    /// General MIDI drum notes on the given output port
    Midi { port: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub beats_per_sequence: usize,
    pub tick_interval_ms: u64,
    pub flash_ms: u64,
    pub playback_tail_ms: u64,
    pub initial_volume: f32,
    pub sounds_dir: PathBuf,
    pub help_path: PathBuf,
    pub backend: OutputBackend,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            beats_per_sequence: DEFAULT_BEATS_PER_SEQUENCE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            flash_ms: DEFAULT_FLASH_MS,
            playback_tail_ms: DEFAULT_PLAYBACK_TAIL_MS,
            initial_volume: 1.0,
            sounds_dir: PathBuf::from("sounds"),
            help_path: PathBuf::from("user_manual.md"),
            backend: OutputBackend::Audio,
        }
    }
}

impl MachineConfig {
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(text).map_err(|e| DrumError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DrumError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Defaults when the file is absent or unusable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using default configuration", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.beats_per_sequence == 0 {
            return Err(DrumError::Config(
                "beats_per_sequence must be at least 1".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(DrumError::Config(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(DrumError::Config(format!(
                "initial_volume {} is outside 0.0..=1.0",
                self.initial_volume
            )));
        }
        Ok(())
    }
}
