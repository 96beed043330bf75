use std::path::PathBuf;

use crate::instrument::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum DrumError {
    #[error("No sound resource for instrument \"{0}\"")]
    MissingResource(Instrument),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("MIDI error: {0}")]
    Midi(String),

    #[error("Could not load instructions from {path}: {reason}")]
    HelpUnavailable { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, DrumError>;
