//! Error types shared across the crate

use std::path::PathBuf;

use thiserror::Error;

/// Rejected difficulty-mode requests
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    /// Mode name does not match any known strategy
    #[error("unknown game mode '{0}'")]
    UnknownMode(String),

    /// A run is in progress; strategies only change at menu boundaries
    #[error("cannot switch to '{requested}' while a '{active}' run is in progress")]
    RunInProgress {
        requested: &'static str,
        active: &'static str,
    },
}

/// Failures reading or writing files on disk
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Simulation invariant violations (programming errors)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}

/// A sound sink failed to play a cue
#[derive(Debug, Error)]
#[error("audio unavailable: {0}")]
pub struct AudioError(pub String);
