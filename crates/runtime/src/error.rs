//! Unified error type surfaced by the simulation runtime.
//!
//! Wraps failures from scenario loading, configuration validation, the rune
//! pool and trace digesting so the binary can bubble them up with context.
use std::path::PathBuf;

use rune_core::RuneError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario RON")]
    ScenarioParse(#[source] ron::error::SpannedError),

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Rune(#[from] RuneError),

    #[error("failed to encode pool snapshot for the trace digest")]
    Digest(#[source] bincode::Error),
}
