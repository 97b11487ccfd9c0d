//! Top-level error type.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::engine::InvariantViolation;
use crate::input::InputError;
use crate::snapshot::SinkError;

/// Any error that aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Malformed or unreadable input.
    #[error("input error: {0}")]
    Input(#[from] InputError),
    /// Snapshot could not be persisted.
    #[error("snapshot error: {0}")]
    Sink(#[from] SinkError),
    /// Input file could not be opened.
    #[error("cannot open input {path}: {source}")]
    OpenInput {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Internal consistency check failed (implementation defect).
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}
