//! Run configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::DEFAULT_OBS_DAYS;

/// Where edge removals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    /// Edges expire after a time-to-live.
    #[default]
    Ttl,
    /// Edges are removed by `-` records in the input.
    Explicit,
}

impl FromStr for RemovalMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ttl" => Ok(Self::Ttl),
            "explicit" => Ok(Self::Explicit),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for RemovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ttl => write!(f, "ttl"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Observation window must be at least one day.
    #[error("observation window must be at least 1 day")]
    ZeroObservationWindow,
    /// Time-to-live must be at least one day.
    #[error("edge time-to-live must be at least 1 day")]
    ZeroTimeToLive,
    /// Unrecognized removal mode.
    #[error("unknown removal mode '{0}' (expected 'ttl' or 'explicit')")]
    UnknownMode(String),
}

/// Settings for one run over an edge stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Edge time-to-live in days. `None` means edges never expire.
    pub ttl_days: Option<u32>,
    /// Observation window in days between snapshots.
    pub obs_days: u32,
    /// Directory receiving snapshot files.
    pub output_dir: PathBuf,
    /// Removal strategy.
    pub mode: RemovalMode,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            ttl_days: None,
            obs_days: DEFAULT_OBS_DAYS,
            output_dir: PathBuf::from("."),
            mode: RemovalMode::Ttl,
        }
    }
}

impl KernelConfig {
    /// Set the time-to-live.
    pub fn with_ttl(mut self, days: u32) -> Self {
        self.ttl_days = Some(days);
        self
    }

    /// Set the observation window.
    pub fn with_obs(mut self, days: u32) -> Self {
        self.obs_days = days;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the removal mode.
    pub fn with_mode(mut self, mode: RemovalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.obs_days == 0 {
            return Err(ConfigError::ZeroObservationWindow);
        }
        if self.mode == RemovalMode::Ttl && self.ttl_days == Some(0) {
            return Err(ConfigError::ZeroTimeToLive);
        }
        Ok(())
    }
}
