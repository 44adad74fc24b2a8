//! # Processor Settings
//!
//! Opaque settings accepted at processor construction and threaded through
//! unchanged. The processing core never interprets specific keys itself;
//! enforcement hooks and dispatchers read their own keys through the typed
//! getters (deadline fallbacks, retry policy, and so on).

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};

use crate::error::{DagFlowError, Result};

const ENV_PREFIX: &str = "DAGFLOW";

/// Layered, uninterpreted settings for DAG-action processors.
///
/// Built from an optional file source plus `DAGFLOW_`-prefixed environment
/// variables (`DAGFLOW_DEADLINES__DEFAULT_START_DEADLINE_SECS=300` maps to
/// `deadlines.default_start_deadline_secs`).
#[derive(Debug, Clone, Default)]
pub struct DagProcSettings {
    raw: Config,
}

impl DagProcSettings {
    /// Settings with no sources; every lookup returns `None`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load settings from environment variables only
    pub fn from_env() -> Result<Self> {
        let raw = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| DagFlowError::Configuration(e.to_string()))?;
        Ok(Self { raw })
    }

    /// Load settings from a file, with environment variables layered on top
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| DagFlowError::Configuration(e.to_string()))?;
        Ok(Self { raw })
    }

    /// Wrap an already-built configuration
    pub fn from_config(raw: Config) -> Self {
        Self { raw }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.raw.get_string(key).ok()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.raw.get_int(key).ok()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.raw.get_bool(key).ok()
    }

    /// Read an integer number of seconds as a duration
    pub fn get_duration_secs(&self, key: &str) -> Option<Duration> {
        self.get_i64(key)
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }
}
