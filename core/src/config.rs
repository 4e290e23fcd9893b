//! Engine limits and defaults.
//!
//! Loaded from a JSON file by the runner; tests use `SimConfig::default()`.
//! Every field is optional in the file and falls back to its default.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum number of glasses alive at once.
    pub max_glasses: usize,
    /// Largest capacity a single glass may be created with.
    pub max_capacity_secs: u64,
    /// Upper bound on one clock sample, so a stalled host does not jump ahead.
    pub max_sample_delta_ms: u64,
    /// Keep at most this many flip records. `None` keeps all of them.
    pub flip_log_limit: Option<usize>,
    /// Speed multiplier a fresh engine starts with.
    pub default_speed: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_glasses:         64,
            max_capacity_secs:   3600,
            max_sample_delta_ms: 200,
            flip_log_limit:      None,
            default_speed:       1.0,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file at `path`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.max_glasses == 0 {
            return Err(invalid("max_glasses must be > 0"));
        }
        if self.max_capacity_secs == 0 {
            return Err(invalid("max_capacity_secs must be > 0"));
        }
        if self.max_sample_delta_ms == 0 {
            return Err(invalid("max_sample_delta_ms must be > 0"));
        }
        if self.flip_log_limit == Some(0) {
            return Err(invalid("flip_log_limit must be > 0 when set"));
        }
        if !(self.default_speed.is_finite() && self.default_speed > 0.0) {
            return Err(SimError::InvalidSpeed { multiplier: self.default_speed });
        }
        Ok(())
    }

    pub fn max_sample_delta(&self) -> Duration {
        Duration::from_millis(self.max_sample_delta_ms)
    }
}

fn invalid(reason: &str) -> SimError {
    SimError::InvalidConfig { reason: reason.to_string() }
}
