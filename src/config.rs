use crate::report::DEFAULT_PASS_THRESHOLD_PERCENT;
use crate::transport::{DEFAULT_READ_BUFFER, DRS_PORT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3;
pub const MIN_TIMEOUT_SECONDS: u64 = 1;
pub const MAX_TIMEOUT_SECONDS: u64 = 120;
const DEFAULT_PACING_MS: u64 = 100;
const DEFAULT_MOCK_LATENCY_MIN_MS: u64 = 50;
const DEFAULT_MOCK_LATENCY_MAX_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Runtime knobs for batches. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub timeout_seconds: u64,
    pub port: u16,
    pub read_buffer_size: usize,
    /// Delay between live commands.
    pub pacing_millis: u64,
    pub mock_latency_min_millis: u64,
    pub mock_latency_max_millis: u64,
    pub pass_threshold_percent: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            port: DRS_PORT,
            read_buffer_size: DEFAULT_READ_BUFFER,
            pacing_millis: DEFAULT_PACING_MS,
            mock_latency_min_millis: DEFAULT_MOCK_LATENCY_MIN_MS,
            mock_latency_max_millis: DEFAULT_MOCK_LATENCY_MAX_MS,
            pass_threshold_percent: DEFAULT_PASS_THRESHOLD_PERCENT,
        }
    }
}

impl ValidatorConfig {
    /// No pacing and no simulated latency.
    pub fn immediate() -> Self {
        Self {
            pacing_millis: 0,
            mock_latency_min_millis: 0,
            mock_latency_max_millis: 0,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(&self.timeout_seconds) {
            return Err(ConfigError::Invalid {
                field: "timeout_seconds",
                reason: format!(
                    "{} not in {}..={}",
                    self.timeout_seconds, MIN_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS
                ),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                field: "port",
                reason: "must be non-zero".into(),
            });
        }
        if self.read_buffer_size == 0 {
            return Err(ConfigError::Invalid {
                field: "read_buffer_size",
                reason: "must be non-zero".into(),
            });
        }
        if self.mock_latency_min_millis > self.mock_latency_max_millis {
            return Err(ConfigError::Invalid {
                field: "mock_latency_min_millis",
                reason: format!(
                    "{} exceeds mock_latency_max_millis {}",
                    self.mock_latency_min_millis, self.mock_latency_max_millis
                ),
            });
        }
        if !(0.0..=100.0).contains(&self.pass_threshold_percent) {
            return Err(ConfigError::Invalid {
                field: "pass_threshold_percent",
                reason: format!("{} not in 0..=100", self.pass_threshold_percent),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Timeout for one batch. A per-call override is clamped into the same
    /// range `validate` enforces.
    pub fn effective_timeout(&self, override_seconds: Option<u64>) -> Duration {
        match override_seconds {
            Some(seconds) => Duration::from_secs(seconds.clamp(MIN_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS)),
            None => self.timeout(),
        }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_millis)
    }
}
