//! Configuration management for Trellis.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`TRELLIS__` prefix, `__` separator)
//! 2. Config file (`trellis.toml`)
//! 3. Defaults

use serde::{Deserialize, Serialize};

use crate::error::TrellisError;

/// How a validated collection reacts to a mutation started from inside one
/// of its own callbacks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReentrancyPolicy {
    /// Nested mutations run immediately and cascade unguarded.
    #[default]
    Allow,
    /// Nested mutations of a collection that is mid-mutation fail.
    Reject,
}

/// Graph behaviour settings (`[graph]` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphConfig {
    #[serde(default)]
    pub reentrancy: ReentrancyPolicy,
}

/// Logging settings (`[log]` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

/// Top-level Trellis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrellisConfig {
    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl TrellisConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and the
    /// environment.
    pub fn load(file_prefix: &str) -> Result<Self, TrellisError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("TRELLIS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: TrellisConfig = cfg.try_deserialize()?;
        if loaded.log.filter.trim().is_empty() {
            return Err(TrellisError::InvalidSetting {
                key: "log.filter".to_string(),
                reason: "filter directive must not be empty".to_string(),
            });
        }
        Ok(loaded)
    }
}
