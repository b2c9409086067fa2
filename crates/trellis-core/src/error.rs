use thiserror::Error;

/// Top-level error type for Trellis configuration and setup.
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
}
