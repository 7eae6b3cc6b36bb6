use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum FieldError {
    /// `start()` was called before the detector reported ready, or after it
    /// reported a failure.
    #[error("field is not ready to run: {0}")]
    NotReady(String),
    #[error("canvas must be at least 1x1, got {0}x{1}")]
    EmptyCanvas(f32, f32),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, FieldError>;
