//! Error types

use thiserror::Error;

/// Failures that abort a frame
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to allocate frame buffer of {width}x{height}")]
    Allocation { width: i32, height: i32 },
}

/// Failures loading or saving canvas settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}
