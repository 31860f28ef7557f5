//! # Error Types
//!
//! Custom error types for the Biospider panel using `thiserror`.

use thiserror::Error;

/// Main error type for the Biospider panel
#[derive(Debug, Error)]
pub enum PanelError {
    /// Dongle link framing errors
    #[error("Link protocol error: {0}")]
    LinkProtocol(String),

    /// Dongle link I/O errors (open, write, flush)
    #[error("Link error: {0}")]
    Link(String),

    /// No dongle could be opened on any candidate path
    #[error("No link dongle found (tried: {0})")]
    LinkNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command serialization errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type alias for the Biospider panel
pub type Result<T> = std::result::Result<T, PanelError>;
