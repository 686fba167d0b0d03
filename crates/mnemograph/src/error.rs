//! Error types for mnemograph

use thiserror::Error;

/// Main error type for mnemograph operations
#[derive(Error, Debug)]
pub enum MnemographError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot payload did not have the expected shape
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Layout computation errors
    #[error("Layout error: {0}")]
    Layout(String),

    /// Scene or curve construction errors
    #[error("Render error: {0}")]
    Render(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl From<serde_json::Error> for MnemographError {
    fn from(e: serde_json::Error) -> Self {
        MnemographError::Serialization(e.to_string())
    }
}

/// Result type alias for mnemograph operations
pub type Result<T> = std::result::Result<T, MnemographError>;
