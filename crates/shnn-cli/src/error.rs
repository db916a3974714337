//! Error handling for the dataset CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Dataset pipeline error
    #[error("Dataset error: {0}")]
    Dataset(#[from] shnn_dataset::DatasetError),

    /// Event codec error
    #[error("Event error: {0}")]
    Events(#[from] shnn_events::EventError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

impl CliError {
    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }
}
