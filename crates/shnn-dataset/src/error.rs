//! Error types for the dataset pipeline

use std::path::PathBuf;
use thiserror::Error;

use shnn_events::EventError;

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors that can occur while loading, binning or batching samples
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Event decoding or spike file error
    #[error("Event error: {source}")]
    Events {
        #[from]
        /// Source event error
        source: EventError,
    },

    /// Index, parameter or target file does not exist
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Not enough samples left for the requested minibatch
    #[error("Dataset exhausted: requested {requested} samples at cursor {cursor}, {remaining} remaining")]
    DatasetExhausted {
        /// Cursor position at the time of the call
        cursor: usize,
        /// Requested minibatch size
        requested: usize,
        /// Samples left in the index
        remaining: usize,
    },

    /// Text table or index file does not have the expected layout
    #[error("Format error in {}: {reason}", .path.display())]
    FormatError {
        /// File being parsed
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Required parameter absent from the store
    #[error("Missing parameter: {name}")]
    MissingParameter {
        /// Parameter key
        name: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Parameter file is not valid TOML
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        /// Source TOML error
        source: toml::de::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },
}

/// Coarse classification of [`DatasetError`] across both crate layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A record was not exactly 5 bytes
    MalformedRecord,
    /// A spike file length was not a multiple of 5
    TruncatedFile,
    /// A sample, index or target file was missing
    FileNotFound,
    /// End of epoch
    DatasetExhausted,
    /// Target table or index shape mismatch
    FormatError,
    /// Missing or invalid parameters
    Configuration,
    /// Any other I/O failure
    Io,
}

impl DatasetError {
    /// Create a format error for `path`
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FormatError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Map an I/O error raised while opening `path`
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path: path.into() }
        } else {
            Self::Io { source: err }
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Events { source } => match source {
                EventError::MalformedRecord { .. } => ErrorKind::MalformedRecord,
                EventError::TruncatedFile { .. } => ErrorKind::TruncatedFile,
                EventError::FileNotFound { .. } => ErrorKind::FileNotFound,
                EventError::FieldOutOfRange { .. } => ErrorKind::FormatError,
                EventError::Io { .. } => ErrorKind::Io,
            },
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::DatasetExhausted { .. } => ErrorKind::DatasetExhausted,
            Self::FormatError { .. } => ErrorKind::FormatError,
            Self::MissingParameter { .. }
            | Self::InvalidParameter { .. }
            | Self::Config { .. } => ErrorKind::Configuration,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// True when the error only signals the end of an epoch
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::DatasetExhausted { .. })
    }
}
