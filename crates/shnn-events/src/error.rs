//! Error types for the event codec and spike file reader

use std::path::PathBuf;
use thiserror::Error;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Errors that can occur while decoding or reading spike records
#[derive(Error, Debug)]
pub enum EventError {
    /// A record slice was not exactly one record long
    #[error("Malformed record: expected {expected} bytes, found {found}")]
    MalformedRecord {
        /// Required record size
        expected: usize,
        /// Size of the slice that was handed in
        found: usize,
    },

    /// A spike file whose length is not a whole number of records
    #[error("Truncated spike file {}: {len} bytes is not a multiple of {record_size}", .path.display())]
    TruncatedFile {
        /// File that was read
        path: PathBuf,
        /// File length in bytes
        len: u64,
        /// Record size in bytes
        record_size: usize,
    },

    /// Spike file does not exist
    #[error("Spike file not found: {}", .path.display())]
    FileNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// An event field cannot be represented in the record layout
    #[error("Field {field} out of range: {value} (max {max})")]
    FieldOutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: u64,
        /// Largest encodable value
        max: u64,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },
}

impl EventError {
    /// Create a malformed record error for a slice of `found` bytes
    pub fn malformed(found: usize) -> Self {
        Self::MalformedRecord {
            expected: crate::RECORD_SIZE,
            found,
        }
    }

    /// Create a field range error
    pub fn field_out_of_range(field: &'static str, value: u64, max: u64) -> Self {
        Self::FieldOutOfRange { field, value, max }
    }

    /// Map an I/O error raised while touching `path`, turning `NotFound`
    /// into [`EventError::FileNotFound`]
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path: path.into() }
        } else {
            Self::Io { source: err }
        }
    }
}
