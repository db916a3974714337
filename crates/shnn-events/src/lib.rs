//! Address-event spike records for the hSNN dataset pipeline
//!
//! This crate decodes the compact 5-byte spike record format used by the
//! per-sample `.bs2` recordings and reads whole sample files into ordered
//! event sequences. It holds no state: every call re-reads from storage.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod record;

// File access
pub mod reader;

// Re-export essential types
pub use error::{EventError, Result};
pub use record::{
    decode_record, decode_stream, encode_record, encode_stream, AddressEvent, RecordIter,
    MAX_CHANNEL, MAX_TIMESTAMP, RECORD_SIZE,
};
pub use reader::{read_spike_file, write_spike_file, SpikeFileReader, SPIKE_FILE_EXTENSION};

/// Events crate version for compatibility checking
pub const EVENTS_VERSION: u32 = 1;
