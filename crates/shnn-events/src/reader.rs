//! File-based spike record access
//!
//! One file per sample, named `<sample id>.bs2` under a dataset root.

use crate::{
    error::{EventError, Result},
    record::{decode_stream, encode_stream, AddressEvent, RECORD_SIZE},
};

use std::fs;
use std::path::{Path, PathBuf};

/// File extension of per-sample spike files
pub const SPIKE_FILE_EXTENSION: &str = "bs2";

/// Reads per-sample spike files from a dataset directory
#[derive(Debug, Clone)]
pub struct SpikeFileReader {
    /// Base directory holding `<id>.bs2` files
    root: PathBuf,
}

impl SpikeFileReader {
    /// Create a reader over `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Dataset root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path of a sample's spike file
    pub fn path_for(&self, sample_id: u32) -> PathBuf {
        self.root
            .join(format!("{}.{}", sample_id, SPIKE_FILE_EXTENSION))
    }

    /// Read and decode every event of one sample, in on-disk order
    pub fn read_sample(&self, sample_id: u32) -> Result<Vec<AddressEvent>> {
        self.read_path(self.path_for(sample_id))
    }

    /// Read and decode every event of the file at `path`
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<AddressEvent>> {
        read_spike_file(path)
    }
}

/// Read a spike file fully and decode it.
///
/// The file is re-read on every call.
pub fn read_spike_file<P: AsRef<Path>>(path: P) -> Result<Vec<AddressEvent>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| EventError::from_io(path, e))?;

    if bytes.len() % RECORD_SIZE != 0 {
        return Err(EventError::TruncatedFile {
            path: path.to_path_buf(),
            len: bytes.len() as u64,
            record_size: RECORD_SIZE,
        });
    }

    let events = decode_stream(&bytes)?;
    log::debug!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Write events as a headerless spike file
pub fn write_spike_file<P: AsRef<Path>>(path: P, events: &[AddressEvent]) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_stream(events)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, bytes)?;
    log::debug!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}
