//! Event dataset pipeline for SNN training
//!
//! This crate turns per-sample address-event recordings into fixed-shape
//! occupancy tensors and assembles them into sequential minibatches whose
//! columns line up with pre-generated target spike trains.
//!
//! Data flow: [`SampleIndex`] → [`SpikeFileReader`] → [`TemporalBinner`] →
//! [`MinibatchAssembler`], with targets loaded by [`OutputSpikeLoader`].

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export essential types from the event layer
pub use shnn_events::{AddressEvent, EventError, SpikeFileReader};

// Core modules
pub mod error;
pub mod params;
pub mod sample;
pub mod binning;
pub mod assembler;
pub mod targets;
pub mod reader;

// Re-export essential types
pub use error::{DatasetError, ErrorKind, Result};
pub use params::{DatasetParams, OccupancyMode, ParamStore, ParamValue};
pub use sample::{Sample, SampleIndex};
pub use binning::{BinStats, SpikeTensor, TemporalBinner};
pub use assembler::{Minibatch, MinibatchAssembler};
pub use targets::OutputSpikeLoader;
pub use reader::DataReader;

/// Dataset crate version for compatibility checking
pub const DATASET_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        // Decoded record flows straight into the binner
        let event = shnn_events::decode_record(&[0x12, 0x10, 0x80, 0x03, 0x7d]).unwrap();
        let params = DatasetParams::new(0.0, 1000.0, 100.0, 34, 34, 2).unwrap();
        let tensor = TemporalBinner::new(&params).bin(&[event]);

        let row = params.flat_index(18, 16, 1).unwrap();
        assert_eq!(tensor[[row, 8]], 1.0);
        assert_eq!(tensor.sum(), 1.0);
    }
}
