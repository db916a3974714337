//! Sequential minibatch assembly
//!
//! A [`MinibatchAssembler`] walks its [`SampleIndex`] front to back. Each
//! successful call consumes exactly `size` samples; a call that cannot be
//! served leaves the cursor where it was. There is no wraparound: an epoch
//! ends with [`DatasetError::DatasetExhausted`] and the caller either
//! [`reset`](MinibatchAssembler::reset)s or builds a new assembler.
//!
//! The assembler holds no locks. Consumers on different threads each need
//! their own instance.

use ndarray::{s, Array2};
use shnn_events::SpikeFileReader;

use crate::{
    binning::{SpikeTensor, TemporalBinner},
    error::{DatasetError, Result},
    params::DatasetParams,
    sample::{Sample, SampleIndex},
};

/// One assembled minibatch
#[derive(Debug, Clone, PartialEq)]
pub struct Minibatch {
    /// `(input_size, samples.len() * num_time_bins)` input tensor
    pub input: SpikeTensor,
    /// Labels in traversal order
    pub labels: Vec<u32>,
    /// Samples in traversal order
    pub samples: Vec<Sample>,
}

impl Minibatch {
    /// Number of samples in the batch
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the batch is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Stateful sequential cursor over a sample index
#[derive(Debug, Clone)]
pub struct MinibatchAssembler {
    index: SampleIndex,
    reader: SpikeFileReader,
    binner: TemporalBinner,
    cursor: usize,
}

impl MinibatchAssembler {
    /// Create an assembler positioned at the start of `index`
    pub fn new(index: SampleIndex, reader: SpikeFileReader, params: &DatasetParams) -> Self {
        Self {
            index,
            reader,
            binner: TemporalBinner::new(params),
            cursor: 0,
        }
    }

    /// Assemble the next `size` samples into one input tensor.
    ///
    /// Fails with [`DatasetError::DatasetExhausted`] when fewer than `size`
    /// samples remain. On any failure the cursor is left unchanged.
    pub fn get_minibatch(&mut self, size: usize) -> Result<SpikeTensor> {
        self.next_minibatch(size).map(|batch| batch.input)
    }

    /// Like [`get_minibatch`](Self::get_minibatch), also returning the
    /// labels and samples of the batch
    pub fn next_minibatch(&mut self, size: usize) -> Result<Minibatch> {
        if size == 0 {
            return Err(DatasetError::invalid_parameter("minibatch size", "0", ">= 1"));
        }

        let end = self
            .cursor
            .checked_add(size)
            .filter(|&end| end <= self.index.len())
            .ok_or(DatasetError::DatasetExhausted {
                cursor: self.cursor,
                requested: size,
                remaining: self.remaining(),
            })?;

        let samples = self.index.as_slice()[self.cursor..end].to_vec();
        let bins = self.binner.params().num_time_bins();
        let mut input = Array2::zeros((self.binner.params().input_size(), size * bins));

        for (k, sample) in samples.iter().enumerate() {
            let events = self.reader.read_sample(sample.id)?;
            let block = input.slice_mut(s![.., k * bins..(k + 1) * bins]);
            self.binner.bin_into(&events, block)?;
        }

        log::debug!(
            "Assembled minibatch of {} samples at cursor {} ({} remaining after)",
            size,
            self.cursor,
            self.index.len() - end
        );
        self.cursor = end;

        Ok(Minibatch {
            input,
            labels: samples.iter().map(|s| s.label).collect(),
            samples,
        })
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Samples not yet consumed this epoch
    pub fn remaining(&self) -> usize {
        self.index.len().saturating_sub(self.cursor)
    }

    /// Total samples in the index
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Rewind to the first sample for a new epoch
    pub fn reset(&mut self) {
        log::debug!("Resetting minibatch cursor from {}", self.cursor);
        self.cursor = 0;
    }

    /// Underlying sample index
    pub fn samples(&self) -> &SampleIndex {
        &self.index
    }

    /// Binner in use
    pub fn binner(&self) -> &TemporalBinner {
        &self.binner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shnn_events::{write_spike_file, AddressEvent};

    fn setup(num_samples: u32) -> (tempfile::TempDir, MinibatchAssembler) {
        let temp_dir = tempfile::tempdir().unwrap();
        for id in 1..=num_samples {
            // One event per sample: unit `id % 4`, bin `id % 5`
            let event = AddressEvent::new((id % 2) as u8, ((id / 2) % 2) as u8, 0, (id % 5) * 10);
            write_spike_file(temp_dir.path().join(format!("{}.bs2", id)), &[event]).unwrap();
        }
        let index: SampleIndex = (1..=num_samples).map(|id| Sample::new(id, id % 10)).collect();
        let params = DatasetParams::new(0.0, 50.0, 10.0, 2, 2, 1).unwrap();
        let assembler = MinibatchAssembler::new(index, SpikeFileReader::new(temp_dir.path()), &params);
        (temp_dir, assembler)
    }

    #[test]
    fn test_shape_and_cursor_advance() {
        let (_dir, mut assembler) = setup(7);
        let batch = assembler.get_minibatch(3).unwrap();
        assert_eq!(batch.dim(), (4, 15));
        assert_eq!(assembler.cursor(), 3);
        assert_eq!(assembler.remaining(), 4);
    }

    #[test]
    fn test_column_blocks_follow_traversal_order() {
        let (_dir, mut assembler) = setup(4);
        let batch = assembler.next_minibatch(2).unwrap();
        assert_eq!(batch.labels, vec![1, 2]);

        // Sample 1 -> unit 1, bin 1; sample 2 -> unit 2, bin 2 (offset by 5 columns)
        assert_eq!(batch.input[[1, 1]], 1.0);
        assert_eq!(batch.input[[2, 5 + 2]], 1.0);
        assert_eq!(batch.input.sum(), 2.0);
    }

    #[test]
    fn test_exhaustion_leaves_cursor() {
        let (_dir, mut assembler) = setup(5);
        assembler.get_minibatch(3).unwrap();

        let err = assembler.get_minibatch(3).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::DatasetExhausted { cursor: 3, requested: 3, remaining: 2 }
        ));
        assert_eq!(assembler.cursor(), 3);

        // A batch that still fits succeeds
        assert_eq!(assembler.get_minibatch(2).unwrap().dim(), (4, 10));
        assert_eq!(assembler.remaining(), 0);
        assert!(assembler.get_minibatch(1).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_zero_size_rejected() {
        let (_dir, mut assembler) = setup(2);
        assert!(matches!(
            assembler.get_minibatch(0),
            Err(DatasetError::InvalidParameter { .. })
        ));
        assert_eq!(assembler.cursor(), 0);
    }

    #[test]
    fn test_missing_sample_leaves_cursor() {
        let (dir, mut assembler) = setup(4);
        std::fs::remove_file(dir.path().join("2.bs2")).unwrap();

        let err = assembler.get_minibatch(2).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::FileNotFound);
        assert_eq!(assembler.cursor(), 0);
    }

    #[test]
    fn test_reset_starts_new_epoch() {
        let (_dir, mut assembler) = setup(4);
        let first = assembler.get_minibatch(4).unwrap();
        assert!(assembler.get_minibatch(1).is_err());

        assembler.reset();
        assert_eq!(assembler.cursor(), 0);
        assert_eq!(assembler.get_minibatch(4).unwrap(), first);
    }
}
