//! Dataset facade: one root directory, a training and a testing index

use std::path::{Path, PathBuf};

use shnn_events::{AddressEvent, SpikeFileReader};

use crate::{
    assembler::MinibatchAssembler,
    binning::{SpikeTensor, TemporalBinner},
    error::Result,
    params::DatasetParams,
    sample::{Sample, SampleIndex},
    targets::OutputSpikeLoader,
};

/// Entry point for reading an event dataset laid out as
/// `<root>/<id>.bs2` plus index and target files under the same root
#[derive(Debug, Clone)]
pub struct DataReader {
    dataset_path: PathBuf,
    params: DatasetParams,
    training: SampleIndex,
    testing: SampleIndex,
    files: SpikeFileReader,
    binner: TemporalBinner,
}

impl DataReader {
    /// Open a dataset root and load both index files from it
    pub fn open<P: AsRef<Path>>(
        dataset_path: P,
        training_index: &str,
        testing_index: &str,
        params: &DatasetParams,
    ) -> Result<Self> {
        let dataset_path = dataset_path.as_ref().to_path_buf();
        let training = SampleIndex::from_file(dataset_path.join(training_index))?;
        let testing = SampleIndex::from_file(dataset_path.join(testing_index))?;
        Ok(Self::from_indices(dataset_path, training, testing, params))
    }

    /// Build a reader from indices that are already loaded
    pub fn from_indices<P: AsRef<Path>>(
        dataset_path: P,
        training: SampleIndex,
        testing: SampleIndex,
        params: &DatasetParams,
    ) -> Self {
        let dataset_path = dataset_path.as_ref().to_path_buf();
        Self {
            files: SpikeFileReader::new(&dataset_path),
            binner: TemporalBinner::new(params),
            params: params.clone(),
            dataset_path,
            training,
            testing,
        }
    }

    /// Dataset root
    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Parameters in use
    pub fn params(&self) -> &DatasetParams {
        &self.params
    }

    /// Training samples in traversal order
    pub fn training_samples(&self) -> &SampleIndex {
        &self.training
    }

    /// Testing samples in traversal order
    pub fn testing_samples(&self) -> &SampleIndex {
        &self.testing
    }

    /// Path of a sample's spike file
    pub fn sample_path(&self, sample: &Sample) -> PathBuf {
        self.files.path_for(sample.id)
    }

    /// Read and decode a sample's events
    pub fn read_input_file(&self, sample: &Sample) -> Result<Vec<AddressEvent>> {
        Ok(self.files.read_sample(sample.id)?)
    }

    /// Bin already decoded events
    pub fn bin_spikes(&self, events: &[AddressEvent]) -> SpikeTensor {
        self.binner.bin(events)
    }

    /// Read and bin one sample
    pub fn read_and_bin(&self, sample: &Sample) -> Result<SpikeTensor> {
        let events = self.read_input_file(sample)?;
        Ok(self.bin_spikes(&events))
    }

    /// Fresh assembler over the training samples (one epoch)
    pub fn training_batches(&self) -> MinibatchAssembler {
        MinibatchAssembler::new(self.training.clone(), self.files.clone(), &self.params)
    }

    /// Fresh assembler over the testing samples (one epoch)
    pub fn testing_batches(&self) -> MinibatchAssembler {
        MinibatchAssembler::new(self.testing.clone(), self.files.clone(), &self.params)
    }

    /// Load a target spike file relative to the dataset root
    pub fn read_output_spikes(&self, name: &str) -> Result<SpikeTensor> {
        OutputSpikeLoader::new(&self.dataset_path, &self.params).load(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatasetError;

    #[test]
    fn test_open_missing_index() {
        let temp_dir = tempfile::tempdir().unwrap();
        let params = DatasetParams::new(0.0, 10.0, 1.0, 2, 2, 1).unwrap();
        let err = DataReader::open(temp_dir.path(), "train.txt", "test.txt", &params).unwrap_err();
        assert!(matches!(err, DatasetError::FileNotFound { .. }));
    }

    #[test]
    fn test_first_sample_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("train.txt"), "#sample #class\n1 5\n2 3\n").unwrap();
        std::fs::write(temp_dir.path().join("test.txt"), "3 1\n").unwrap();
        let params = DatasetParams::new(0.0, 10.0, 1.0, 2, 2, 1).unwrap();

        let reader = DataReader::open(temp_dir.path(), "train.txt", "test.txt", &params).unwrap();
        let first = reader.training_samples().get(0).copied().unwrap();
        assert_eq!(reader.sample_path(&first), temp_dir.path().join("1.bs2"));
        assert_eq!(first.label, 5);
        assert_eq!(reader.testing_samples().len(), 1);
    }
}
