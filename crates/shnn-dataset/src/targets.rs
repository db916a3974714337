//! Pre-generated target spike trains
//!
//! Target files are text tables, one row per class, laid out as the
//! concatenation of per-sample segments in minibatch order. Cells are
//! non-negative integer spike counts separated by commas or whitespace.

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::{
    binning::SpikeTensor,
    error::{DatasetError, Result},
    params::DatasetParams,
};

/// Loads `(num_classes x time)` target tensors from a directory
#[derive(Debug, Clone)]
pub struct OutputSpikeLoader {
    dir: PathBuf,
    num_classes: usize,
    num_time_bins: usize,
}

impl OutputSpikeLoader {
    /// Create a loader for files under `dir`
    pub fn new<P: AsRef<Path>>(dir: P, params: &DatasetParams) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            num_classes: params.num_classes() as usize,
            num_time_bins: params.num_time_bins(),
        }
    }

    /// Directory target files are resolved against
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load `name`; the column count must be a whole number of samples
    pub fn load(&self, name: &str) -> Result<SpikeTensor> {
        let path = self.dir.join(name);
        let text = std::fs::read_to_string(&path).map_err(|e| DatasetError::from_io(&path, e))?;
        let tensor = self.parse(&text, &path)?;
        log::debug!(
            "Loaded {}x{} target tensor from {}",
            tensor.nrows(),
            tensor.ncols(),
            path.display()
        );
        Ok(tensor)
    }

    /// Load `name` and require exactly `minibatch_size` samples of columns
    pub fn load_for_minibatch(&self, name: &str, minibatch_size: usize) -> Result<SpikeTensor> {
        let tensor = self.load(name)?;
        let expected = minibatch_size * self.num_time_bins;
        if tensor.ncols() != expected {
            return Err(DatasetError::format(
                self.dir.join(name),
                format!(
                    "{} columns, expected {} ({} samples x {} bins)",
                    tensor.ncols(),
                    expected,
                    minibatch_size,
                    self.num_time_bins
                ),
            ));
        }
        Ok(tensor)
    }

    /// Parse target table text; `origin` is used for error messages
    pub fn parse(&self, text: &str, origin: &Path) -> Result<SpikeTensor> {
        let mut cells: Vec<f32> = Vec::new();
        let mut rows = 0usize;
        let mut cols: Option<usize> = None;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let before = cells.len();
            for field in line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
            {
                let count: u32 = field.parse().map_err(|_| {
                    DatasetError::format(
                        origin,
                        format!(
                            "line {}: cell {:?} is not a non-negative integer",
                            line_no + 1,
                            field
                        ),
                    )
                })?;
                cells.push(count as f32);
            }

            let width = cells.len() - before;
            match cols {
                None => cols = Some(width),
                Some(expected) if expected != width => {
                    return Err(DatasetError::format(
                        origin,
                        format!("line {}: {} columns, expected {}", line_no + 1, width, expected),
                    ))
                }
                Some(_) => {}
            }
            rows += 1;
        }

        if rows != self.num_classes {
            return Err(DatasetError::format(
                origin,
                format!("{} rows, expected {} classes", rows, self.num_classes),
            ));
        }
        let cols = cols.unwrap_or(0);
        if cols == 0 || cols % self.num_time_bins != 0 {
            return Err(DatasetError::format(
                origin,
                format!(
                    "{} columns is not a whole number of {}-bin samples",
                    cols, self.num_time_bins
                ),
            ));
        }

        Array2::from_shape_vec((rows, cols), cells)
            .map_err(|e| DatasetError::format(origin, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(dir: &Path) -> OutputSpikeLoader {
        // 3 classes, 4 bins per sample
        let params = DatasetParams::new(0.0, 40.0, 10.0, 2, 2, 1)
            .unwrap()
            .with_num_classes(3)
            .unwrap();
        OutputSpikeLoader::new(dir, &params)
    }

    #[test]
    fn test_load_two_sample_targets() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("targets.csv"),
            "1,0,0,1,0,0,0,0\n0,0,0,0,1,1,0,0\n0,0,0,0,0,0,0,0\n",
        )
        .unwrap();

        let loader = loader(temp_dir.path());
        let tensor = loader.load_for_minibatch("targets.csv", 2).unwrap();
        assert_eq!(tensor.dim(), (3, 8));
        assert_eq!(tensor[[0, 3]], 1.0);
        assert_eq!(tensor[[1, 5]], 1.0);
        assert_eq!(tensor.sum(), 4.0);
    }

    #[test]
    fn test_whitespace_separated() {
        let loader = loader(Path::new("."));
        let tensor = loader
            .parse("1 0 0 0\n0 1 0 0\n\n0 0 1 0\n", Path::new("t.txt"))
            .unwrap();
        assert_eq!(tensor.dim(), (3, 4));
        assert_eq!(tensor[[2, 2]], 1.0);
    }

    #[test]
    fn test_shape_mismatches() {
        let loader = loader(Path::new("."));
        let origin = Path::new("t.csv");

        // Wrong row count
        assert!(loader.parse("1,0,0,0\n0,1,0,0\n", origin).is_err());
        // Ragged rows
        assert!(loader.parse("1,0,0,0\n0,1,0\n0,0,1,0\n", origin).is_err());
        // Not a whole number of samples
        assert!(loader.parse("1,0,0\n0,1,0\n0,0,1\n", origin).is_err());
        // Non-numeric cell
        assert!(loader.parse("1,0,x,0\n0,1,0,0\n0,0,1,0\n", origin).is_err());
        // Empty
        assert!(loader.parse("", origin).is_err());
    }

    #[test]
    fn test_cells_must_be_counts() {
        let loader = loader(Path::new("."));
        let origin = Path::new("t.csv");
        for bad in ["nan", "inf", "0.5", "-1", "1e0"] {
            let text = format!("1,0,{},0\n0,1,0,0\n0,0,1,0\n", bad);
            let err = loader.parse(&text, origin).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::FormatError, "cell {:?}", bad);
        }

        let tensor = loader.parse("2,0,0,0\n0,1,0,0\n0,0,3,0\n", origin).unwrap();
        assert_eq!(tensor[[2, 2]], 3.0);
    }

    #[test]
    fn test_minibatch_width_checked() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("t.csv"), "1,0,0,0\n0,1,0,0\n0,0,1,0\n").unwrap();
        let loader = loader(temp_dir.path());
        assert!(loader.load_for_minibatch("t.csv", 1).is_ok());
        let err = loader.load_for_minibatch("t.csv", 2).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::FormatError);
    }

    #[test]
    fn test_missing_target_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = loader(temp_dir.path()).load("absent.csv").unwrap_err();
        assert!(matches!(err, DatasetError::FileNotFound { .. }));
    }
}
