//! Target spike table validation

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use shnn_dataset::{DatasetParams, OutputSpikeLoader};

use crate::error::{CliError, CliResult};

/// Validate a target spike table
#[derive(Args, Debug)]
pub struct TargetsCommand {
    /// Target table (CSV)
    pub file: PathBuf,

    /// Dataset parameter file (TOML)
    #[arg(short, long, env = "SNN_DATA_PARAMS")]
    pub params: PathBuf,

    /// Require exactly this many samples of columns
    #[arg(short, long)]
    pub minibatch: Option<usize>,
}

impl TargetsCommand {
    pub fn execute(self) -> CliResult<()> {
        let params = DatasetParams::from_file(&self.params)?;

        let name = self
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CliError::invalid_args(format!("not a file: {}", self.file.display())))?;
        let dir = self.file.parent().map(PathBuf::from).unwrap_or_default();
        let loader = OutputSpikeLoader::new(&dir, &params);

        let tensor = match self.minibatch {
            Some(size) => loader.load_for_minibatch(name, size)?,
            None => loader.load(name)?,
        };

        let samples = tensor.ncols() / params.num_time_bins();
        info!(
            "{}: {} classes x {} bins ({} samples)",
            self.file.display(),
            tensor.nrows(),
            tensor.ncols(),
            samples
        );
        for (class, row) in tensor.rows().into_iter().enumerate() {
            println!("{} {}", class, row.sum());
        }
        Ok(())
    }
}
