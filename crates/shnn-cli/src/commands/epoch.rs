//! Walk one epoch of sequential minibatches

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

use shnn_dataset::{DatasetParams, MinibatchAssembler, SampleIndex, SpikeFileReader};

use crate::error::{CliError, CliResult};

/// Walk one epoch of sequential minibatches
#[derive(Args, Debug)]
pub struct EpochCommand {
    /// Dataset parameter file (TOML)
    #[arg(short, long, env = "SNN_DATA_PARAMS")]
    pub params: PathBuf,

    /// Dataset root holding `<id>.bs2` files
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Sample index file, relative to the dataset root
    #[arg(short, long, default_value = "train1K.txt")]
    pub index: String,

    /// Samples per minibatch
    #[arg(short, long, default_value_t = 12)]
    pub minibatch: usize,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

impl EpochCommand {
    pub fn execute(self) -> CliResult<()> {
        if self.minibatch == 0 {
            return Err(CliError::invalid_args("--minibatch must be at least 1"));
        }

        let params = DatasetParams::from_file(&self.params)?;
        let index = SampleIndex::from_file(self.dataset.join(&self.index))?;
        let mut assembler =
            MinibatchAssembler::new(index, SpikeFileReader::new(&self.dataset), &params);

        let expected = assembler.len() / self.minibatch;
        let progress = if self.quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(expected as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} minibatches [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        };

        let mut served = 0usize;
        let mut spikes = 0f64;
        loop {
            match assembler.get_minibatch(self.minibatch) {
                Ok(batch) => {
                    served += 1;
                    spikes += f64::from(batch.sum());
                    progress.inc(1);
                }
                Err(err) if err.is_exhausted() => break,
                Err(err) => {
                    progress.abandon();
                    return Err(err.into());
                }
            }
        }
        progress.finish_and_clear();

        if assembler.remaining() > 0 {
            warn!(
                "{} samples left over (fewer than one minibatch of {})",
                assembler.remaining(),
                self.minibatch
            );
        }
        info!(
            "Epoch complete: {} minibatches of {} ({} x {} each), {} occupied cells",
            served,
            self.minibatch,
            params.input_size(),
            self.minibatch * params.num_time_bins(),
            spikes
        );
        println!("{} {}", served, assembler.remaining());
        Ok(())
    }
}
