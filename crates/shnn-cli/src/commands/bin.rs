//! Bin a single spike file

use clap::Args;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use shnn_dataset::{DatasetParams, TemporalBinner};

use crate::error::CliResult;

/// Bin a spike file and write the occupancy tensor as CSV
#[derive(Args, Debug)]
pub struct BinCommand {
    /// Spike file (`<id>.bs2`)
    pub file: PathBuf,

    /// Dataset parameter file (TOML)
    #[arg(short, long, env = "SNN_DATA_PARAMS")]
    pub params: PathBuf,

    /// Write CSV here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl BinCommand {
    pub fn execute(self) -> CliResult<()> {
        let params = DatasetParams::from_file(&self.params)?;
        let binner = TemporalBinner::new(&params);

        let events = shnn_events::read_spike_file(&self.file)?;
        let mut tensor = Array2::zeros(binner.shape());
        let stats = binner.bin_into(&events, tensor.view_mut())?;
        info!(
            "Binned {} events into {}x{}: {} placed, {} dropped, {} collisions",
            events.len(),
            tensor.nrows(),
            tensor.ncols(),
            stats.placed,
            stats.dropped(),
            stats.collisions
        );

        match &self.out {
            Some(path) => {
                let mut out = BufWriter::new(File::create(path)?);
                write_csv(&mut out, &tensor)?;
                out.flush()?;
                info!("Wrote {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                write_csv(&mut stdout.lock(), &tensor)?;
            }
        }
        Ok(())
    }
}

fn write_csv<W: Write>(out: &mut W, tensor: &Array2<f32>) -> std::io::Result<()> {
    for row in tensor.rows() {
        let mut first = true;
        for value in row {
            if !first {
                out.write_all(b",")?;
            }
            write!(out, "{}", value)?;
            first = false;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}
