//! CLI command implementations for the dataset tools

use clap::{Parser, Subcommand};
use crate::error::CliResult;

pub mod bin;
pub mod decode;
pub mod epoch;
pub mod targets;

/// snn-data - inspect and batch event-based SNN datasets
#[derive(Parser, Debug)]
#[command(
    name = "snn-data",
    version,
    about = "Inspect and batch event-based SNN datasets",
    long_about = "snn-data decodes per-sample address-event spike files, bins them onto \
                  the configured time grid, walks sequential minibatch epochs and checks \
                  target spike tables against the dataset parameters."
)]
pub struct DataCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a spike file and print its events
    Decode(decode::DecodeCommand),

    /// Bin a spike file and write the occupancy tensor as CSV
    Bin(bin::BinCommand),

    /// Walk one epoch of sequential minibatches
    Epoch(epoch::EpochCommand),

    /// Validate a target spike table
    Targets(targets::TargetsCommand),
}

impl DataCli {
    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        match self.command {
            Commands::Decode(cmd) => cmd.execute(),
            Commands::Bin(cmd) => cmd.execute(),
            Commands::Epoch(cmd) => cmd.execute(),
            Commands::Targets(cmd) => cmd.execute(),
        }
    }
}
