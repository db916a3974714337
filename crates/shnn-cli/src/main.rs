//! # snn-data - event dataset tools
//!
//! Decode spike recordings, bin them onto the training time grid, walk
//! minibatch epochs and validate target spike tables.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shnn_cli::DataCli;

fn main() {
    // Parse CLI arguments
    let cli = DataCli::parse();

    // Initialize logging with environment variable support
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute the command
    if let Err(err) = cli.execute() {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
}
