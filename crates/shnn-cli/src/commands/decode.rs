//! Decode a spike file

use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::error::CliResult;

/// Output format for decoded events
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventFormat {
    /// `x,y,channel,timestamp` lines with a header
    Text,
    /// JSON array of event objects
    Json,
}

/// Decode a spike file and print its events
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Spike file (`<id>.bs2`)
    pub file: PathBuf,

    /// Print at most this many events
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = EventFormat::Text)]
    pub format: EventFormat,
}

impl DecodeCommand {
    pub fn execute(self) -> CliResult<()> {
        let events = shnn_events::read_spike_file(&self.file)?;
        info!("{}: {} events", self.file.display(), events.len());

        let shown = &events[..self.limit.unwrap_or(events.len()).min(events.len())];
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match self.format {
            EventFormat::Text => {
                writeln!(out, "x,y,channel,timestamp")?;
                for e in shown {
                    writeln!(out, "{},{},{},{}", e.x, e.y, e.channel, e.timestamp)?;
                }
            }
            EventFormat::Json => {
                serde_json::to_writer_pretty(&mut out, shown)?;
                writeln!(out)?;
            }
        }

        if let (Some(first), Some(last)) = (events.first(), events.last()) {
            info!("Timestamps span {}..={} us", first.timestamp, last.timestamp);
        }
        Ok(())
    }
}
