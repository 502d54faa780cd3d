//! Reconstruct command implementation

use super::{build_reconstructor, parse_timestamp};
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// Instrument identifier (e.g. btc_usdt)
    #[arg(short, long)]
    pub instrument: String,

    /// Target time: epoch milliseconds or RFC 3339
    #[arg(short, long)]
    pub at: String,

    /// Keep at most this many levels per side in the output
    #[arg(long)]
    pub depth: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ReconstructArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let timestamp = parse_timestamp(&self.at)?;
        let reconstructor = build_reconstructor(config)?;

        let mut book = reconstructor
            .reconstruct(&self.instrument, timestamp)
            .await?;

        if let Some(depth) = self.depth {
            book.truncate(depth);
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(&book)?
        } else {
            serde_json::to_string(&book)?
        };
        println!("{json}");

        Ok(())
    }
}
