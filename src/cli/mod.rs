//! CLI interface for orderbook-replay
//!
//! Provides subcommands for:
//! - `reconstruct`: Rebuild a point-in-time order book
//! - `quote`: Price a market order against a rebuilt book
//! - `config`: Show the effective configuration

mod quote;
mod reconstruct;

pub use quote::QuoteArgs;
pub use reconstruct::ReconstructArgs;

use crate::config::Config;
use crate::orderbook::Reconstructor;
use crate::provider::AmberdataClient;
use chrono::DateTime;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "orderbook-replay")]
#[command(about = "Point-in-time order book reconstruction from historical snapshots and diffs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the order book at a point in time
    Reconstruct(ReconstructArgs),
    /// Estimate a market order fill and savings vs midpoint
    Quote(QuoteArgs),
    /// Show configuration
    Config,
}

/// Parse a target time given as epoch milliseconds or RFC 3339
pub fn parse_timestamp(input: &str) -> anyhow::Result<i64> {
    let trimmed = input.trim();
    if let Ok(millis) = trimmed.parse::<i64>() {
        return Ok(millis);
    }
    let parsed = DateTime::parse_from_rfc3339(trimmed).map_err(|e| {
        anyhow::anyhow!(
            "Invalid timestamp '{}': expected epoch ms or RFC 3339 ({})",
            input,
            e
        )
    })?;
    Ok(parsed.timestamp_millis())
}

/// Build a reconstructor backed by the configured provider
pub fn build_reconstructor(config: &Config) -> anyhow::Result<Reconstructor<AmberdataClient>> {
    let client = AmberdataClient::with_config(config.provider.to_client_config())?;
    Ok(Reconstructor::with_params(
        client,
        (&config.reconstruction).into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_millis() {
        assert_eq!(parse_timestamp("1700000000000").unwrap(), 1_700_000_000_000);
        assert_eq!(parse_timestamp(" 42 ").unwrap(), 42);
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        assert_eq!(
            parse_timestamp("2024-01-01T00:00:00Z").unwrap(),
            1_704_067_200_000
        );
        assert_eq!(
            parse_timestamp("2024-01-01T01:00:00.250+01:00").unwrap(),
            1_704_067_200_250
        );
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_cli_parses_reconstruct() {
        let cli = Cli::try_parse_from([
            "orderbook-replay",
            "reconstruct",
            "--instrument",
            "btc_usdt",
            "--at",
            "1700000000000",
            "--depth",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.config, "config.toml");
        match cli.command {
            Commands::Reconstruct(args) => {
                assert_eq!(args.instrument, "btc_usdt");
                assert_eq!(args.depth, Some(5));
                assert!(!args.pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_build_reconstructor_requires_key() {
        let config = Config::default();
        assert!(build_reconstructor(&config).is_err());
    }
}
