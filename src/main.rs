use clap::Parser;
use orderbook_replay::cli::{Cli, Commands};
use orderbook_replay::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::from_env()
    });

    // Initialize telemetry
    orderbook_replay::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Reconstruct(args) => {
            tracing::debug!(instrument = %args.instrument, at = %args.at, "Reconstructing order book");
            args.execute(&config).await?;
        }
        Commands::Quote(args) => {
            tracing::debug!(instrument = %args.instrument, at = %args.at, "Quoting order");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}
