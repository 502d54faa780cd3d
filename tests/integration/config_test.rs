//! Integration tests for configuration loading

use orderbook_replay::config::Config;
use orderbook_replay::orderbook::ReconstructionParams;
use orderbook_replay::telemetry::LogFormat;
use std::io::Write;

#[test]
fn test_load_example_config() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.provider.exchange, "binance");
    assert_eq!(config.reconstruction.lookback_ms, 60_000);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert_eq!(
        ReconstructionParams::from(&config.reconstruction),
        ReconstructionParams::default()
    );
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [provider]
        exchange = "kraken"

        [reconstruction]
        lookback_ms = 30000
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.provider.exchange, "kraken");
    assert_eq!(config.reconstruction.lookback_ms, 30_000);
    assert_eq!(config.reconstruction.end_offset_ms, 1);
}

#[test]
fn test_load_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[reconstruction\nlookback_ms = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}
