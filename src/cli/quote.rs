//! Quote command implementation

use super::{build_reconstructor, parse_timestamp};
use crate::config::Config;
use crate::orderbook::{estimate_fill, FillEstimate, OrderBook, Savings, Side};
use chrono::SecondsFormat;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Instrument identifier (e.g. btc_usdt)
    #[arg(short, long)]
    pub instrument: String,

    /// Target time: epoch milliseconds or RFC 3339
    #[arg(short, long)]
    pub at: String,

    /// Taker side: buy or sell
    #[arg(short, long)]
    pub side: Side,

    /// Base-asset quantity to fill
    #[arg(short, long)]
    pub quantity: Decimal,
}

/// JSON emitted by the quote command
#[derive(Debug, Serialize)]
struct QuoteReport {
    instrument: String,
    book_timestamp: i64,
    /// RFC 3339 rendering of `book_timestamp`
    book_time: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    mid_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    spread_bps: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    bid_depth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    ask_depth: Decimal,
    /// Average fill price against the midpoint
    #[serde(with = "rust_decimal::serde::float_option")]
    slippage_bps: Option<Decimal>,
    fill: FillEstimate,
    savings: Option<Savings>,
}

impl QuoteReport {
    fn new(book: &OrderBook, side: Side, quantity: Decimal) -> Self {
        let mid_price = book.mid_price();
        let fill = estimate_fill(book, side, quantity);
        let slippage_bps = mid_price.and_then(|mid| fill.slippage_bps(mid));
        let savings = mid_price.and_then(|mid| fill.savings_vs_midpoint(mid));

        Self {
            instrument: book.instrument.clone(),
            book_timestamp: book.timestamp,
            book_time: book
                .datetime()
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            mid_price,
            spread_bps: book.spread_bps(),
            bid_depth: book.bid_depth(),
            ask_depth: book.ask_depth(),
            slippage_bps,
            fill,
            savings,
        }
    }
}

impl QuoteArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.quantity <= Decimal::ZERO {
            anyhow::bail!("Quantity must be positive, got {}", self.quantity);
        }

        let timestamp = parse_timestamp(&self.at)?;
        let reconstructor = build_reconstructor(config)?;
        let book = reconstructor
            .reconstruct(&self.instrument, timestamp)
            .await?;

        let report = QuoteReport::new(&book, self.side, self.quantity);
        if !report.fill.fully_filled() {
            tracing::warn!(
                instrument = %self.instrument,
                unfilled = %report.fill.unfilled(),
                "Order exceeds visible liquidity"
            );
        }

        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    }
}
