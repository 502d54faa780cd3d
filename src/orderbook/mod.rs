//! Order book module
//!
//! Point-in-time L2 books rebuilt from a snapshot plus incremental diffs

mod book;
mod fill;
mod map;
mod reconstruct;
mod types;

pub use book::OrderBook;
pub use fill::{estimate_fill, FillEstimate, Savings};
pub use map::LevelMap;
pub use reconstruct::{merge, ReconstructionParams, Reconstructor};
pub use types::{OrderbookSnapshot, OrderbookUpdate};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Quote-currency price per unit of base asset
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Volume resting at this price
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Order side, from the taker's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Lifts asks
    Buy,
    /// Hits bids
    Sell,
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(Side::Buy),
            "sell" | "ask" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}
