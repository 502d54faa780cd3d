//! Snapshot and diff types consumed by reconstruction

use super::PriceLevel;
use serde::{Deserialize, Serialize};

/// Full order book state at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    /// Milliseconds since epoch
    pub timestamp: i64,
    /// Bid levels, descending by price
    pub bids: Vec<PriceLevel>,
    /// Ask levels, ascending by price
    pub asks: Vec<PriceLevel>,
}

/// Incremental change to a set of price levels
///
/// A level with zero quantity removes that price from the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookUpdate {
    /// Exchange time in milliseconds since epoch
    pub timestamp: i64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderbookUpdate {
    /// Number of price levels touched by this diff
    pub fn levels_touched(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}
