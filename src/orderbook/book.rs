//! Materialized order book

use super::PriceLevel;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// L2 aggregated order book for an instrument at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Instrument identifier (e.g. `btc_usdt`)
    pub instrument: String,
    /// Milliseconds since epoch of the most recent event folded into the book
    pub timestamp: i64,
    /// Bid levels, sorted best (highest) to worst
    pub bids: Vec<PriceLevel>,
    /// Ask levels, sorted best (lowest) to worst
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(instrument: impl Into<String>, timestamp: i64) -> Self {
        Self {
            instrument: instrument.into(),
            timestamp,
            bids: vec![],
            asks: vec![],
        }
    }

    /// Book timestamp as a UTC datetime
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Get spread
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Spread in basis points of the mid price
    pub fn spread_bps(&self) -> Option<Decimal> {
        let mid = self.mid_price()?;
        if mid.is_zero() {
            return None;
        }
        Some(self.spread()? / mid * Decimal::from(10_000))
    }

    /// Total quantity resting on the bid side
    pub fn bid_depth(&self) -> Decimal {
        self.bids.iter().map(|l| l.quantity).sum()
    }

    /// Total quantity resting on the ask side
    pub fn ask_depth(&self) -> Decimal {
        self.asks.iter().map(|l| l.quantity).sum()
    }

    /// Keep at most `levels` entries per side
    pub fn truncate(&mut self, levels: usize) {
        self.bids.truncate(levels);
        self.asks.truncate(levels);
    }
}
