//! Historical market-data providers
//!
//! Read-only sources of order book snapshots and diffs

mod amberdata;

pub use amberdata::{AmberdataClient, AmberdataConfig, AMBERDATA_API_URL, API_KEY_HEADER};

use crate::error::Result;
use crate::orderbook::{OrderbookSnapshot, OrderbookUpdate};
use async_trait::async_trait;

/// Half-open time range `[start_ms, end_ms)` in milliseconds since epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Whether `timestamp` falls inside the window
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start_ms && timestamp < self.end_ms
    }

    /// Window length in milliseconds (zero when inverted)
    pub fn len_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }
}

/// Trait for order book history providers
///
/// Implementations return entries in whatever order the upstream hands
/// them back; callers sort before relying on ordering.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch full snapshots for `instrument` inside `window`
    async fn snapshots(
        &self,
        instrument: &str,
        window: TimeWindow,
    ) -> Result<Vec<OrderbookSnapshot>>;

    /// Fetch incremental diffs for `instrument` inside `window`
    async fn updates(&self, instrument: &str, window: TimeWindow)
        -> Result<Vec<OrderbookUpdate>>;
}
