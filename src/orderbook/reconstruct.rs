//! Point-in-time order book reconstruction
//!
//! A book at time `t` is the latest snapshot inside the lookback window
//! with every diff in `[snapshot.timestamp, t]` folded over it.

use super::{LevelMap, OrderBook, OrderbookSnapshot, OrderbookUpdate};
use crate::error::{ReplayError, Result};
use crate::provider::{MarketDataSource, TimeWindow};
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use std::time::Instant;

/// Window parameters for locating history around a target time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructionParams {
    /// How far before the target to search for a snapshot (ms)
    pub lookback_ms: i64,
    /// Added to the target to form the exclusive end bound (ms)
    pub end_offset_ms: i64,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            lookback_ms: 60_000,
            end_offset_ms: 1,
        }
    }
}

impl ReconstructionParams {
    /// Window searched for the snapshot
    pub fn snapshot_window(&self, timestamp: i64) -> Result<TimeWindow> {
        if timestamp < 0 {
            return Err(ReplayError::InvalidTimestamp(format!(
                "{timestamp} is before the epoch"
            )));
        }
        let start = timestamp
            .checked_sub(self.lookback_ms.max(0))
            .ok_or_else(|| overflow(timestamp))?;
        let end = self.end_bound(timestamp)?;
        Ok(TimeWindow::new(start.max(0), end))
    }

    /// Window searched for diffs once a snapshot is known
    ///
    /// Always `[snapshot_timestamp, timestamp + 1)` so a diff stamped at the
    /// target millisecond is fetched whatever `end_offset_ms` is.
    pub fn update_window(&self, snapshot_timestamp: i64, timestamp: i64) -> Result<TimeWindow> {
        let end = timestamp
            .checked_add(1)
            .ok_or_else(|| overflow(timestamp))?;
        Ok(TimeWindow::new(snapshot_timestamp, end))
    }

    fn end_bound(&self, timestamp: i64) -> Result<i64> {
        timestamp
            .checked_add(self.end_offset_ms.max(0))
            .ok_or_else(|| overflow(timestamp))
    }
}

fn overflow(timestamp: i64) -> ReplayError {
    ReplayError::InvalidTimestamp(format!("window around {timestamp} overflows"))
}

/// Fold `updates` over `snapshot` and materialize the result
///
/// Updates are applied in timestamp order (stable for ties); any that
/// predate the snapshot are skipped. The returned book carries the
/// timestamp of the last applied update, or the snapshot's own timestamp
/// when nothing was applied.
pub fn merge(
    instrument: &str,
    snapshot: &OrderbookSnapshot,
    updates: &[OrderbookUpdate],
) -> OrderBook {
    let mut ordered: Vec<&OrderbookUpdate> = updates
        .iter()
        .filter(|u| u.timestamp >= snapshot.timestamp)
        .collect();
    ordered.sort_by_key(|u| u.timestamp);

    let mut map = LevelMap::from_snapshot(snapshot);
    for update in &ordered {
        map.apply(update);
    }

    let timestamp = ordered
        .last()
        .map(|u| u.timestamp)
        .unwrap_or(snapshot.timestamp);

    map.into_book(instrument, timestamp)
}

/// Rebuilds books on demand from a [`MarketDataSource`]
pub struct Reconstructor<S> {
    source: S,
    params: ReconstructionParams,
}

impl<S: MarketDataSource> Reconstructor<S> {
    /// Create a reconstructor with the default 60s lookback and +1ms end offset
    pub fn new(source: S) -> Self {
        Self::with_params(source, ReconstructionParams::default())
    }

    pub fn with_params(source: S, params: ReconstructionParams) -> Self {
        Self { source, params }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Latest snapshot inside the lookback window ending just after `timestamp`
    pub async fn latest_snapshot(
        &self,
        instrument: &str,
        timestamp: i64,
    ) -> Result<OrderbookSnapshot> {
        let window = self.params.snapshot_window(timestamp)?;
        let snapshots = self.source.snapshots(instrument, window).await?;
        let fetched = snapshots.len();

        // max_by_key returns the last of equal maxima, matching "last entry wins"
        let latest = snapshots
            .into_iter()
            .filter(|s| window.contains(s.timestamp))
            .max_by_key(|s| s.timestamp);

        match latest {
            Some(snapshot) => {
                tracing::debug!(
                    instrument,
                    snapshot_ts = snapshot.timestamp,
                    candidates = fetched,
                    "Selected snapshot"
                );
                Ok(snapshot)
            }
            None => {
                telemetry::increment(CounterMetric::MissingSnapshot);
                tracing::warn!(
                    instrument,
                    start = window.start_ms,
                    end = window.end_ms,
                    candidates = fetched,
                    "No snapshot in lookback window"
                );
                Err(ReplayError::NoSnapshotAvailable {
                    instrument: instrument.to_string(),
                    start_ms: window.start_ms,
                    end_ms: window.end_ms,
                })
            }
        }
    }

    /// Diffs in `[snapshot_timestamp, timestamp]`, sorted by timestamp
    pub async fn updates_between(
        &self,
        instrument: &str,
        snapshot_timestamp: i64,
        timestamp: i64,
    ) -> Result<Vec<OrderbookUpdate>> {
        let window = self.params.update_window(snapshot_timestamp, timestamp)?;
        let mut updates: Vec<OrderbookUpdate> = self
            .source
            .updates(instrument, window)
            .await?
            .into_iter()
            .filter(|u| u.timestamp >= snapshot_timestamp && u.timestamp <= timestamp)
            .collect();
        updates.sort_by_key(|u| u.timestamp);
        Ok(updates)
    }

    /// Rebuild the book for `instrument` as of `timestamp` (ms since epoch)
    pub async fn reconstruct(&self, instrument: &str, timestamp: i64) -> Result<OrderBook> {
        let started = Instant::now();

        let snapshot = self.latest_snapshot(instrument, timestamp).await?;
        let updates = self
            .updates_between(instrument, snapshot.timestamp, timestamp)
            .await?;

        let book = merge(instrument, &snapshot, &updates);

        let touched: usize = updates.iter().map(OrderbookUpdate::levels_touched).sum();
        telemetry::record_count(CounterMetric::UpdatesApplied, updates.len() as u64);
        telemetry::increment(CounterMetric::BooksReconstructed);
        telemetry::record_latency(LatencyMetric::Reconstruction, started.elapsed());

        tracing::info!(
            instrument,
            requested_ts = timestamp,
            snapshot_ts = snapshot.timestamp,
            book_ts = book.timestamp,
            updates = updates.len(),
            levels_touched = touched,
            bids = book.bids.len(),
            asks = book.asks.len(),
            "Reconstructed order book"
        );

        Ok(book)
    }
}
