//! Reconstruction metrics
//!
//! Emitted through the `metrics` facade; without an installed recorder
//! these calls are no-ops.

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Snapshot fetch from the provider
    SnapshotFetch,
    /// Update fetch from the provider
    UpdateFetch,
    /// Full reconstruction, fetches included
    Reconstruction,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Successful reconstructions
    BooksReconstructed,
    /// Requests that found no snapshot in the lookback window
    MissingSnapshot,
    /// Diffs folded into a snapshot
    UpdatesApplied,
    /// Provider pages fetched
    PagesFetched,
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::SnapshotFetch => "obreplay_snapshot_fetch_latency_ms",
            LatencyMetric::UpdateFetch => "obreplay_update_fetch_latency_ms",
            LatencyMetric::Reconstruction => "obreplay_reconstruction_latency_ms",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::BooksReconstructed => "obreplay_books_reconstructed_total",
            CounterMetric::MissingSnapshot => "obreplay_missing_snapshot_total",
            CounterMetric::UpdatesApplied => "obreplay_updates_applied_total",
            CounterMetric::PagesFetched => "obreplay_provider_pages_total",
        }
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let name = metric.name();
    metrics::histogram!(name).record(duration.as_secs_f64() * 1000.0);
    tracing::trace!(
        metric = name,
        value_ms = duration.as_millis(),
        "Recording latency"
    );
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    record_count(metric, 1);
}

/// Increment a counter by `value`
pub fn record_count(metric: CounterMetric, value: u64) {
    metrics::counter!(metric.name()).increment(value);
}
