//! Error types for order book reconstruction

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Errors raised while fetching history or rebuilding a book
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The market-data provider answered with a non-2xx status
    #[error("Upstream error: {status} - {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The HTTP request itself failed (connect, timeout, body read)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Provider still had more pages after `max_pages` were fetched
    #[error("Pagination limit reached for {url} after {pages} pages")]
    PaginationLimit { url: String, pages: usize },

    /// No snapshot exists inside the lookback window
    #[error("No snapshot available for {instrument} in [{start_ms}, {end_ms})")]
    NoSnapshotAvailable {
        instrument: String,
        start_ms: i64,
        end_ms: i64,
    },

    /// Target timestamp is negative or the derived window overflows
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Provider client was built without an API key
    #[error("Missing market-data API key (set provider.api_key or AMBERDATA_API_KEY)")]
    MissingApiKey,
}

impl ReplayError {
    /// True when the failure came from the upstream provider or the network
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ReplayError::Upstream { .. }
                | ReplayError::Request(_)
                | ReplayError::Decode(_)
                | ReplayError::PaginationLimit { .. }
        )
    }

    /// True when there was not enough history to rebuild the book
    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, ReplayError::NoSnapshotAvailable { .. })
    }
}
