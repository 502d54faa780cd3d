//! Amberdata spot market-data client
//!
//! Fetches historical order book snapshots and order book events. Both
//! endpoints share the same envelope (`payload.data`) and cursor-style
//! pagination through `payload.metadata.next`.

use super::{MarketDataSource, TimeWindow};
use crate::error::{ReplayError, Result};
use crate::orderbook::{OrderbookSnapshot, OrderbookUpdate, PriceLevel};
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Amberdata spot markets base URL
pub const AMBERDATA_API_URL: &str = "https://api.amberdata.com/markets/spot";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

const SNAPSHOTS_PATH: &str = "order-book-snapshots-historical";
const EVENTS_PATH: &str = "order-book-events";

/// Configuration for the Amberdata client
#[derive(Debug, Clone)]
pub struct AmberdataConfig {
    /// Base URL for the spot API
    pub base_url: String,
    /// API key; required
    pub api_key: Option<String>,
    /// Exchange identifier passed as the `exchange` query parameter
    pub exchange: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum pages followed per fetch
    pub max_pages: usize,
}

impl Default for AmberdataConfig {
    fn default() -> Self {
        Self {
            base_url: AMBERDATA_API_URL.to_string(),
            api_key: None,
            exchange: "binance".to_string(),
            timeout: Duration::from_secs(10),
            max_pages: 20,
        }
    }
}

/// Client for Amberdata's historical order book endpoints
pub struct AmberdataClient {
    config: AmberdataConfig,
    api_key: String,
    client: Client,
}

impl AmberdataClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: AmberdataConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ReplayError::MissingApiKey)?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Create a client with default settings and the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(AmberdataConfig {
            api_key: Some(api_key.into()),
            ..AmberdataConfig::default()
        })
    }

    fn endpoint(&self, path: &str, instrument: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path,
            instrument
        )
    }

    fn window_query(&self, window: TimeWindow) -> Vec<(&'static str, String)> {
        vec![
            ("exchange", self.config.exchange.clone()),
            ("timeFormat", "milliseconds".to_string()),
            ("startDate", window.start_ms.to_string()),
            ("endDate", window.end_ms.to_string()),
        ]
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
    }

    /// GET `url` with `query`, then follow `next` links up to `max_pages`
    ///
    /// `next` links are requested verbatim; they already carry the cursor
    /// and the original filters. A cursor still present after the last
    /// allowed page fails the whole fetch rather than returning a prefix.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<T>> {
        let mut request = self.authorized(self.client.get(url).query(query));
        let mut data = Vec::new();
        let mut pages = 0usize;

        loop {
            let response = request.send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ReplayError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            let page: Envelope<T> = serde_json::from_str(&body)?;
            pages += 1;
            telemetry::increment(CounterMetric::PagesFetched);

            data.extend(page.payload.data);

            let next = page
                .payload
                .metadata
                .and_then(|m| m.next)
                .filter(|n| !n.is_empty());

            match next {
                Some(next) if pages < self.config.max_pages.max(1) => {
                    tracing::debug!(page = pages, next = %next, "Following pagination cursor");
                    request = self.authorized(self.client.get(&next));
                }
                Some(_) => {
                    tracing::warn!(url = %url, pages, "Pagination limit reached");
                    return Err(ReplayError::PaginationLimit {
                        url: url.to_string(),
                        pages,
                    });
                }
                None => break,
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl MarketDataSource for AmberdataClient {
    async fn snapshots(
        &self,
        instrument: &str,
        window: TimeWindow,
    ) -> Result<Vec<OrderbookSnapshot>> {
        let url = self.endpoint(SNAPSHOTS_PATH, instrument);
        tracing::debug!(
            url = %url,
            start = window.start_ms,
            end = window.end_ms,
            span_ms = window.len_ms(),
            "Fetching order book snapshots"
        );

        let started = Instant::now();
        let records: Vec<SnapshotRecord> = self.fetch_all(&url, &self.window_query(window)).await?;
        telemetry::record_latency(LatencyMetric::SnapshotFetch, started.elapsed());

        Ok(records.into_iter().map(SnapshotRecord::into_snapshot).collect())
    }

    async fn updates(
        &self,
        instrument: &str,
        window: TimeWindow,
    ) -> Result<Vec<OrderbookUpdate>> {
        let url = self.endpoint(EVENTS_PATH, instrument);
        tracing::debug!(
            url = %url,
            start = window.start_ms,
            end = window.end_ms,
            span_ms = window.len_ms(),
            "Fetching order book events"
        );

        let started = Instant::now();
        let records: Vec<EventRecord> = self.fetch_all(&url, &self.window_query(window)).await?;
        telemetry::record_latency(LatencyMetric::UpdateFetch, started.elapsed());

        Ok(records.into_iter().map(EventRecord::into_update).collect())
    }
}

/// Response envelope shared by both endpoints
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: Payload<T>,
}

#[derive(Debug, Deserialize)]
struct Payload<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    next: Option<String>,
}

/// Snapshot entry
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    timestamp: i64,
    #[serde(default)]
    bid: Vec<LevelRecord>,
    #[serde(default)]
    ask: Vec<LevelRecord>,
}

/// Order book event entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    exchange_timestamp: i64,
    #[serde(default)]
    bid: Vec<LevelRecord>,
    #[serde(default)]
    ask: Vec<LevelRecord>,
}

/// Price level; numbers or numeric strings are both accepted
#[derive(Debug, Deserialize)]
struct LevelRecord {
    price: Decimal,
    volume: Decimal,
}

fn to_levels(records: Vec<LevelRecord>) -> Vec<PriceLevel> {
    records
        .into_iter()
        .map(|r| PriceLevel {
            price: r.price,
            quantity: r.volume,
        })
        .collect()
}

impl SnapshotRecord {
    fn into_snapshot(self) -> OrderbookSnapshot {
        OrderbookSnapshot {
            timestamp: self.timestamp,
            bids: to_levels(self.bid),
            asks: to_levels(self.ask),
        }
    }
}

impl EventRecord {
    fn into_update(self) -> OrderbookUpdate {
        OrderbookUpdate {
            timestamp: self.exchange_timestamp,
            bids: to_levels(self.bid),
            asks: to_levels(self.ask),
        }
    }
}
