//! Integration tests for order book reconstruction

use async_trait::async_trait;
use orderbook_replay::orderbook::{
    estimate_fill, merge, OrderbookSnapshot, OrderbookUpdate, PriceLevel, ReconstructionParams,
    Reconstructor, Side,
};
use orderbook_replay::provider::{MarketDataSource, TimeWindow};
use orderbook_replay::{ReplayError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// In-memory history that honours the requested windows like the real API
struct HistorySource {
    snapshots: Vec<OrderbookSnapshot>,
    updates: Vec<OrderbookUpdate>,
}

#[async_trait]
impl MarketDataSource for HistorySource {
    async fn snapshots(
        &self,
        _instrument: &str,
        window: TimeWindow,
    ) -> Result<Vec<OrderbookSnapshot>> {
        Ok(self
            .snapshots
            .iter()
            .filter(|s| window.contains(s.timestamp))
            .cloned()
            .collect())
    }

    async fn updates(
        &self,
        _instrument: &str,
        window: TimeWindow,
    ) -> Result<Vec<OrderbookUpdate>> {
        Ok(self
            .updates
            .iter()
            .filter(|u| window.contains(u.timestamp))
            .cloned()
            .collect())
    }
}

/// Source whose upstream is always down
struct FailingSource;

#[async_trait]
impl MarketDataSource for FailingSource {
    async fn snapshots(&self, _: &str, _: TimeWindow) -> Result<Vec<OrderbookSnapshot>> {
        Err(ReplayError::Upstream {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }

    async fn updates(&self, _: &str, _: TimeWindow) -> Result<Vec<OrderbookUpdate>> {
        Ok(vec![])
    }
}

fn level(price: Decimal, quantity: Decimal) -> PriceLevel {
    PriceLevel { price, quantity }
}

fn history() -> HistorySource {
    HistorySource {
        snapshots: vec![
            OrderbookSnapshot {
                timestamp: 1_000,
                bids: vec![level(dec!(100), dec!(5))],
                asks: vec![level(dec!(101), dec!(5))],
            },
            OrderbookSnapshot {
                timestamp: 70_000,
                bids: vec![level(dec!(110), dec!(1)), level(dec!(109), dec!(2))],
                asks: vec![level(dec!(111), dec!(1)), level(dec!(112), dec!(4))],
            },
        ],
        updates: vec![
            OrderbookUpdate {
                timestamp: 1_005,
                bids: vec![level(dec!(100), dec!(0)), level(dec!(99), dec!(3))],
                asks: vec![],
            },
            OrderbookUpdate {
                timestamp: 70_010,
                bids: vec![level(dec!(110), dec!(0))],
                asks: vec![level(dec!(111), dec!(3))],
            },
            OrderbookUpdate {
                timestamp: 70_020,
                bids: vec![level(dec!(110), dec!(6))],
                asks: vec![],
            },
        ],
    }
}

fn assert_sorted(book: &orderbook_replay::orderbook::OrderBook) {
    assert!(book.bids.windows(2).all(|w| w[0].price > w[1].price));
    assert!(book.asks.windows(2).all(|w| w[0].price < w[1].price));
    assert!(book
        .bids
        .iter()
        .chain(book.asks.iter())
        .all(|l| l.quantity > Decimal::ZERO));
}

#[tokio::test]
async fn test_reconstruct_documented_example() {
    let reconstructor = Reconstructor::new(history());
    let book = reconstructor.reconstruct("btc_usdt", 1_005).await.unwrap();

    assert_eq!(book.timestamp, 1_005);
    assert_eq!(book.bids, vec![level(dec!(99), dec!(3))]);
    assert_eq!(book.asks, vec![level(dec!(101), dec!(5))]);
}

#[tokio::test]
async fn test_reconstruct_before_first_update_returns_snapshot() {
    let reconstructor = Reconstructor::new(history());
    let book = reconstructor.reconstruct("btc_usdt", 1_004).await.unwrap();

    assert_eq!(book.timestamp, 1_000);
    assert_eq!(book.bids, vec![level(dec!(100), dec!(5))]);
}

#[tokio::test]
async fn test_reconstruct_target_lagging_last_update() {
    let reconstructor = Reconstructor::new(history());
    let book = reconstructor.reconstruct("btc_usdt", 70_015).await.unwrap();

    // last applied diff is at 70_010, not the requested 70_015
    assert_eq!(book.timestamp, 70_010);
    assert_eq!(book.best_bid(), Some(dec!(109)));
    assert_eq!(book.asks[0], level(dec!(111), dec!(3)));
    assert_sorted(&book);
}

#[tokio::test]
async fn test_reconstruct_re_added_level() {
    let reconstructor = Reconstructor::new(history());
    let book = reconstructor.reconstruct("btc_usdt", 80_000).await.unwrap();

    assert_eq!(book.timestamp, 70_020);
    assert_eq!(book.bids[0], level(dec!(110), dec!(6)));
    assert_sorted(&book);
}

#[tokio::test]
async fn test_reconstruct_outside_lookback_fails() {
    let reconstructor = Reconstructor::new(history());
    // 1_000 snapshot is more than 60s before, 70_000 is after
    let err = reconstructor.reconstruct("btc_usdt", 65_000).await.unwrap_err();
    assert!(err.is_insufficient_history());
}

#[tokio::test]
async fn test_wider_lookback_finds_older_snapshot() {
    let params = ReconstructionParams {
        lookback_ms: 120_000,
        end_offset_ms: 1,
    };
    let reconstructor = Reconstructor::with_params(history(), params);
    let book = reconstructor.reconstruct("btc_usdt", 65_000).await.unwrap();
    assert_eq!(book.timestamp, 1_005);
}

#[tokio::test]
async fn test_zero_end_offset_still_applies_update_at_target() {
    let params = ReconstructionParams {
        lookback_ms: 60_000,
        end_offset_ms: 0,
    };
    let reconstructor = Reconstructor::with_params(history(), params);
    // snapshot window is [ts - 60s, ts), so pick a target after the snapshot
    let book = reconstructor.reconstruct("btc_usdt", 1_005).await.unwrap();

    assert_eq!(book.timestamp, 1_005);
    assert_eq!(book.bids, vec![level(dec!(99), dec!(3))]);
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let reconstructor = Reconstructor::new(FailingSource);
    let err = reconstructor.reconstruct("btc_usdt", 1_000).await.unwrap_err();
    assert!(err.is_upstream());
    assert!(matches!(err, ReplayError::Upstream { status: 502, .. }));
}

#[tokio::test]
async fn test_concurrent_reconstructions_are_independent() {
    let reconstructor = Arc::new(Reconstructor::new(history()));

    let handles: Vec<_> = [1_005, 70_015, 80_000]
        .into_iter()
        .map(|ts| {
            let r = Arc::clone(&reconstructor);
            tokio::spawn(async move { r.reconstruct("btc_usdt", ts).await })
        })
        .collect();

    let mut timestamps = Vec::new();
    for handle in handles {
        timestamps.push(handle.await.unwrap().unwrap().timestamp);
    }
    assert_eq!(timestamps, vec![1_005, 70_010, 70_020]);
}

#[tokio::test]
async fn test_reconstruct_then_quote() {
    let reconstructor = Reconstructor::new(history());
    let book = reconstructor.reconstruct("btc_usdt", 80_000).await.unwrap();

    // asks: 111 x 3, 112 x 4; bids: 110 x 6, 109 x 2
    let fill = estimate_fill(&book, Side::Buy, dec!(4));
    assert_eq!(fill.notional, dec!(445));
    assert!(fill.fully_filled());

    let mid = book.mid_price().unwrap();
    assert_eq!(mid, dec!(110.5));
    let savings = fill.savings_vs_midpoint(mid).unwrap();
    assert_eq!(savings.amount, dec!(3));
}

#[test]
fn test_merge_matches_reconstruct_semantics() {
    let h = history();
    let book = merge("btc_usdt", &h.snapshots[1], &h.updates);
    // the 1_005 diff predates the snapshot and is skipped
    assert_eq!(book.timestamp, 70_020);
    assert_eq!(book.bids.len(), 2);
    assert_sorted(&book);
}
