//! Price-keyed working state used while folding diffs into a snapshot

use super::{OrderBook, OrderbookSnapshot, OrderbookUpdate, PriceLevel};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Per-side price -> quantity maps
///
/// Zero quantities are kept as tombstones until [`LevelMap::into_book`] so
/// that a later diff can re-add the price.
#[derive(Debug, Clone, Default)]
pub struct LevelMap {
    bids: BTreeMap<Decimal, Decimal>,
    asks: BTreeMap<Decimal, Decimal>,
}

impl LevelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the map from a full snapshot
    pub fn from_snapshot(snapshot: &OrderbookSnapshot) -> Self {
        let mut map = Self::new();
        overwrite(&mut map.bids, &snapshot.bids);
        overwrite(&mut map.asks, &snapshot.asks);
        map
    }

    /// Overwrite every level touched by `update` (last write wins)
    pub fn apply(&mut self, update: &OrderbookUpdate) {
        overwrite(&mut self.bids, &update.bids);
        overwrite(&mut self.asks, &update.asks);
    }

    /// Materialize into sorted, strictly positive levels
    pub fn into_book(self, instrument: impl Into<String>, timestamp: i64) -> OrderBook {
        let bids = self
            .bids
            .into_iter()
            .rev()
            .filter(|(_, quantity)| *quantity > Decimal::ZERO)
            .map(|(price, quantity)| PriceLevel { price, quantity })
            .collect();

        let asks = self
            .asks
            .into_iter()
            .filter(|(_, quantity)| *quantity > Decimal::ZERO)
            .map(|(price, quantity)| PriceLevel { price, quantity })
            .collect();

        OrderBook {
            instrument: instrument.into(),
            timestamp,
            bids,
            asks,
        }
    }
}

fn overwrite(side: &mut BTreeMap<Decimal, Decimal>, levels: &[PriceLevel]) {
    for level in levels {
        // canonical scale, so output prints 100.5 rather than 100.50
        side.insert(level.price.normalize(), level.quantity);
    }
}
