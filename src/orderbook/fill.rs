//! Market order fill estimation against a reconstructed book
//!
//! Walks the opposite side of the book level by level to price a taker
//! order, and compares the result with a fill at the midpoint.

use super::{OrderBook, Side};
use rust_decimal::Decimal;
use serde::Serialize;

/// Outcome of walking the book for a hypothetical taker order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillEstimate {
    pub side: Side,
    /// Quantity asked for
    #[serde(with = "rust_decimal::serde::float")]
    pub requested: Decimal,
    /// Quantity the book could absorb
    #[serde(with = "rust_decimal::serde::float")]
    pub filled: Decimal,
    /// Quote-currency value of the filled quantity
    #[serde(with = "rust_decimal::serde::float")]
    pub notional: Decimal,
    /// Volume-weighted execution price
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_price: Option<Decimal>,
    /// Price of the deepest level touched
    #[serde(with = "rust_decimal::serde::float_option")]
    pub worst_price: Option<Decimal>,
    pub levels_consumed: usize,
}

/// What executing at the midpoint would save compared with walking the book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Savings {
    #[serde(with = "rust_decimal::serde::float")]
    pub midpoint: Decimal,
    /// Quote currency, positive when the midpoint is better for the taker
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// `amount` relative to the midpoint notional, in basis points
    #[serde(with = "rust_decimal::serde::float")]
    pub bps: Decimal,
}

impl FillEstimate {
    fn empty(side: Side, requested: Decimal) -> Self {
        Self {
            side,
            requested,
            filled: Decimal::ZERO,
            notional: Decimal::ZERO,
            average_price: None,
            worst_price: None,
            levels_consumed: 0,
        }
    }

    /// Whether the book had enough liquidity for the whole order
    pub fn fully_filled(&self) -> bool {
        self.requested > Decimal::ZERO && self.filled >= self.requested
    }

    /// Quantity the book could not absorb
    pub fn unfilled(&self) -> Decimal {
        (self.requested - self.filled).max(Decimal::ZERO)
    }

    /// Slippage of the average price from `reference`, in basis points
    ///
    /// Positive means worse for the taker.
    pub fn slippage_bps(&self, reference: Decimal) -> Option<Decimal> {
        let avg = self.average_price?;
        if reference.is_zero() {
            return None;
        }
        let diff = match self.side {
            Side::Buy => avg - reference,
            Side::Sell => reference - avg,
        };
        Some(diff / reference * Decimal::from(10_000))
    }

    /// Savings from filling the same quantity at `midpoint`
    pub fn savings_vs_midpoint(&self, midpoint: Decimal) -> Option<Savings> {
        if self.filled.is_zero() || midpoint.is_zero() {
            return None;
        }
        let at_mid = self.filled * midpoint;
        let amount = match self.side {
            Side::Buy => self.notional - at_mid,
            Side::Sell => at_mid - self.notional,
        };
        Some(Savings {
            midpoint,
            amount,
            bps: amount / at_mid * Decimal::from(10_000),
        })
    }
}

/// Price a taker order of `quantity` against `book`
///
/// Buys consume asks from the best (lowest) price upward; sells consume
/// bids from the best (highest) price downward. A non-positive quantity
/// yields an empty estimate.
pub fn estimate_fill(book: &OrderBook, side: Side, quantity: Decimal) -> FillEstimate {
    let mut estimate = FillEstimate::empty(side, quantity);
    if quantity <= Decimal::ZERO {
        return estimate;
    }

    let levels = match side {
        Side::Buy => &book.asks,
        Side::Sell => &book.bids,
    };

    let mut remaining = quantity;
    for level in levels {
        if remaining.is_zero() {
            break;
        }
        let take = remaining.min(level.quantity);
        if take <= Decimal::ZERO {
            continue;
        }
        estimate.filled += take;
        estimate.notional += take * level.price;
        estimate.worst_price = Some(level.price);
        estimate.levels_consumed += 1;
        remaining -= take;
    }

    if !estimate.filled.is_zero() {
        estimate.average_price = Some(estimate.notional / estimate.filled);
    }

    if !remaining.is_zero() {
        tracing::debug!(
            instrument = %book.instrument,
            ?side,
            requested = %quantity,
            unfilled = %remaining,
            "Book too thin to fill order"
        );
    }

    estimate
}
