//! orderbook-replay: point-in-time order book reconstruction
//!
//! This library provides the core components for:
//! - Fetching historical order book snapshots and diffs from Amberdata
//! - Rebuilding an L2 book at any millisecond from snapshot + diffs
//! - Estimating market order fills and savings versus the midpoint
//! - Configuration, structured logging and metrics

pub mod cli;
pub mod config;
pub mod error;
pub mod orderbook;
pub mod provider;
pub mod telemetry;

pub use error::{ReplayError, Result};
