//! Coinfolio Core - trade normalization, warning aggregation and outbound
//! result conversion.
//!
//! This crate turns raw venue payloads into canonical [`exchanges::Trade`]
//! and [`exchanges::AssetMovement`] records. Records that cannot be
//! converted are skipped and reported through a [`warnings::MessageSink`]
//! handle owned by the caller.

pub mod errors;
pub mod exchanges;
pub mod rpc;
pub mod warnings;

pub use exchanges::{AssetMovement, Trade, TradeNormalizer};
pub use warnings::{MessageAggregator, MessageSink};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
