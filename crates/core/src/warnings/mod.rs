//! Warning and error aggregation for processing cycles.
//!
//! Normalizers report skipped records through a [`MessageSink`] handle
//! rather than global state, so each caller (and each test) owns an isolated
//! [`MessageAggregator`].

mod aggregator;

pub use aggregator::{Message, MessageAggregator, MessageSink};
