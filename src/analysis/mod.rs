//! Aggregation and classification of fetched records.

pub mod aggregator;
pub mod alerts;
pub mod sentiment;

pub use aggregator::*;
pub use alerts::{enrich_person, join_alerts};
