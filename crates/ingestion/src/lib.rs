//! Data ingestion and normalization for the cardfolio system.
//!
//! This crate handles:
//! - Value normalization (prices, percentages, counts, text, dates)
//! - Liquidity and listing classification
//! - Reference join and record enrichment
//! - Source abstraction and pipeline runs

pub mod normalizer;
pub mod classifier;
pub mod enricher;
pub mod source;
pub mod stats;
pub mod pipeline;

pub use classifier::{
    classify_listed_count, classify_listing, classify_liquidity, days_between, LiquidityClassifier,
};
pub use enricher::{card_identity_key, normalize_all, EnrichedRecords, Enricher};
pub use normalizer::{
    normalize_count, normalize_date, normalize_percentage, normalize_price, normalize_text,
};
pub use pipeline::run_pipeline;
pub use source::{InMemorySource, RecordSource, ReferenceSource};
pub use stats::EnrichmentStats;
