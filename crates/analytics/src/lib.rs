//! Presentation-facing analytics for the cardfolio system.
//!
//! This crate handles:
//! - Column taxonomy (labels, Dimension/Metric categories, default columns)
//! - Display formatting of canonical values
//! - Portfolio summary metrics
//! - Per-set and per-category breakdowns
//! - Top-N ranking tables

pub mod taxonomy;
pub mod format;
pub mod summary;
pub mod breakdown;
pub mod ranking;

pub use breakdown::{count_unique_names_by, set_breakdown, BreakdownDimension, SetBreakdown};
pub use format::{format_alert, format_percentage, format_price, format_price_change, Formatter};
pub use ranking::{RankedCard, Rankings};
pub use summary::PortfolioSummary;
pub use taxonomy::{column_taxonomy, ColumnCategory, ColumnSpec, ColumnTaxonomy};
