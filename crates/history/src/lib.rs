//! Historical price series for the cardfolio system.
//!
//! This crate handles:
//! - Reading daily prices per card identity key from SQLite
//! - Price series statistics (lowest, highest, current, average)

pub mod series;
pub mod store;

pub use series::{PricePoint, PriceSeries, SeriesStats};
pub use store::HistoryStore;
