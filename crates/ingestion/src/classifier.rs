//! Liquidity and listing classification.
//!
//! Liquidity buckets the gap between a holding's last price update and its
//! last recorded sale. Listing reports whether any stock is on the market.

use cardfolio_core::config::LiquidityConfig;
use cardfolio_core::{CanonicalValue, LiquidityTier, ListedStatus, RawValue, NOT_AVAILABLE};
use chrono::NaiveDateTime;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `last_sold` to `last_updated`, floored.
///
/// Time of day counts: a 36 hour gap is 1 day, and a sale 12 hours after
/// the update is -1. `None` if either timestamp is absent.
pub fn days_between(
    last_updated: Option<NaiveDateTime>,
    last_sold: Option<NaiveDateTime>,
) -> Option<i64> {
    let seconds = (last_updated? - last_sold?).num_seconds();
    Some(seconds.div_euclid(SECONDS_PER_DAY))
}

/// Buckets a day gap into a [`LiquidityTier`].
#[derive(Debug, Clone)]
pub struct LiquidityClassifier {
    very_high_max: i64,
    high_max: i64,
    moderate_max: i64,
    low_max: i64,
}

impl LiquidityClassifier {
    /// Create a classifier from (already validated) boundaries.
    pub fn new(config: &LiquidityConfig) -> Self {
        Self {
            very_high_max: config.very_high_max_days,
            high_max: config.high_max_days,
            moderate_max: config.moderate_max_days,
            low_max: config.low_max_days,
        }
    }

    /// Classify a day gap. Ranges are inclusive and checked in order.
    pub fn classify(&self, diff_days: Option<i64>) -> LiquidityTier {
        match diff_days {
            Some(d) if d < 0 => LiquidityTier::NotAvailable,
            Some(d) if d <= self.very_high_max => LiquidityTier::VeryHigh,
            Some(d) if d <= self.high_max => LiquidityTier::High,
            Some(d) if d <= self.moderate_max => LiquidityTier::Moderate,
            Some(d) if d <= self.low_max => LiquidityTier::Low,
            Some(_) => LiquidityTier::VeryLow,
            None => LiquidityTier::NotAvailable,
        }
    }

    /// Classify from two timestamps.
    pub fn classify_timestamps(
        &self,
        last_updated: Option<NaiveDateTime>,
        last_sold: Option<NaiveDateTime>,
    ) -> LiquidityTier {
        self.classify(days_between(last_updated, last_sold))
    }

    /// Classify from the two canonical dates, taken at midnight.
    pub fn classify_dates(&self, last_updated: &CanonicalValue, last_sold: &CanonicalValue) -> LiquidityTier {
        let midnight = |v: &CanonicalValue| v.as_date().and_then(|d| d.and_hms_opt(0, 0, 0));
        self.classify_timestamps(midnight(last_updated), midnight(last_sold))
    }
}

impl Default for LiquidityClassifier {
    fn default() -> Self {
        Self::new(&LiquidityConfig::default())
    }
}

/// Classify a day gap with the default boundaries (1, 7, 14, 30 days).
pub fn classify_liquidity(diff_days: Option<i64>) -> LiquidityTier {
    LiquidityClassifier::default().classify(diff_days)
}

#[inline]
fn listed_if_positive(value: Option<f64>) -> ListedStatus {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => ListedStatus::Listed,
        _ => ListedStatus::NotListed,
    }
}

/// Classify a raw `listed_stock` cell.
///
/// Anything that does not parse as a positive number is "Not Listed".
/// `"12.0"` parses as 12.
pub fn classify_listing(raw: &RawValue) -> ListedStatus {
    let value = match raw {
        RawValue::Missing => None,
        RawValue::Number(v) => Some(*v),
        RawValue::Text(s) if s == NOT_AVAILABLE => None,
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
    };
    listed_if_positive(value)
}

/// Classify an already-normalized stock count.
pub fn classify_listed_count(value: &CanonicalValue) -> ListedStatus {
    listed_if_positive(value.as_f64())
}
