//! Enrichment quality counters.

use cardfolio_core::{EnrichedRecord, LiquidityTier};
use serde::Serialize;

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentStats {
    /// Total rows enriched.
    pub total_rows: u64,
    /// Rows that found a reference row.
    pub reference_matches: u64,
    /// Rows left without reference attributes.
    pub reference_misses: u64,
    /// Rows with stock listed on the marketplace.
    pub listed_rows: u64,
    /// Rows whose efficient price was absent or unparseable.
    pub missing_efficient_price: u64,
    /// Rows per liquidity tier, in [`LiquidityTier::ALL`] order.
    pub tier_counts: [u64; 6],
}

impl EnrichmentStats {
    /// Tally a batch of records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EnrichedRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.record(record);
        }
        stats
    }

    /// Add one record to the tally.
    pub fn record(&mut self, record: &EnrichedRecord) {
        self.total_rows += 1;
        if record.reference_matched {
            self.reference_matches += 1;
        } else {
            self.reference_misses += 1;
        }
        if record.listed_status.is_listed() {
            self.listed_rows += 1;
        }
        if record.efficient_price.is_missing() {
            self.missing_efficient_price += 1;
        }
        if let Some(idx) = LiquidityTier::ALL.iter().position(|t| *t == record.liquidity_tier) {
            self.tier_counts[idx] += 1;
        }
    }

    /// Rows in the given tier.
    pub fn tier_count(&self, tier: LiquidityTier) -> u64 {
        LiquidityTier::ALL
            .iter()
            .position(|t| *t == tier)
            .map(|idx| self.tier_counts[idx])
            .unwrap_or(0)
    }

    /// Fraction of rows that matched reference data.
    pub fn match_rate(&self) -> f64 {
        if self.total_rows > 0 {
            self.reference_matches as f64 / self.total_rows as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::Enricher;
    use cardfolio_core::{Config, RawRecord, ReferenceRecord};

    #[test]
    fn test_stats() {
        let reference = ReferenceRecord {
            card_name: "Sol Ring".into(),
            card_set: "Alpha".into(),
            ..Default::default()
        };
        let rows = vec![
            RawRecord {
                card_name: "Sol Ring".into(),
                card_set: "Alpha".into(),
                efficient_price: "10".into(),
                listed_stock: "2".into(),
                date: "2024-02-01".into(),
                last_sold_date: "2024-01-20".into(),
                ..Default::default()
            },
            RawRecord::default(),
        ];
        let enricher = Enricher::new(&[reference], &Config::default());
        let records: Vec<_> = enricher.normalize_all(&rows).iter().collect();
        let mut stats = EnrichmentStats::from_records(&records);

        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.reference_matches, 1);
        assert_eq!(stats.reference_misses, 1);
        assert_eq!(stats.listed_rows, 1);
        assert_eq!(stats.missing_efficient_price, 1);
        assert_eq!(stats.tier_count(LiquidityTier::Moderate), 1);
        assert_eq!(stats.tier_count(LiquidityTier::NotAvailable), 1);
        assert!((stats.match_rate() - 0.5).abs() < 1e-12);

        stats.reset();
        assert_eq!(stats, EnrichmentStats::default());
        assert_eq!(stats.match_rate(), 0.0);
    }
}
