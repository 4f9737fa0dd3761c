//! Per-set and per-category breakdowns for the overview charts.

use cardfolio_core::EnrichedRecord;
use cardfolio_ingestion::normalizer::parse_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregates for one set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetBreakdown {
    pub card_set: String,
    /// Sum of `total_efficient_value`.
    pub total_value: f64,
    /// Share of the portfolio value, in percent (0-100).
    pub share_pct: f64,
    /// Sum of `amount`.
    pub amount: i64,
    pub release_date: Option<NaiveDate>,
}

/// Group holdings by set, oldest set first.
///
/// Holdings without a set are left out. Sets with no known release date
/// sort last, then by name.
pub fn set_breakdown(records: &[EnrichedRecord]) -> Vec<SetBreakdown> {
    let portfolio_value: f64 = records
        .iter()
        .filter_map(|r| r.total_efficient_value.as_f64())
        .sum();

    let mut by_set: BTreeMap<&str, SetBreakdown> = BTreeMap::new();
    for record in records {
        let Some(set) = record.set() else { continue };
        let entry = by_set.entry(set).or_insert_with(|| SetBreakdown {
            card_set: set.to_string(),
            total_value: 0.0,
            share_pct: 0.0,
            amount: 0,
            release_date: None,
        });
        entry.total_value += record.total_efficient_value.as_f64().unwrap_or(0.0);
        entry.amount += record.amount.as_count().unwrap_or(0);
        if entry.release_date.is_none() {
            entry.release_date = record.set_release_date.as_text().and_then(parse_date);
        }
    }

    let mut sets: Vec<SetBreakdown> = by_set.into_values().collect();
    for set in &mut sets {
        set.share_pct = if portfolio_value > 0.0 {
            set.total_value / portfolio_value * 100.0
        } else {
            0.0
        };
    }
    sets.sort_by(|a, b| match (a.release_date, b.release_date) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.card_set.cmp(&b.card_set)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.card_set.cmp(&b.card_set),
    });
    sets
}

/// Categorical column used for pie-chart breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownDimension {
    ReservedList,
    Rarity,
    ListedStatus,
    LiquidityTier,
}

impl BreakdownDimension {
    fn value_of(self, record: &EnrichedRecord) -> Option<String> {
        match self {
            BreakdownDimension::ReservedList => record.reserved_list.as_text().map(str::to_string),
            BreakdownDimension::Rarity => record.rarity.as_text().map(str::to_string),
            BreakdownDimension::ListedStatus => Some(record.listed_status.label().to_string()),
            BreakdownDimension::LiquidityTier => Some(record.liquidity_tier.label().to_string()),
        }
    }
}

/// Number of distinct card names per value of `dimension`.
///
/// Holdings missing either the value or a card name are not counted.
pub fn count_unique_names_by(
    records: &[EnrichedRecord],
    dimension: BreakdownDimension,
) -> Vec<(String, usize)> {
    let mut groups: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        if let (Some(value), Some(name)) = (dimension.value_of(record), record.name()) {
            groups.entry(value).or_default().insert(name);
        }
    }
    groups.into_iter().map(|(value, names)| (value, names.len())).collect()
}
