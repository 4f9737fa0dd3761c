//! Portfolio summary metrics shown above the dashboard tabs.

use cardfolio_core::EnrichedRecord;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Card with the largest 7-day price change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMover {
    pub card_name: Option<String>,
    /// Change as a decimal fraction.
    pub change: f64,
}

/// Headline metrics for one portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Sum of `amount` over all holdings.
    pub total_cards: i64,
    /// Number of holding rows.
    pub unique_cards: usize,
    /// Sum of `total_efficient_value`; `None` if no row has one.
    pub portfolio_value: Option<f64>,
    /// Mean of the present `efficient_price` values.
    pub average_price: Option<f64>,
    /// Highest `price_diff_d7`, first holding on ties.
    pub top_mover: Option<TopMover>,
}

impl PortfolioSummary {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let total_cards = records.iter().filter_map(|r| r.amount.as_count()).sum();

        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.total_efficient_value.as_f64())
            .collect();
        let portfolio_value = (!values.is_empty()).then(|| values.iter().sum());

        let prices: Vec<f64> = records.iter().filter_map(|r| r.efficient_price.as_f64()).collect();
        let average_price = (!prices.is_empty()).then(|| prices.iter().mean());

        let mut top_mover: Option<TopMover> = None;
        for record in records {
            let Some(change) = record.price_diff_d7.as_f64() else {
                continue;
            };
            if top_mover.as_ref().map_or(true, |m| change > m.change) {
                top_mover = Some(TopMover {
                    card_name: record.name().map(str::to_string),
                    change,
                });
            }
        }

        Self {
            total_cards,
            unique_cards: records.len(),
            portfolio_value,
            average_price,
            top_mover,
        }
    }
}
