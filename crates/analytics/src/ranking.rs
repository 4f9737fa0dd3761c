//! Top-N ranking tables: most valuable reserved and non-reserved cards,
//! biggest 7-day gainers and losers.

use cardfolio_core::config::AnalyticsConfig;
use cardfolio_core::EnrichedRecord;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCard {
    /// 1-based position.
    pub rank: usize,
    pub card_name: Option<String>,
    pub card_set: Option<String>,
    pub card_identity_key: String,
    pub efficient_price: Option<f64>,
    pub price_diff_d7: Option<f64>,
}

impl RankedCard {
    fn new(rank: usize, record: &EnrichedRecord) -> Self {
        Self {
            rank,
            card_name: record.name().map(str::to_string),
            card_set: record.set().map(str::to_string),
            card_identity_key: record.card_identity_key.clone(),
            efficient_price: record.efficient_price.as_f64(),
            price_diff_d7: record.price_diff_d7.as_f64(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Descending,
    Ascending,
}

/// Stable sort by `key`, rows without a key last in either direction.
fn top_by<'a, F>(
    records: impl Iterator<Item = &'a EnrichedRecord>,
    key: F,
    direction: Direction,
    top_n: usize,
) -> Vec<RankedCard>
where
    F: Fn(&EnrichedRecord) -> Option<f64>,
{
    let mut keyed: Vec<(Option<OrderedFloat<f64>>, &EnrichedRecord)> =
        records.map(|r| (key(r).map(OrderedFloat), r)).collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(x), Some(y)) => match direction {
            Direction::Descending => Reverse(x).cmp(&Reverse(y)),
            Direction::Ascending => x.cmp(y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (_, record))| RankedCard::new(i + 1, record))
        .collect()
}

fn reserved_flag_is(record: &EnrichedRecord, flag: &str) -> bool {
    record.reserved_list.as_text() == Some(flag)
}

/// The four ranking tables of the overview page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    /// Reserved-list cards (`"Yes"`) by efficient price, highest first.
    pub reserved: Vec<RankedCard>,
    /// Non-reserved cards (`"No"`) by efficient price, highest first.
    pub non_reserved: Vec<RankedCard>,
    /// By 7-day change, highest first.
    pub gainers: Vec<RankedCard>,
    /// By 7-day change, lowest first.
    pub losers: Vec<RankedCard>,
}

impl Rankings {
    pub fn compute(records: &[EnrichedRecord], config: &AnalyticsConfig) -> Self {
        let top_n = config.top_n;
        let price = |r: &EnrichedRecord| r.efficient_price.as_f64();
        let change = |r: &EnrichedRecord| r.price_diff_d7.as_f64();

        Self {
            reserved: top_by(
                records.iter().filter(|r| reserved_flag_is(r, "Yes")),
                price,
                Direction::Descending,
                top_n,
            ),
            non_reserved: top_by(
                records.iter().filter(|r| reserved_flag_is(r, "No")),
                price,
                Direction::Descending,
                top_n,
            ),
            gainers: top_by(records.iter(), change, Direction::Descending, top_n),
            losers: top_by(records.iter(), change, Direction::Ascending, top_n),
        }
    }
}
