//! Core data types for the cardfolio system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel the holdings export uses for "no value".
pub const NOT_AVAILABLE: &str = "N/A";

/// A single cell as delivered by a record or reference source.
///
/// Exports mostly deliver strings, but numeric cells may already be typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Empty cell or absent column.
    #[default]
    Missing,
    /// Cell already typed as a number.
    Number(f64),
    /// Cell delivered as text (possibly the `"N/A"` sentinel).
    Text(String),
}

impl RawValue {
    /// Borrow the text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for an absent cell, a blank string or the `"N/A"` sentinel.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Missing => true,
            RawValue::Number(_) => false,
            RawValue::Text(s) => {
                let s = s.trim();
                s.is_empty() || s == NOT_AVAILABLE
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Number(v as f64)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Missing)
    }
}

/// One holding row from the inventory export.
///
/// Columns missing from the export deserialize as [`RawValue::Missing`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub amount: RawValue,
    pub card_name: RawValue,
    pub card_set: RawValue,
    pub language: RawValue,
    pub condition: RawValue,
    pub foil: RawValue,
    pub signed: RawValue,
    pub country: RawValue,
    pub alerts: RawValue,
    pub notes: RawValue,

    pub from_price: RawValue,
    pub trend_price: RawValue,
    pub ms_trend_price: RawValue,
    pub efficient_price: RawValue,
    pub conservative_price: RawValue,
    pub value_price: RawValue,
    pub purchase_price: RawValue,
    pub listed_price: RawValue,
    pub total_efficient_value: RawValue,
    pub total_conservative_value: RawValue,

    pub price_growth: RawValue,
    pub equity_in_country: RawValue,
    pub equity_on_cardmarket: RawValue,
    pub price_diff_d7: RawValue,

    /// Date the row's prices were last refreshed.
    pub date: RawValue,
    pub last_sold_date: RawValue,

    pub listed_stock: RawValue,
    pub total_stock: RawValue,
    pub country_stock: RawValue,
}

/// Descriptive attributes for one `(card_name, card_set)` printing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRecord {
    pub card_name: String,
    pub card_set: String,
    pub rarity: Option<String>,
    pub reserved_list: Option<String>,
    pub collection_number: Option<String>,
    pub set_release_date: Option<String>,
    pub frame_era: Option<String>,
    pub set_type: Option<String>,
}

/// A value after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CanonicalValue {
    /// Monetary amount (currency-agnostic).
    Price(f64),
    /// Decimal fraction: 0.05 means 5%.
    Percentage(f64),
    Text(String),
    Count(i64),
    Date(NaiveDate),
    #[default]
    Missing,
}

impl CanonicalValue {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, CanonicalValue::Missing)
    }

    /// Numeric view of prices, percentages and counts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CanonicalValue::Price(v) | CanonicalValue::Percentage(v) => Some(*v),
            CanonicalValue::Count(c) => Some(*c as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CanonicalValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CanonicalValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            CanonicalValue::Count(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<Option<String>> for CanonicalValue {
    fn from(v: Option<String>) -> Self {
        v.map(CanonicalValue::Text).unwrap_or(CanonicalValue::Missing)
    }
}

/// How recently a card sold relative to its last price update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidityTier {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
    /// Dates missing, unparseable, or sale recorded after the update.
    NotAvailable,
}

impl LiquidityTier {
    /// All tiers, most liquid first.
    pub const ALL: [LiquidityTier; 6] = [
        LiquidityTier::VeryHigh,
        LiquidityTier::High,
        LiquidityTier::Moderate,
        LiquidityTier::Low,
        LiquidityTier::VeryLow,
        LiquidityTier::NotAvailable,
    ];

    /// Display label used by the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            LiquidityTier::VeryHigh => "Very High",
            LiquidityTier::High => "High",
            LiquidityTier::Moderate => "Moderate",
            LiquidityTier::Low => "Low",
            LiquidityTier::VeryLow => "Very Low",
            LiquidityTier::NotAvailable => "Not Available",
        }
    }

    /// Ordinal rank: higher means more liquid, 0 for `NotAvailable`.
    pub fn rank(self) -> u8 {
        match self {
            LiquidityTier::VeryHigh => 5,
            LiquidityTier::High => 4,
            LiquidityTier::Moderate => 3,
            LiquidityTier::Low => 2,
            LiquidityTier::VeryLow => 1,
            LiquidityTier::NotAvailable => 0,
        }
    }
}

impl fmt::Display for LiquidityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the holding currently has stock listed on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListedStatus {
    Listed,
    NotListed,
}

impl ListedStatus {
    pub fn label(self) -> &'static str {
        match self {
            ListedStatus::Listed => "Listed",
            ListedStatus::NotListed => "Not Listed",
        }
    }

    #[inline]
    pub fn is_listed(self) -> bool {
        self == ListedStatus::Listed
    }
}

impl fmt::Display for ListedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A holding after normalization, reference join and derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    // Holding attributes
    pub amount: CanonicalValue,
    pub card_name: CanonicalValue,
    pub card_set: CanonicalValue,
    pub language: CanonicalValue,
    pub condition: CanonicalValue,
    pub foil: CanonicalValue,
    pub signed: CanonicalValue,
    pub country: CanonicalValue,
    pub alerts: CanonicalValue,
    pub notes: CanonicalValue,

    // Prices
    pub from_price: CanonicalValue,
    pub trend_price: CanonicalValue,
    pub ms_trend_price: CanonicalValue,
    pub efficient_price: CanonicalValue,
    pub conservative_price: CanonicalValue,
    pub value_price: CanonicalValue,
    pub purchase_price: CanonicalValue,
    pub listed_price: CanonicalValue,
    pub total_efficient_value: CanonicalValue,
    pub total_conservative_value: CanonicalValue,

    // Percentages
    pub price_growth: CanonicalValue,
    pub equity_in_country: CanonicalValue,
    pub equity_on_cardmarket: CanonicalValue,
    pub price_diff_d7: CanonicalValue,

    // Dates
    pub date: CanonicalValue,
    pub last_sold_date: CanonicalValue,

    // Counts
    pub listed_stock: CanonicalValue,
    pub total_stock: CanonicalValue,
    pub country_stock: CanonicalValue,

    // Reference attributes (Missing when the join found nothing)
    pub rarity: CanonicalValue,
    pub reserved_list: CanonicalValue,
    pub collection_number: CanonicalValue,
    pub set_release_date: CanonicalValue,
    pub frame_era: CanonicalValue,
    pub set_type: CanonicalValue,

    // Derived
    /// `"<name> - <set> - <Foil|Regular>"`, used to correlate with price history.
    pub card_identity_key: String,
    pub liquidity_tier: LiquidityTier,
    pub listed_status: ListedStatus,
    /// Whether a reference row was found for this holding.
    pub reference_matched: bool,
}

impl EnrichedRecord {
    /// Every column name accepted by [`EnrichedRecord::get`], in export order.
    pub const FIELDS: &'static [&'static str] = &[
        "amount",
        "card_name",
        "card_set",
        "language",
        "condition",
        "foil",
        "signed",
        "country",
        "alerts",
        "notes",
        "from_price",
        "trend_price",
        "ms_trend_price",
        "efficient_price",
        "conservative_price",
        "value_price",
        "purchase_price",
        "listed_price",
        "total_efficient_value",
        "total_conservative_value",
        "price_growth",
        "equity_in_country",
        "equity_on_cardmarket",
        "price_diff_d7",
        "date",
        "last_sold_date",
        "listed_stock",
        "total_stock",
        "country_stock",
        "rarity",
        "reserved_list",
        "collection_number",
        "set_release_date",
        "frame_era",
        "set_type",
        "liquidity",
        "listed_status",
        "card_name_set",
    ];

    /// Look up a value by its column name.
    ///
    /// Derived columns (`liquidity`, `listed_status`, `card_name_set`) are
    /// exposed as text. Unknown names return `None`.
    pub fn get(&self, field: &str) -> Option<CanonicalValue> {
        let value = match field {
            "amount" => &self.amount,
            "card_name" => &self.card_name,
            "card_set" => &self.card_set,
            "language" => &self.language,
            "condition" => &self.condition,
            "foil" => &self.foil,
            "signed" => &self.signed,
            "country" => &self.country,
            "alerts" => &self.alerts,
            "notes" => &self.notes,
            "from_price" => &self.from_price,
            "trend_price" => &self.trend_price,
            "ms_trend_price" => &self.ms_trend_price,
            "efficient_price" => &self.efficient_price,
            "conservative_price" => &self.conservative_price,
            "value_price" => &self.value_price,
            "purchase_price" => &self.purchase_price,
            "listed_price" => &self.listed_price,
            "total_efficient_value" => &self.total_efficient_value,
            "total_conservative_value" => &self.total_conservative_value,
            "price_growth" => &self.price_growth,
            "equity_in_country" => &self.equity_in_country,
            "equity_on_cardmarket" => &self.equity_on_cardmarket,
            "price_diff_d7" => &self.price_diff_d7,
            "date" => &self.date,
            "last_sold_date" => &self.last_sold_date,
            "listed_stock" => &self.listed_stock,
            "total_stock" => &self.total_stock,
            "country_stock" => &self.country_stock,
            "rarity" => &self.rarity,
            "reserved_list" => &self.reserved_list,
            "collection_number" => &self.collection_number,
            "set_release_date" => &self.set_release_date,
            "frame_era" => &self.frame_era,
            "set_type" => &self.set_type,
            "liquidity" => return Some(CanonicalValue::Text(self.liquidity_tier.label().into())),
            "listed_status" => return Some(CanonicalValue::Text(self.listed_status.label().into())),
            "card_name_set" => return Some(CanonicalValue::Text(self.card_identity_key.clone())),
            _ => return None,
        };
        Some(value.clone())
    }

    /// Card name, if present.
    pub fn name(&self) -> Option<&str> {
        self.card_name.as_text()
    }

    /// Set name, if present.
    pub fn set(&self) -> Option<&str> {
        self.card_set.as_text()
    }
}
