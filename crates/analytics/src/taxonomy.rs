//! Column taxonomy.
//!
//! Static configuration consumed by the grid: a display label per field, a
//! Dimension/Metric category, and whether the column is shown by default.
//! Built once at startup and passed around by reference.

use cardfolio_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Grid column category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnCategory {
    /// Descriptive attribute (name, set, condition, ...).
    Dimension,
    /// Numeric measure (prices, stock, percentages).
    Metric,
}

/// One registered column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    pub label: String,
    /// `None` for columns that have a label but are not selectable.
    pub category: Option<ColumnCategory>,
    #[serde(default)]
    pub default_visible: bool,
}

use ColumnCategory::{Dimension, Metric};

/// (field, label, category, shown by default)
const DEFAULT_COLUMNS: &[(&str, &str, Option<ColumnCategory>, bool)] = &[
    ("amount", "Amount", Some(Dimension), true),
    ("card_name", "Card Name", Some(Dimension), true),
    ("card_set", "Set", Some(Dimension), true),
    ("language", "Language", Some(Dimension), true),
    ("condition", "Condition", Some(Dimension), true),
    ("foil", "Foil", Some(Dimension), true),
    ("signed", "Signed", Some(Dimension), true),
    ("country", "Country", Some(Dimension), false),
    ("liquidity", "Liquidity", Some(Dimension), true),
    ("last_sold_date", "Last Sold Date", Some(Dimension), true),
    ("alerts", "Alerts", Some(Dimension), true),
    ("notes", "Notes", Some(Dimension), false),
    ("collection_number", "Collection Number", Some(Dimension), false),
    ("rarity", "Rarity", Some(Dimension), false),
    ("reserved_list", "Reserved List", Some(Dimension), false),
    ("set_release_date", "Set Release Date", Some(Dimension), false),
    ("frame_era", "Frame Era", Some(Dimension), false),
    ("set_type", "Set Type", Some(Dimension), false),
    ("from_price", "From Price", Some(Metric), true),
    ("trend_price", "Trend Price", Some(Metric), true),
    ("ms_trend_price", "MS Trend Price", Some(Metric), true),
    ("efficient_price", "Efficient Price", Some(Metric), true),
    ("conservative_price", "Conservative Price", Some(Metric), true),
    ("value_price", "Value Price", Some(Metric), true),
    ("total_stock", "Total Stock", Some(Metric), false),
    ("country_stock", "Country Stock", Some(Metric), false),
    ("price_growth", "Price Growth", Some(Metric), false),
    ("equity_in_country", "Equity in Country", Some(Metric), false),
    ("equity_on_cardmarket", "Equity on Cardmarket", Some(Metric), false),
    ("listed_price", "Cardmarket Listed Price", Some(Metric), false),
    ("listed_stock", "Cardmarket Listed Stock", Some(Metric), false),
    ("total_efficient_value", "Total Value", Some(Metric), false),
    ("total_conservative_value", "Conservative Value", Some(Metric), false),
    ("price_diff_d7", "Today vs D7", Some(Metric), true),
    ("date", "Date", None, false),
];

/// Underscores to spaces, then title-case each alphabetic run.
///
/// `"card_name_set"` -> `"Card Name Set"`, `"price_diff_d7"` -> `"Price Diff D7"`.
pub fn fallback_label(field: &str) -> String {
    let mut label = String::with_capacity(field.len());
    let mut prev_alpha = false;
    for c in field.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if c.is_alphabetic() {
            if prev_alpha {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            label.push(c);
            prev_alpha = false;
        }
    }
    label
}

/// Immutable column registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTaxonomy {
    columns: Vec<ColumnSpec>,
}

impl Default for ColumnTaxonomy {
    fn default() -> Self {
        let columns = DEFAULT_COLUMNS
            .iter()
            .map(|&(field, label, category, default_visible)| ColumnSpec {
                field: field.to_string(),
                label: label.to_string(),
                category,
                default_visible,
            })
            .collect();
        Self { columns }
    }
}

impl ColumnTaxonomy {
    /// Build a taxonomy from explicit specs. Field names must be unique.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.field.as_str()) {
                return Err(Error::config(format!("duplicate column {:?}", column.field)));
            }
        }
        Ok(Self { columns })
    }

    /// Load a taxonomy from JSON (`{"columns": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: ColumnTaxonomy = serde_json::from_str(json)?;
        Self::new(parsed.columns)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn get(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Display label, falling back to a title-cased field name.
    pub fn label(&self, field: &str) -> String {
        match self.get(field) {
            Some(spec) => spec.label.clone(),
            None => fallback_label(field),
        }
    }

    pub fn category(&self, field: &str) -> Option<ColumnCategory> {
        self.get(field).and_then(|c| c.category)
    }

    pub fn is_default(&self, field: &str) -> bool {
        self.get(field).is_some_and(|c| c.default_visible)
    }

    /// Fields of a category, in registry order.
    pub fn fields(&self, category: ColumnCategory) -> impl Iterator<Item = &str> + '_ {
        self.columns
            .iter()
            .filter(move |c| c.category == Some(category))
            .map(|c| c.field.as_str())
    }

    /// Fields of a category that exist in the dataset.
    pub fn available<'a>(&'a self, category: ColumnCategory, present: &[&str]) -> Vec<&'a str> {
        self.fields(category).filter(|f| present.contains(f)).collect()
    }

    /// Fields of a category that exist in the dataset and are shown by default.
    pub fn default_selection<'a>(&'a self, category: ColumnCategory, present: &[&str]) -> Vec<&'a str> {
        self.available(category, present)
            .into_iter()
            .filter(|f| self.is_default(f))
            .collect()
    }
}

/// The taxonomy used by the dashboard.
pub fn column_taxonomy() -> ColumnTaxonomy {
    ColumnTaxonomy::default()
}
