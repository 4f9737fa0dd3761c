//! PyO3 bindings for the cardfolio pipeline.
//!
//! Exposes the Rust implementation to the Python dashboard:
//! - Value normalizers and classifiers
//! - Batch enrichment over lists of dicts
//! - Display formatters
//! - Column taxonomy and price history

use anyhow::Context;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};

use cardfolio_analytics::{
    format_alert as rust_format_alert, format_percentage as rust_format_percentage,
    format_price as rust_format_price, format_price_change as rust_format_price_change,
    ColumnCategory, ColumnTaxonomy,
};
use cardfolio_core::logging::init_logging as rust_init_logging;
use cardfolio_core::{
    CanonicalValue, Config as RustConfig, EnrichedRecord, RawRecord, RawValue, ReferenceRecord,
};
use cardfolio_history::{HistoryStore, SeriesStats as RustSeriesStats};
use cardfolio_ingestion::{
    classify_listing as rust_classify_listing, classify_liquidity as rust_classify_liquidity,
    normalize_all as rust_normalize_all,
};

// ============================================================================
// Value conversion
// ============================================================================

/// Python cell to raw value: `None` is missing, `str` is text, anything
/// numeric is a number, everything else goes through `str()`.
fn raw_value(obj: &Bound<'_, PyAny>) -> PyResult<RawValue> {
    if obj.is_none() {
        return Ok(RawValue::Missing);
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(RawValue::Text(s.to_str()?.to_string()));
    }
    match obj.extract::<f64>() {
        Ok(v) => Ok(RawValue::Number(v)),
        Err(_) => Ok(RawValue::Text(obj.str()?.to_str()?.to_string())),
    }
}

fn raw_to_json(value: RawValue) -> serde_json::Value {
    match value {
        RawValue::Missing => serde_json::Value::Null,
        RawValue::Number(v) => serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        RawValue::Text(s) => serde_json::Value::String(s),
    }
}

fn raw_record(row: &Bound<'_, PyDict>) -> anyhow::Result<RawRecord> {
    let mut fields = serde_json::Map::new();
    for (key, value) in row.iter() {
        let key: String = key.extract().context("holding column names must be strings")?;
        fields.insert(key, raw_to_json(raw_value(&value)?));
    }
    Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
}

fn optional_text(row: &Bound<'_, PyDict>, field: &str) -> PyResult<Option<String>> {
    let value = match row.get_item(field)? {
        Some(v) => raw_value(&v)?,
        None => RawValue::Missing,
    };
    Ok(match value {
        RawValue::Text(s) => Some(s),
        RawValue::Number(v) if v.is_finite() => Some(v.to_string()),
        _ => None,
    })
}

fn reference_record(row: &Bound<'_, PyDict>) -> PyResult<ReferenceRecord> {
    Ok(ReferenceRecord {
        card_name: optional_text(row, "card_name")?.unwrap_or_default(),
        card_set: optional_text(row, "card_set")?.unwrap_or_default(),
        rarity: optional_text(row, "rarity")?,
        reserved_list: optional_text(row, "reserved_list")?,
        collection_number: optional_text(row, "collection_number")?,
        set_release_date: optional_text(row, "set_release_date")?,
        frame_era: optional_text(row, "frame_era")?,
        set_type: optional_text(row, "set_type")?,
    })
}

fn canonical_to_py(py: Python<'_>, value: &CanonicalValue) -> PyObject {
    match value {
        CanonicalValue::Price(v) | CanonicalValue::Percentage(v) => v.into_py(py),
        CanonicalValue::Count(c) => c.into_py(py),
        CanonicalValue::Text(s) => s.into_py(py),
        CanonicalValue::Date(d) => d.to_string().into_py(py),
        CanonicalValue::Missing => py.None(),
    }
}

fn record_to_dict<'py>(py: Python<'py>, record: &EnrichedRecord) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for &field in EnrichedRecord::FIELDS {
        let value = record.get(field).unwrap_or_default();
        dict.set_item(field, canonical_to_py(py, &value))?;
    }
    dict.set_item("reference_matched", record.reference_matched)?;
    Ok(dict)
}

fn load_config(config_json: Option<&str>) -> anyhow::Result<RustConfig> {
    match config_json {
        Some(json) => Ok(RustConfig::from_json_str(json)?),
        None => Ok(RustConfig::default()),
    }
}

fn parse_category(category: &str) -> anyhow::Result<ColumnCategory> {
    match category.to_ascii_lowercase().as_str() {
        "dimension" | "dimensions" => Ok(ColumnCategory::Dimension),
        "metric" | "metrics" => Ok(ColumnCategory::Metric),
        other => anyhow::bail!("unknown column category {other:?}"),
    }
}

// ============================================================================
// Normalizers and classifiers
// ============================================================================

/// Parse a price cell; `None` when unusable.
#[pyfunction]
fn normalize_price(value: &Bound<'_, PyAny>) -> PyResult<Option<f64>> {
    Ok(cardfolio_ingestion::normalize_price(&raw_value(value)?).as_f64())
}

/// Parse a percentage cell into a decimal fraction.
#[pyfunction]
fn normalize_percentage(value: &Bound<'_, PyAny>) -> PyResult<Option<f64>> {
    Ok(cardfolio_ingestion::normalize_percentage(&raw_value(value)?).as_f64())
}

#[pyfunction]
fn normalize_count(value: &Bound<'_, PyAny>) -> PyResult<Option<i64>> {
    Ok(cardfolio_ingestion::normalize_count(&raw_value(value)?).as_count())
}

#[pyfunction]
fn normalize_text(value: &Bound<'_, PyAny>) -> PyResult<Option<String>> {
    Ok(cardfolio_ingestion::normalize_text(&raw_value(value)?)
        .as_text()
        .map(str::to_string))
}

/// Parse a date cell; returns an ISO `YYYY-MM-DD` string.
#[pyfunction]
fn normalize_date(value: &Bound<'_, PyAny>) -> PyResult<Option<String>> {
    Ok(cardfolio_ingestion::normalize_date(&raw_value(value)?)
        .as_date()
        .map(|d| d.to_string()))
}

/// Liquidity tier label for a gap in days.
#[pyfunction]
#[pyo3(signature = (days=None))]
fn classify_liquidity(days: Option<i64>) -> &'static str {
    rust_classify_liquidity(days).label()
}

/// Listed status label for a raw `listed_stock` cell.
#[pyfunction]
fn classify_listing(value: &Bound<'_, PyAny>) -> PyResult<&'static str> {
    Ok(rust_classify_listing(&raw_value(value)?).label())
}

#[pyfunction]
#[pyo3(signature = (card_name=None, card_set=None, foil=None))]
fn card_identity_key(
    card_name: Option<&str>,
    card_set: Option<&str>,
    foil: Option<&str>,
) -> String {
    cardfolio_ingestion::card_identity_key(card_name, card_set, &RawValue::from(foil))
}

/// Enrich holdings against the reference table.
///
/// Both arguments are lists of dicts keyed by column name. Returns one flat
/// dict per holding, in input order.
#[pyfunction]
#[pyo3(signature = (rows, references, config_json=None))]
fn normalize_all<'py>(
    py: Python<'py>,
    rows: Vec<Bound<'py, PyDict>>,
    references: Vec<Bound<'py, PyDict>>,
    config_json: Option<&str>,
) -> anyhow::Result<Vec<Bound<'py, PyDict>>> {
    let config = load_config(config_json)?;
    let raw_rows = rows.iter().map(raw_record).collect::<anyhow::Result<Vec<_>>>()?;
    let reference_rows = references
        .iter()
        .map(reference_record)
        .collect::<PyResult<Vec<_>>>()?;

    let records = rust_normalize_all(&raw_rows, &reference_rows, &config)?;
    let dicts = records
        .iter()
        .map(|record| record_to_dict(py, &record))
        .collect::<PyResult<Vec<_>>>()?;
    Ok(dicts)
}

// ============================================================================
// Formatters
// ============================================================================

#[pyfunction]
#[pyo3(signature = (value=None))]
fn format_price(value: Option<f64>) -> Option<String> {
    rust_format_price(&value.map_or(CanonicalValue::Missing, CanonicalValue::Price))
}

#[pyfunction]
#[pyo3(signature = (value=None, precision=0))]
fn format_percentage(value: Option<f64>, precision: usize) -> Option<String> {
    rust_format_percentage(
        &value.map_or(CanonicalValue::Missing, CanonicalValue::Percentage),
        precision,
    )
}

#[pyfunction]
#[pyo3(signature = (value=None, precision=1))]
fn format_price_change(value: Option<f64>, precision: usize) -> String {
    rust_format_price_change(
        &value.map_or(CanonicalValue::Missing, CanonicalValue::Percentage),
        precision,
    )
}

#[pyfunction]
#[pyo3(signature = (value=None))]
fn format_alert(value: Option<String>) -> Option<String> {
    rust_format_alert(&CanonicalValue::from(value))
}

// ============================================================================
// Python-exposed Classes
// ============================================================================

/// Column labels, categories and default selection.
#[pyclass(name = "ColumnTaxonomy")]
pub struct PyColumnTaxonomy {
    inner: ColumnTaxonomy,
}

#[pymethods]
impl PyColumnTaxonomy {
    /// The built-in taxonomy, or one loaded from JSON.
    #[new]
    #[pyo3(signature = (json=None))]
    fn new(json: Option<&str>) -> anyhow::Result<Self> {
        let inner = match json {
            Some(json) => ColumnTaxonomy::from_json_str(json)?,
            None => ColumnTaxonomy::default(),
        };
        Ok(PyColumnTaxonomy { inner })
    }

    fn label(&self, field: &str) -> String {
        self.inner.label(field)
    }

    /// `"Dimension"`, `"Metric"` or `None`.
    fn category(&self, field: &str) -> Option<&'static str> {
        self.inner.category(field).map(|c| match c {
            ColumnCategory::Dimension => "Dimension",
            ColumnCategory::Metric => "Metric",
        })
    }

    fn fields(&self, category: &str) -> anyhow::Result<Vec<String>> {
        let category = parse_category(category)?;
        Ok(self.inner.fields(category).map(str::to_string).collect())
    }

    fn available(&self, category: &str, present: Vec<String>) -> anyhow::Result<Vec<String>> {
        let category = parse_category(category)?;
        let present: Vec<&str> = present.iter().map(String::as_str).collect();
        Ok(self
            .inner
            .available(category, &present)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    fn default_selection(
        &self,
        category: &str,
        present: Vec<String>,
    ) -> anyhow::Result<Vec<String>> {
        let category = parse_category(category)?;
        let present: Vec<&str> = present.iter().map(String::as_str).collect();
        Ok(self
            .inner
            .default_selection(category, &present)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    fn __len__(&self) -> usize {
        self.inner.columns().len()
    }
}

/// Price statistics for one card.
#[pyclass]
#[derive(Clone)]
pub struct SeriesStats {
    #[pyo3(get)]
    pub lowest: f64,
    #[pyo3(get)]
    pub highest: f64,
    #[pyo3(get)]
    pub current: f64,
    #[pyo3(get)]
    pub average: f64,
}

#[pymethods]
impl SeriesStats {
    fn __repr__(&self) -> String {
        format!(
            "SeriesStats(lowest={:.2}, highest={:.2}, current={:.2}, average={:.2})",
            self.lowest, self.highest, self.current, self.average
        )
    }
}

impl From<RustSeriesStats> for SeriesStats {
    fn from(s: RustSeriesStats) -> Self {
        SeriesStats {
            lowest: s.lowest,
            highest: s.highest,
            current: s.current,
            average: s.average,
        }
    }
}

/// Read-only view of the historical price database.
#[pyclass(name = "HistoryStore")]
pub struct PyHistoryStore {
    inner: HistoryStore,
}

#[pymethods]
impl PyHistoryStore {
    #[new]
    #[pyo3(signature = (database_path=None, table=None))]
    fn new(database_path: Option<String>, table: Option<String>) -> anyhow::Result<Self> {
        let mut config = RustConfig::default().history;
        if let Some(path) = database_path {
            config.database_path = path;
        }
        if let Some(table) = table {
            config.table = table;
        }
        Ok(PyHistoryStore {
            inner: HistoryStore::open(&config)?,
        })
    }

    /// `(iso_date, price)` pairs, oldest first.
    fn series(&self, key: &str) -> anyhow::Result<Vec<(String, f64)>> {
        let series = self.inner.series(key)?;
        Ok(series
            .points()
            .iter()
            .map(|p| (p.date.to_string(), p.price))
            .collect())
    }

    fn stats(&self, key: &str) -> anyhow::Result<Option<SeriesStats>> {
        Ok(self.inner.series(key)?.stats().map(Into::into))
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides `level`.
#[pyfunction]
#[pyo3(signature = (level="info", pretty=false))]
fn init_logging(level: &str, pretty: bool) -> anyhow::Result<()> {
    let mut config = RustConfig::default().logging;
    config.log_level = level.to_string();
    if pretty {
        config.format = cardfolio_core::config::LogFormat::Pretty;
    }
    Ok(rust_init_logging(&config)?)
}

// ============================================================================
// Module Definition
// ============================================================================

/// Cardfolio - holdings normalization and enrichment for the dashboard.
#[pymodule]
fn cardfolio(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Normalizers and classifiers
    m.add_function(wrap_pyfunction!(normalize_price, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_percentage, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_count, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_text, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_date, m)?)?;
    m.add_function(wrap_pyfunction!(classify_liquidity, m)?)?;
    m.add_function(wrap_pyfunction!(classify_listing, m)?)?;
    m.add_function(wrap_pyfunction!(card_identity_key, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_all, m)?)?;

    // Formatters
    m.add_function(wrap_pyfunction!(format_price, m)?)?;
    m.add_function(wrap_pyfunction!(format_percentage, m)?)?;
    m.add_function(wrap_pyfunction!(format_price_change, m)?)?;
    m.add_function(wrap_pyfunction!(format_alert, m)?)?;

    // Classes
    m.add_class::<PyColumnTaxonomy>()?;
    m.add_class::<SeriesStats>()?;
    m.add_class::<PyHistoryStore>()?;

    m.add_function(wrap_pyfunction!(init_logging, m)?)?;

    Ok(())
}
