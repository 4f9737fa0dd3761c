//! Field normalizers.
//!
//! Each normalizer turns one raw cell into a [`CanonicalValue`]. Parsing is
//! done by `parse_*` helpers that return `Option`; a `None` becomes
//! `CanonicalValue::Missing`, so malformed input never aborts a row.

use cardfolio_core::{CanonicalValue, RawValue, NOT_AVAILABLE};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Currency glyphs stripped from price cells.
const CURRENCY_GLYPHS: [char; 3] = ['€', '£', '$'];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a float, rejecting NaN and infinities.
#[inline]
fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole-percent disambiguation: values outside `[-1, 1]` are divided by 100.
#[inline]
fn scale_whole_percent(value: f64) -> f64 {
    if (-1.0..=1.0).contains(&value) {
        value
    } else {
        value / 100.0
    }
}

/// Parse a locale-ambiguous price string.
///
/// `,` is read as the decimal separator. When more than one `.` remains,
/// all but the last are thousands separators: `"€1.234,56"` -> 1234.56.
pub fn parse_price(text: &str) -> Option<f64> {
    let stripped: String = text.chars().filter(|c| !CURRENCY_GLYPHS.contains(c)).collect();
    let cleaned = stripped.trim().replace(',', ".");

    let parts: Vec<&str> = cleaned.split('.').collect();
    if parts.len() > 2 {
        let (fraction, integer) = parts.split_last()?;
        parse_finite(&format!("{}.{}", integer.concat(), fraction))
    } else {
        parse_finite(&cleaned)
    }
}

/// Parse a percentage string into a decimal fraction.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".").to_lowercase();
    if cleaned.is_empty() || cleaned == "null" {
        return None;
    }

    if cleaned.contains('%') {
        parse_finite(cleaned.replace('%', "").trim()).map(|v| v / 100.0)
    } else {
        parse_finite(&cleaned).map(scale_whole_percent)
    }
}

/// Parse an integral count. Fractional values are rejected.
pub fn parse_count(text: &str) -> Option<i64> {
    parse_finite(text.trim()).and_then(float_to_count)
}

fn float_to_count(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse a timestamp, accepting the layouts the export is known to use.
///
/// A plain date is taken at midnight. RFC 3339 offsets are dropped, keeping
/// the wall-clock time.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
}

/// Parse a calendar date. Time of day, when present, is discarded.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_datetime(text).map(|dt| dt.date())
}

/// Full timestamp of a date cell, used for day gaps.
pub fn raw_datetime(raw: &RawValue) -> Option<NaiveDateTime> {
    raw.as_text()
        .filter(|s| *s != NOT_AVAILABLE)
        .and_then(parse_datetime)
}

/// Normalize a price cell.
pub fn normalize_price(raw: &RawValue) -> CanonicalValue {
    let value = match raw {
        RawValue::Missing => None,
        RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
        RawValue::Text(s) if s == NOT_AVAILABLE => None,
        RawValue::Text(s) => parse_price(s),
    };
    value.map(CanonicalValue::Price).unwrap_or(CanonicalValue::Missing)
}

/// Normalize a percentage cell into a decimal fraction.
///
/// Numbers already in `[-1, 1]` are kept as fractions; anything larger in
/// magnitude is taken to be whole percent. `-1.5` and `-150` therefore both
/// mean -1.5%.
pub fn normalize_percentage(raw: &RawValue) -> CanonicalValue {
    let value = match raw {
        RawValue::Missing => None,
        RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()).map(scale_whole_percent),
        RawValue::Text(s) if s == NOT_AVAILABLE => None,
        RawValue::Text(s) => parse_percentage(s),
    };
    value.map(CanonicalValue::Percentage).unwrap_or(CanonicalValue::Missing)
}

/// Normalize a quantity or stock cell.
///
/// Only whole numbers are counts: `"2.5"` becomes `Missing` rather than being
/// rounded. Listing status is classified from the raw cell, so a fractional
/// `listed_stock` can still be "Listed" while its count is `Missing`.
pub fn normalize_count(raw: &RawValue) -> CanonicalValue {
    let value = match raw {
        RawValue::Missing => None,
        RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()).and_then(float_to_count),
        RawValue::Text(s) if s == NOT_AVAILABLE => None,
        RawValue::Text(s) => parse_count(s),
    };
    value.map(CanonicalValue::Count).unwrap_or(CanonicalValue::Missing)
}

/// Normalize a descriptive text cell. Input text is kept verbatim.
pub fn normalize_text(raw: &RawValue) -> CanonicalValue {
    match raw {
        RawValue::Text(s) if !raw.is_blank() => CanonicalValue::Text(s.clone()),
        RawValue::Number(v) if v.is_finite() => CanonicalValue::Text(v.to_string()),
        _ => CanonicalValue::Missing,
    }
}

/// Normalize an optional reference attribute.
pub fn normalize_optional_text(value: Option<&str>) -> CanonicalValue {
    match value {
        Some(s) => normalize_text(&RawValue::from(s)),
        None => CanonicalValue::Missing,
    }
}

/// Normalize a date cell.
pub fn normalize_date(raw: &RawValue) -> CanonicalValue {
    raw_datetime(raw)
        .map(|dt| CanonicalValue::Date(dt.date()))
        .unwrap_or(CanonicalValue::Missing)
}
