//! Display formatting of canonical values.
//!
//! These are lossy: a formatted value is not expected to normalize back to
//! exactly the same number.

use cardfolio_core::config::FormatConfig;
use cardfolio_core::CanonicalValue;

/// Insert `,` every three digits of the integer part.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a number with thousands separators and fixed decimals.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    match fraction {
        Some(f) => format!("{sign}{}.{f}", group_thousands(integer)),
        None => format!("{sign}{}", group_thousands(integer)),
    }
}

/// Numeric view used by the formatters; numeric-looking text is accepted.
fn numeric(value: &CanonicalValue) -> Option<f64> {
    value.as_f64().or_else(|| {
        value
            .as_text()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    })
}

/// Render a price as `1,234.56`. No currency glyph is attached.
///
/// Text that is not numeric is passed through; `Missing` renders nothing.
pub fn format_price(value: &CanonicalValue) -> Option<String> {
    if let Some(v) = numeric(value) {
        return Some(format_grouped(v, 2));
    }
    match value {
        CanonicalValue::Text(s) => Some(s.clone()),
        CanonicalValue::Date(d) => Some(d.to_string()),
        _ => None,
    }
}

/// Render a fraction as a percentage: `0.05` -> `"5%"` at precision 0.
///
/// Exactly zero is always `"0%"`.
pub fn format_percentage(value: &CanonicalValue, precision: usize) -> Option<String> {
    let v = numeric(value)?;
    if v == 0.0 {
        return Some("0%".to_string());
    }
    Some(format!("{}%", format_grouped(v * 100.0, precision)))
}

/// Render a 7-day change for ranking tables, `"N/A"` when absent.
pub fn format_price_change(value: &CanonicalValue, precision: usize) -> String {
    match numeric(value) {
        Some(v) => format!("{:.*}%", precision, v * 100.0),
        None => "N/A".to_string(),
    }
}

/// Direction of a price change, for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
    Flat,
}

pub fn price_direction(value: &CanonicalValue) -> Option<PriceDirection> {
    let v = numeric(value)?;
    Some(if v > 0.0 {
        PriceDirection::Up
    } else if v < 0.0 {
        PriceDirection::Down
    } else {
        PriceDirection::Flat
    })
}

/// Render the alerts column: `L` is "Listed", `U` is "Urgent", a price
/// threshold such as `"€12.0"` becomes `"12"`; anything else is unchanged.
pub fn format_alert(value: &CanonicalValue) -> Option<String> {
    let text = match value {
        CanonicalValue::Missing => return None,
        CanonicalValue::Text(s) => s.clone(),
        other => match other.as_f64() {
            Some(v) => return Some(format!("{}", v.trunc() as i64)),
            None => return format_price(other),
        },
    };
    match text.as_str() {
        "L" => Some("Listed".to_string()),
        "U" => Some("Urgent".to_string()),
        _ => match text.replace('€', "").trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Some(format!("{}", v.trunc() as i64)),
            _ => Some(text),
        },
    }
}

/// Formatter bound to the configured precisions and currency glyph.
#[derive(Debug, Clone)]
pub struct Formatter {
    percentage_precision: usize,
    price_change_precision: usize,
    currency_symbol: String,
}

impl Formatter {
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            percentage_precision: config.percentage_precision,
            price_change_precision: config.price_change_precision,
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    pub fn price(&self, value: &CanonicalValue) -> Option<String> {
        format_price(value)
    }

    pub fn percentage(&self, value: &CanonicalValue) -> Option<String> {
        format_percentage(value, self.percentage_precision)
    }

    pub fn price_change(&self, value: &CanonicalValue) -> String {
        format_price_change(value, self.price_change_precision)
    }

    /// Amount with the currency glyph, e.g. `€12,345` at 0 decimals.
    pub fn currency(&self, amount: f64, decimals: usize) -> String {
        let grouped = format_grouped(amount, decimals);
        match grouped.strip_prefix('-') {
            Some(rest) => format!("-{}{rest}", self.currency_symbol),
            None => format!("{}{grouped}", self.currency_symbol),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(&FormatConfig::default())
    }
}
