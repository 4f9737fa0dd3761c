//! Configuration structures for the cardfolio system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the pipeline and its consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Liquidity tier boundaries.
    pub liquidity: LiquidityConfig,
    /// Display formatting.
    pub format: FormatConfig,
    /// Dashboard aggregates.
    pub analytics: AnalyticsConfig,
    /// Historical price database.
    pub history: HistoryConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.liquidity.validate()?;

        if self.format.percentage_precision > 6 || self.format.price_change_precision > 6 {
            return Err(Error::config("format precision must be at most 6 decimals"));
        }
        if self.analytics.top_n == 0 {
            return Err(Error::config("analytics.top_n must be positive"));
        }
        let table = &self.history.table;
        if table.is_empty()
            || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::config(format!(
                "history.table must be a plain identifier, got {table:?}"
            )));
        }
        Ok(())
    }
}

/// Liquidity tier boundaries, as inclusive upper bounds in days.
///
/// A gap of `0..=very_high_max_days` is "Very High", up to `high_max_days`
/// is "High", and so on; anything above `low_max_days` is "Very Low".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityConfig {
    pub very_high_max_days: i64,
    pub high_max_days: i64,
    pub moderate_max_days: i64,
    pub low_max_days: i64,
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            very_high_max_days: 1,
            high_max_days: 7,
            moderate_max_days: 14,
            low_max_days: 30,
        }
    }
}

impl LiquidityConfig {
    /// Boundaries must be non-negative and strictly ascending.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            self.very_high_max_days,
            self.high_max_days,
            self.moderate_max_days,
            self.low_max_days,
        ];
        if bounds[0] < 0 || !bounds.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::config(format!(
                "liquidity boundaries must be non-negative and strictly ascending, got {bounds:?}"
            )));
        }
        Ok(())
    }
}

/// Display formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Decimals shown for percentage columns in the grid.
    pub percentage_precision: usize,
    /// Decimals shown for the 7-day change in ranking tables.
    pub price_change_precision: usize,
    /// Glyph prepended to prices by the presentation layer.
    pub currency_symbol: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            percentage_precision: 0,
            price_change_precision: 1,
            currency_symbol: "€".to_string(),
        }
    }
}

/// Dashboard aggregate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Rows kept in each ranking table.
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

/// Historical price database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Path to the SQLite database.
    pub database_path: String,
    /// Table holding one price per (date, card identity key).
    pub table: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_path: "mtg_historical.db".to_string(),
            table: "mtg_card_prices_historical".to_string(),
        }
    }
}

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.liquidity.low_max_days, 30);
        assert_eq!(config.format.percentage_precision, 0);
        assert_eq!(config.analytics.top_n, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"analytics": {"top_n": 5}}"#).unwrap();
        assert_eq!(config.analytics.top_n, 5);
        assert_eq!(config.liquidity.high_max_days, 7);
        assert_eq!(config.history.table, "mtg_card_prices_historical");
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config = Config::from_json_str(r#"{"liquidity": {"low_max_days": 45}}"#).unwrap();
        assert_eq!(config.liquidity.very_high_max_days, 1);
        assert_eq!(config.liquidity.moderate_max_days, 14);
        assert_eq!(config.liquidity.low_max_days, 45);

        let config = Config::from_json_str(r#"{"logging": {"format": "pretty"}}"#).unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn test_rejects_unordered_liquidity() {
        let json = r#"{"liquidity": {"very_high_max_days": 1, "high_max_days": 20,
            "moderate_max_days": 14, "low_max_days": 30}}"#;
        let err = Config::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let mut config = Config::default();
        config.history.table = "prices; DROP TABLE x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let mut config = Config::default();
        config.analytics.top_n = 0;
        assert!(config.validate().is_err());
    }
}
