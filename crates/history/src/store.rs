//! SQLite-backed reader for the historical price table.
//!
//! The table holds one row per (date, card identity key) with the day's
//! `efficient_price`. Values are stored the way the exporter wrote them, so
//! they go through the same normalizers as live holdings.

use crate::series::{PricePoint, PriceSeries};
use cardfolio_core::config::HistoryConfig;
use cardfolio_core::{EnrichedRecord, Error, RawValue, Result};
use cardfolio_ingestion::{normalize_date, normalize_price};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

fn db_error(err: rusqlite::Error) -> Error {
    Error::database(err.to_string())
}

fn raw_value(value: Value) -> RawValue {
    match value {
        Value::Null | Value::Blob(_) => RawValue::Missing,
        Value::Integer(i) => RawValue::from(i),
        Value::Real(f) => RawValue::from(f),
        Value::Text(s) => RawValue::from(s),
    }
}

/// Decode `(date, card_name_set, efficient_price)`; `None` if unusable.
fn decode_row(row: &Row<'_>) -> rusqlite::Result<Option<(String, PricePoint)>> {
    let date = normalize_date(&raw_value(row.get(0)?));
    let key: Option<String> = row.get(1)?;
    let price = normalize_price(&raw_value(row.get(2)?));

    Ok(match (date.as_date(), key, price.as_f64()) {
        (Some(date), Some(key), Some(price)) => Some((key, PricePoint { date, price })),
        _ => None,
    })
}

/// Read-only access to historical prices.
pub struct HistoryStore {
    conn: Connection,
    table: String,
}

impl HistoryStore {
    /// Open the configured database read-only.
    pub fn open(config: &HistoryConfig) -> Result<Self> {
        let conn = Connection::open_with_flags(
            &config.database_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(db_error)?;
        debug!(path = %config.database_path, table = %config.table, "opened price history");
        Self::from_connection(conn, &config.table)
    }

    /// Wrap an existing connection. The table name must be a plain identifier.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::config(format!("invalid history table name {table:?}")));
        }
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Price series for one card identity key.
    pub fn series(&self, key: &str) -> Result<PriceSeries> {
        let sql = format!(
            "SELECT date, card_name_set, efficient_price FROM {} \
             WHERE card_name_set = ?1 ORDER BY date",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql).map_err(db_error)?;
        let mut rows = stmt.query(params![key]).map_err(db_error)?;

        let mut series = PriceSeries::new(key);
        let mut skipped = 0usize;
        while let Some(row) = rows.next().map_err(db_error)? {
            match decode_row(row).map_err(db_error)? {
                Some((_, point)) => series.push(point),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            trace!(key, skipped, "skipped unusable history rows");
        }
        Ok(series)
    }

    /// Series for every identity key present in `records`.
    ///
    /// Keys with no history get no entry.
    pub fn series_for(&self, records: &[EnrichedRecord]) -> Result<BTreeMap<String, PriceSeries>> {
        let wanted: BTreeSet<&str> = records.iter().map(|r| r.card_identity_key.as_str()).collect();

        let sql = format!(
            "SELECT date, card_name_set, efficient_price FROM {} ORDER BY date, card_name_set",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql).map_err(db_error)?;
        let mut rows = stmt.query([]).map_err(db_error)?;

        let mut out: BTreeMap<String, PriceSeries> = BTreeMap::new();
        let mut skipped = 0usize;
        while let Some(row) = rows.next().map_err(db_error)? {
            let Some((key, point)) = decode_row(row).map_err(db_error)? else {
                skipped += 1;
                continue;
            };
            if !wanted.contains(key.as_str()) {
                continue;
            }
            out.entry(key.clone())
                .or_insert_with(|| PriceSeries::new(key))
                .push(point);
        }
        debug!(series = out.len(), skipped, "loaded price history");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cardfolio_core::{Config, RawRecord};
    use cardfolio_ingestion::Enricher;

    const TABLE: &str = "mtg_card_prices_historical";

    fn store() -> HistoryStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE mtg_card_prices_historical (
                date TEXT,
                card_name_set TEXT,
                efficient_price
            );
            INSERT INTO mtg_card_prices_historical VALUES
                ('2024-05-02', 'Black Lotus - Alpha - Regular', '€12.000,00'),
                ('2024-05-01', 'Black Lotus - Alpha - Regular', 10000.0),
                ('2024-05-03', 'Black Lotus - Alpha - Regular', 'N/A'),
                ('2024-05-03 00:00:00', 'Sol Ring - Alpha - Regular', 2),
                ('not a date', 'Sol Ring - Alpha - Regular', 3),
                ('2024-05-01', 'Island - Promo - Regular', '0,05'),
                ('2024-05-01', NULL, 7.5);
            "#,
        )
        .unwrap();
        HistoryStore::from_connection(conn, TABLE).unwrap()
    }

    #[test]
    fn test_series() {
        let series = store().series("Black Lotus - Alpha - Regular").unwrap();
        assert_eq!(series.len(), 2);
        let stats = series.stats().unwrap();
        assert_relative_eq!(stats.lowest, 10000.0);
        assert_relative_eq!(stats.highest, 12000.0);
        assert_relative_eq!(stats.current, 12000.0);
        assert_relative_eq!(stats.average, 11000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let series = store().series("Mox Ruby - Alpha - Regular").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_series_for_holdings() {
        let rows = [
            RawRecord {
                card_name: "Black Lotus".into(),
                card_set: "Alpha".into(),
                ..Default::default()
            },
            RawRecord {
                card_name: "Sol Ring".into(),
                card_set: "Alpha".into(),
                foil: "No".into(),
                ..Default::default()
            },
            RawRecord {
                card_name: "Mox Ruby".into(),
                card_set: "Alpha".into(),
                ..Default::default()
            },
        ];
        let records: Vec<EnrichedRecord> =
            Enricher::new(&[], &Config::default()).normalize_all(&rows).iter().collect();

        let all = store().series_for(&records).unwrap();
        let keys: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Black Lotus - Alpha - Regular", "Sol Ring - Alpha - Regular"]);
        assert_eq!(all["Sol Ring - Alpha - Regular"].len(), 1);
    }

    #[test]
    fn test_invalid_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        let err = HistoryStore::from_connection(conn, "prices; DROP TABLE x").err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_table_is_database_error() {
        let conn = Connection::open_in_memory().unwrap();
        let store = HistoryStore::from_connection(conn, "absent").unwrap();
        assert!(matches!(store.series("x"), Err(Error::Database(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let config = HistoryConfig {
            database_path: "/nonexistent/dir/history.db".to_string(),
            ..Default::default()
        };
        assert!(matches!(HistoryStore::open(&config), Err(Error::Database(_))));
    }
}
