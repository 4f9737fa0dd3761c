//! Record enrichment.
//!
//! Turns each [`RawRecord`] into an [`EnrichedRecord`]: reference attributes
//! are left-joined on `(card_name, card_set)`, every field is normalized,
//! and the identity key, liquidity tier and listed status are derived.
//! A row is never dropped, whatever its content.

use crate::classifier::{classify_listing, LiquidityClassifier};
use crate::normalizer::{
    normalize_count, normalize_date, normalize_optional_text, normalize_percentage, normalize_price,
    normalize_text, raw_datetime,
};
use cardfolio_core::{
    CanonicalValue, Config, EnrichedRecord, RawRecord, RawValue, ReferenceRecord, Result,
};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Separator between the parts of a card identity key.
pub const KEY_SEPARATOR: &str = " - ";

/// Build the composite identity key for a holding.
///
/// Absent name or set parts are skipped; the finish part is always present,
/// so the key is never empty.
pub fn card_identity_key(name: Option<&str>, set: Option<&str>, foil: &RawValue) -> String {
    let finish = if foil.as_text() == Some("Yes") { "Foil" } else { "Regular" };
    [name, set, Some(finish)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// Normalizes holdings and joins them against reference data.
#[derive(Debug, Clone)]
pub struct Enricher {
    /// Reference rows indexed by card name, then set.
    references: HashMap<String, HashMap<String, ReferenceRecord>>,
    /// Number of indexed reference rows.
    reference_count: usize,
    liquidity: LiquidityClassifier,
}

impl Enricher {
    /// Create an enricher, rejecting liquidity boundaries that are not
    /// strictly ascending.
    pub fn try_new(references: &[ReferenceRecord], config: &Config) -> Result<Self> {
        config.liquidity.validate()?;
        Ok(Self::new(references, config))
    }

    /// Create an enricher over the given reference rows.
    ///
    /// If two rows share a `(card_name, card_set)` key the first one wins.
    /// Liquidity boundaries are used as given; see [`Enricher::try_new`].
    pub fn new(references: &[ReferenceRecord], config: &Config) -> Self {
        let mut index: HashMap<String, HashMap<String, ReferenceRecord>> = HashMap::new();
        let mut reference_count = 0;

        for reference in references {
            let by_set = index.entry(reference.card_name.clone()).or_default();
            if by_set.contains_key(&reference.card_set) {
                warn!(
                    card_name = %reference.card_name,
                    card_set = %reference.card_set,
                    "duplicate reference row ignored"
                );
                continue;
            }
            by_set.insert(reference.card_set.clone(), reference.clone());
            reference_count += 1;
        }

        debug!(reference_count, "reference index built");

        Self {
            references: index,
            reference_count,
            liquidity: LiquidityClassifier::new(&config.liquidity),
        }
    }

    /// Number of distinct reference keys.
    pub fn reference_count(&self) -> usize {
        self.reference_count
    }

    /// Find the reference row for a printing.
    pub fn lookup(&self, card_name: &str, card_set: &str) -> Option<&ReferenceRecord> {
        self.references.get(card_name)?.get(card_set)
    }

    /// Enrich a single holding.
    pub fn normalize(&self, raw: &RawRecord) -> EnrichedRecord {
        let card_name = normalize_text(&raw.card_name);
        let card_set = normalize_text(&raw.card_set);

        let reference = match (card_name.as_text(), card_set.as_text()) {
            (Some(name), Some(set)) => self.lookup(name, set),
            _ => None,
        };
        if reference.is_none() {
            trace!(card_name = ?card_name, card_set = ?card_set, "no reference data for holding");
        }
        let attr = |pick: fn(&ReferenceRecord) -> &Option<String>| -> CanonicalValue {
            normalize_optional_text(reference.and_then(|r| pick(r).as_deref()))
        };

        let card_identity_key = card_identity_key(card_name.as_text(), card_set.as_text(), &raw.foil);

        let date = normalize_date(&raw.date);
        let last_sold_date = normalize_date(&raw.last_sold_date);
        let liquidity_tier = self
            .liquidity
            .classify_timestamps(raw_datetime(&raw.date), raw_datetime(&raw.last_sold_date));

        EnrichedRecord {
            amount: normalize_count(&raw.amount),
            language: normalize_text(&raw.language),
            condition: normalize_text(&raw.condition),
            foil: normalize_text(&raw.foil),
            signed: normalize_text(&raw.signed),
            country: normalize_text(&raw.country),
            alerts: normalize_text(&raw.alerts),
            notes: normalize_text(&raw.notes),

            from_price: normalize_price(&raw.from_price),
            trend_price: normalize_price(&raw.trend_price),
            ms_trend_price: normalize_price(&raw.ms_trend_price),
            efficient_price: normalize_price(&raw.efficient_price),
            conservative_price: normalize_price(&raw.conservative_price),
            value_price: normalize_price(&raw.value_price),
            purchase_price: normalize_price(&raw.purchase_price),
            listed_price: normalize_price(&raw.listed_price),
            total_efficient_value: normalize_price(&raw.total_efficient_value),
            total_conservative_value: normalize_price(&raw.total_conservative_value),

            price_growth: normalize_percentage(&raw.price_growth),
            equity_in_country: normalize_percentage(&raw.equity_in_country),
            equity_on_cardmarket: normalize_percentage(&raw.equity_on_cardmarket),
            price_diff_d7: normalize_percentage(&raw.price_diff_d7),

            listed_stock: normalize_count(&raw.listed_stock),
            total_stock: normalize_count(&raw.total_stock),
            country_stock: normalize_count(&raw.country_stock),

            rarity: attr(|r| &r.rarity),
            reserved_list: attr(|r| &r.reserved_list),
            collection_number: attr(|r| &r.collection_number),
            set_release_date: attr(|r| &r.set_release_date),
            frame_era: attr(|r| &r.frame_era),
            set_type: attr(|r| &r.set_type),

            card_identity_key,
            liquidity_tier,
            listed_status: classify_listing(&raw.listed_stock),
            reference_matched: reference.is_some(),

            card_name,
            card_set,
            date,
            last_sold_date,
        }
    }

    /// Lazily enrich a batch of holdings borrowed from the caller.
    pub fn normalize_all<'a>(&'a self, rows: &'a [RawRecord]) -> EnrichedRecords<'a> {
        EnrichedRecords {
            enricher: Cow::Borrowed(self),
            rows,
        }
    }
}

/// Enrich a batch of holdings against a batch of reference rows.
///
/// The returned sequence is lazy and can be iterated any number of times.
/// Fails if the liquidity boundaries in `config` are invalid.
pub fn normalize_all<'a>(
    rows: &'a [RawRecord],
    references: &[ReferenceRecord],
    config: &Config,
) -> Result<EnrichedRecords<'a>> {
    Ok(EnrichedRecords {
        enricher: Cow::Owned(Enricher::try_new(references, config)?),
        rows,
    })
}

/// A lazy, restartable sequence of enriched holdings.
///
/// Records are derived on demand from the borrowed raw rows; nothing is
/// consumed, so [`EnrichedRecords::iter`] can be called repeatedly.
#[derive(Debug, Clone)]
pub struct EnrichedRecords<'a> {
    enricher: Cow<'a, Enricher>,
    rows: &'a [RawRecord],
}

impl<'a> EnrichedRecords<'a> {
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            enricher: &self.enricher,
            rows: self.rows.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The enricher backing this sequence.
    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }
}

impl<'s, 'a> IntoIterator for &'s EnrichedRecords<'a> {
    type Item = EnrichedRecord;
    type IntoIter = Iter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`EnrichedRecords`] sequence.
#[derive(Debug, Clone)]
pub struct Iter<'s> {
    enricher: &'s Enricher,
    rows: std::slice::Iter<'s, RawRecord>,
}

impl Iterator for Iter<'_> {
    type Item = EnrichedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|raw| self.enricher.normalize(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cardfolio_core::{LiquidityTier, ListedStatus};

    fn black_lotus() -> RawRecord {
        RawRecord {
            card_name: "Black Lotus".into(),
            card_set: "Alpha".into(),
            foil: "No".into(),
            date: "2024-01-10".into(),
            last_sold_date: "2024-01-09".into(),
            efficient_price: "€1.234,56".into(),
            price_diff_d7: "5%".into(),
            listed_stock: "0".into(),
            ..Default::default()
        }
    }

    fn alpha_reference() -> ReferenceRecord {
        ReferenceRecord {
            card_name: "Black Lotus".into(),
            card_set: "Alpha".into(),
            rarity: Some("Rare".into()),
            reserved_list: Some("Yes".into()),
            set_release_date: Some("1993-08-05".into()),
            frame_era: Some("N/A".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_identity_key() {
        assert_eq!(
            card_identity_key(Some("Black Lotus"), Some("Alpha"), &"No".into()),
            "Black Lotus - Alpha - Regular"
        );
        assert_eq!(
            card_identity_key(Some("Mox Pearl"), Some("Beta"), &"Yes".into()),
            "Mox Pearl - Beta - Foil"
        );
        assert_eq!(card_identity_key(None, Some("Alpha"), &RawValue::Missing), "Alpha - Regular");
        assert_eq!(card_identity_key(None, None, &"yes".into()), "Regular");
    }

    #[test]
    fn test_end_to_end_without_reference() {
        let enricher = Enricher::new(&[], &Config::default());
        let record = enricher.normalize(&black_lotus());

        assert_eq!(record.card_identity_key, "Black Lotus - Alpha - Regular");
        assert_relative_eq!(record.efficient_price.as_f64().unwrap(), 1234.56, epsilon = 1e-9);
        match record.price_diff_d7 {
            CanonicalValue::Percentage(v) => assert_relative_eq!(v, 0.05, epsilon = 1e-12),
            ref other => panic!("expected percentage, got {other:?}"),
        }
        assert_eq!(record.liquidity_tier, LiquidityTier::VeryHigh);
        assert_eq!(record.listed_status, ListedStatus::NotListed);
        assert!(!record.reference_matched);
        for value in [
            &record.rarity,
            &record.reserved_list,
            &record.collection_number,
            &record.set_release_date,
            &record.frame_era,
            &record.set_type,
        ] {
            assert!(value.is_missing());
        }
    }

    #[test]
    fn test_reference_join() {
        let enricher = Enricher::new(&[alpha_reference()], &Config::default());
        let record = enricher.normalize(&black_lotus());

        assert!(record.reference_matched);
        assert_eq!(record.rarity, CanonicalValue::Text("Rare".into()));
        assert_eq!(record.reserved_list, CanonicalValue::Text("Yes".into()));
        // "N/A" in reference data is still missing.
        assert!(record.frame_era.is_missing());
        assert!(record.set_type.is_missing());
    }

    #[test]
    fn test_join_is_exact_on_name_and_set() {
        let enricher = Enricher::new(&[alpha_reference()], &Config::default());
        let mut raw = black_lotus();
        raw.card_set = "Beta".into();
        let record = enricher.normalize(&raw);
        assert!(!record.reference_matched);
        assert!(record.rarity.is_missing());
    }

    #[test]
    fn test_duplicate_reference_first_wins() {
        let mut second = alpha_reference();
        second.rarity = Some("Common".into());
        let enricher = Enricher::new(&[alpha_reference(), second], &Config::default());
        assert_eq!(enricher.reference_count(), 1);
        assert_eq!(
            enricher.lookup("Black Lotus", "Alpha").and_then(|r| r.rarity.as_deref()),
            Some("Rare")
        );
    }

    #[test]
    fn test_missing_name_row_is_kept() {
        let raw = RawRecord {
            card_set: "Alpha".into(),
            foil: "Yes".into(),
            efficient_price: "garbage".into(),
            ..Default::default()
        };
        let records =
            normalize_all(std::slice::from_ref(&raw), &[alpha_reference()], &Config::default()).unwrap();
        let out: Vec<_> = records.iter().collect();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].card_identity_key, "Alpha - Foil");
        assert!(out[0].card_name.is_missing());
        assert!(out[0].efficient_price.is_missing());
        assert_eq!(out[0].liquidity_tier, LiquidityTier::NotAvailable);
        assert!(!out[0].reference_matched);
    }

    #[test]
    fn test_all_missing_row_is_kept() {
        let enricher = Enricher::new(&[], &Config::default());
        let record = enricher.normalize(&RawRecord::default());
        assert_eq!(record.card_identity_key, "Regular");
        assert!(record.amount.is_missing());
        assert_eq!(record.listed_status, ListedStatus::NotListed);
    }

    #[test]
    fn test_normalize_all_is_restartable() {
        let rows = vec![black_lotus(), RawRecord::default(), black_lotus()];
        let enricher = Enricher::new(&[alpha_reference()], &Config::default());
        let records = enricher.normalize_all(&rows);

        assert_eq!(records.len(), 3);
        assert_eq!(records.iter().len(), 3);
        let first: Vec<_> = records.iter().collect();
        let second: Vec<_> = (&records).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first[1].card_identity_key, "Regular");
    }

    #[test]
    fn test_config_boundaries_reach_classifier() {
        let mut config = Config::default();
        config.liquidity.very_high_max_days = 0;
        let enricher = Enricher::new(&[], &config);
        let record = enricher.normalize(&black_lotus());
        assert_eq!(record.liquidity_tier, LiquidityTier::High);
    }

    #[test]
    fn test_every_field_is_addressable() {
        let record = Enricher::new(&[], &Config::default()).normalize(&black_lotus());
        for field in EnrichedRecord::FIELDS {
            assert!(record.get(field).is_some(), "{field} not addressable");
        }
        assert_eq!(
            record.get("card_name_set"),
            Some(CanonicalValue::Text(record.card_identity_key.clone()))
        );
        assert_eq!(record.get("purchase_date"), None);
    }

    #[test]
    fn test_liquidity_uses_time_of_day() {
        let enricher = Enricher::new(&[], &Config::default());

        let mut raw = black_lotus();
        raw.date = "2024-01-10 00:00:00".into();
        raw.last_sold_date = "2024-01-08 12:00:00".into();
        let record = enricher.normalize(&raw);
        assert_eq!(record.liquidity_tier, LiquidityTier::VeryHigh);
        assert_eq!(
            record.last_sold_date,
            CanonicalValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
        );

        raw.date = "2024-01-10 08:00:00".into();
        raw.last_sold_date = "2024-01-10 20:00:00".into();
        assert_eq!(enricher.normalize(&raw).liquidity_tier, LiquidityTier::NotAvailable);
    }

    #[test]
    fn test_fractional_stock_is_listed_without_count() {
        let mut raw = black_lotus();
        raw.listed_stock = "2.5".into();
        raw.amount = "2.5".into();
        let record = Enricher::new(&[], &Config::default()).normalize(&raw);
        assert_eq!(record.listed_status, ListedStatus::Listed);
        assert!(record.listed_stock.is_missing());
        assert!(record.amount.is_missing());
    }

    #[test]
    fn test_unordered_boundaries_rejected() {
        let mut config = Config::default();
        config.liquidity.high_max_days = 0;
        assert!(Enricher::try_new(&[], &config).is_err());
        assert!(normalize_all(&[black_lotus()], &[], &config).is_err());
        assert!(Enricher::try_new(&[], &Config::default()).is_ok());
    }
}
