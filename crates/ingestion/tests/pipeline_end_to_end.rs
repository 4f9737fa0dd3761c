use approx::assert_relative_eq;
use cardfolio_core::{CanonicalValue, Config, LiquidityTier, ListedStatus};
use cardfolio_ingestion::{run_pipeline, EnrichmentStats, InMemorySource};

const HOLDINGS: &str = r#"[
    {
        "card_name": "Black Lotus",
        "card_set": "Alpha",
        "foil": "No",
        "date": "2024-01-10",
        "last_sold_date": "2024-01-09",
        "efficient_price": "€1.234,56",
        "price_diff_d7": "5%",
        "listed_stock": "0"
    },
    {
        "card_set": "Alpha",
        "foil": "Yes",
        "amount": 2,
        "efficient_price": "N/A",
        "listed_stock": "3"
    },
    {
        "card_name": "Sol Ring",
        "card_set": "Commander",
        "amount": "4",
        "date": "2024-01-10 08:00:00",
        "last_sold_date": "2023-11-01",
        "price_growth": -150,
        "listed_stock": 12.0
    }
]"#;

const REFERENCES: &str = r#"[
    {
        "card_name": "Sol Ring",
        "card_set": "Commander",
        "rarity": "Uncommon",
        "reserved_list": "No",
        "set_release_date": "2011-06-17",
        "frame_era": "N/A"
    }
]"#;

fn source() -> InMemorySource {
    InMemorySource::new()
        .with_records_json("Alice", HOLDINGS)
        .unwrap()
        .with_references_json(REFERENCES)
        .unwrap()
}

#[test]
fn test_black_lotus_without_reference() {
    let source = source();
    let records = run_pipeline(&source, &source, "alice", &Config::default()).unwrap();
    let lotus = &records[0];

    assert_eq!(lotus.card_identity_key, "Black Lotus - Alpha - Regular");
    assert_relative_eq!(lotus.efficient_price.as_f64().unwrap(), 1234.56, epsilon = 1e-9);
    assert_relative_eq!(lotus.price_diff_d7.as_f64().unwrap(), 0.05, epsilon = 1e-12);
    assert_eq!(lotus.liquidity_tier, LiquidityTier::VeryHigh);
    assert_eq!(lotus.liquidity_tier.label(), "Very High");
    assert_eq!(lotus.listed_status, ListedStatus::NotListed);
    assert!(!lotus.reference_matched);
    for field in ["rarity", "reserved_list", "collection_number", "set_release_date", "frame_era", "set_type"] {
        assert_eq!(lotus.get(field), Some(CanonicalValue::Missing), "{field}");
    }
}

#[test]
fn test_row_without_name_is_kept() {
    let source = source();
    let records = run_pipeline(&source, &source, "alice", &Config::default()).unwrap();
    assert_eq!(records.len(), 3);

    let nameless = &records[1];
    assert!(nameless.card_name.is_missing());
    assert_eq!(nameless.card_identity_key, "Alpha - Foil");
    assert_eq!(nameless.amount, CanonicalValue::Count(2));
    assert!(nameless.efficient_price.is_missing());
    assert_eq!(nameless.liquidity_tier, LiquidityTier::NotAvailable);
    assert_eq!(nameless.listed_status, ListedStatus::Listed);
}

#[test]
fn test_reference_join_and_derivations() {
    let source = source();
    let records = run_pipeline(&source, &source, "alice", &Config::default()).unwrap();
    let sol_ring = &records[2];

    assert!(sol_ring.reference_matched);
    assert_eq!(sol_ring.rarity.as_text(), Some("Uncommon"));
    assert!(sol_ring.frame_era.is_missing());
    assert_eq!(sol_ring.amount, CanonicalValue::Count(4));
    assert_relative_eq!(sol_ring.price_growth.as_f64().unwrap(), -1.5, epsilon = 1e-12);
    // 70 days between last sale and the price date.
    assert_eq!(sol_ring.liquidity_tier, LiquidityTier::VeryLow);
    assert_eq!(sol_ring.listed_status, ListedStatus::Listed);
}

#[test]
fn test_stats_over_run() {
    let source = source();
    let records = run_pipeline(&source, &source, "alice", &Config::default()).unwrap();
    let stats = EnrichmentStats::from_records(&records);

    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.reference_matches, 1);
    assert_eq!(stats.reference_misses, 2);
    assert_eq!(stats.listed_rows, 2);
    assert_eq!(stats.missing_efficient_price, 2);
    assert_eq!(stats.tier_count(LiquidityTier::NotAvailable), 1);
}
