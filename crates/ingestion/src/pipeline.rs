//! End-to-end pipeline run: fetch, enrich, report.

use crate::enricher::Enricher;
use crate::source::{RecordSource, ReferenceSource};
use crate::stats::EnrichmentStats;
use cardfolio_core::{Config, EnrichedRecord, Error, Result};
use tracing::{debug, error, info};

/// Any failure from a source is surfaced as `SourceUnavailable`.
fn unavailable(source_name: &str, err: Error) -> Error {
    match err {
        e @ Error::SourceUnavailable { .. } => e,
        other => Error::source_unavailable(source_name, other.to_string()),
    }
}

/// Fetch a user's holdings and the reference table, then enrich every row.
///
/// Either source failing aborts the run with `Error::SourceUnavailable` and
/// no records; per-field problems never fail the run.
pub fn run_pipeline(
    records: &dyn RecordSource,
    references: &dyn ReferenceSource,
    user: &str,
    config: &Config,
) -> Result<Vec<EnrichedRecord>> {
    config.validate()?;

    let raw_rows = records.fetch_records(user).map_err(|e| {
        error!(user, error = %e, "failed to fetch holdings");
        unavailable("records", e)
    })?;
    let reference_rows = references.fetch_references().map_err(|e| {
        error!(error = %e, "failed to fetch reference data");
        unavailable("references", e)
    })?;

    let enricher = Enricher::new(&reference_rows, config);
    let enriched: Vec<EnrichedRecord> = enricher.normalize_all(&raw_rows).iter().collect();

    let stats = EnrichmentStats::from_records(&enriched);
    debug!(
        reference_matches = stats.reference_matches,
        reference_misses = stats.reference_misses,
        missing_efficient_price = stats.missing_efficient_price,
        listed_rows = stats.listed_rows,
        "enrichment stats"
    );
    info!(user, rows = enriched.len(), "pipeline run complete");

    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use cardfolio_core::{RawRecord, ReferenceRecord};

    struct BrokenReferences;

    impl ReferenceSource for BrokenReferences {
        fn fetch_references(&self) -> Result<Vec<ReferenceRecord>> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "glossary sheet timed out",
            )))
        }
    }

    fn holdings() -> InMemorySource {
        InMemorySource::new().with_records(
            "alice",
            vec![
                RawRecord {
                    card_name: "Sol Ring".into(),
                    card_set: "Alpha".into(),
                    ..Default::default()
                },
                RawRecord::default(),
            ],
        )
    }

    #[test]
    fn test_run_pipeline() {
        let source = holdings();
        let records = run_pipeline(&source, &source, "alice", &Config::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].card_identity_key, "Sol Ring - Alpha - Regular");
    }

    #[test]
    fn test_reference_failure_yields_no_data() {
        let source = holdings();
        let err = run_pipeline(&source, &BrokenReferences, "alice", &Config::default()).unwrap_err();
        match err {
            Error::SourceUnavailable { source_name, reason } => {
                assert_eq!(source_name, "references");
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_user_yields_no_data() {
        let source = holdings();
        let err = run_pipeline(&source, &source, "mallory", &Config::default()).unwrap_err();
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let source = holdings();
        let mut config = Config::default();
        config.analytics.top_n = 0;
        let err = run_pipeline(&source, &source, "alice", &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
