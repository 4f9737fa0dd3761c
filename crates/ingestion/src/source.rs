//! Record and reference sources.
//!
//! The pipeline does not know how rows are fetched; callers plug in a
//! [`RecordSource`] and a [`ReferenceSource`]. [`InMemorySource`] serves
//! rows that are already materialized.

use cardfolio_core::{Error, RawRecord, ReferenceRecord, Result};
use std::collections::HashMap;

/// Yields the raw holdings of one user.
pub trait RecordSource {
    fn fetch_records(&self, user: &str) -> Result<Vec<RawRecord>>;
}

/// Yields the reference table.
pub trait ReferenceSource {
    fn fetch_references(&self) -> Result<Vec<ReferenceRecord>>;
}

/// Rows held in memory, keyed by user name (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: HashMap<String, Vec<RawRecord>>,
    references: Vec<ReferenceRecord>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the holdings of a user.
    pub fn with_records(mut self, user: &str, records: Vec<RawRecord>) -> Self {
        self.records.insert(user.to_lowercase(), records);
        self
    }

    /// Set the reference table.
    pub fn with_references(mut self, references: Vec<ReferenceRecord>) -> Self {
        self.references = references;
        self
    }

    /// Register a user's holdings from a JSON array of row objects.
    pub fn with_records_json(self, user: &str, json: &str) -> Result<Self> {
        let records: Vec<RawRecord> = serde_json::from_str(json)?;
        Ok(self.with_records(user, records))
    }

    /// Set the reference table from a JSON array of row objects.
    pub fn with_references_json(self, json: &str) -> Result<Self> {
        let references: Vec<ReferenceRecord> = serde_json::from_str(json)?;
        Ok(self.with_references(references))
    }
}

impl RecordSource for InMemorySource {
    fn fetch_records(&self, user: &str) -> Result<Vec<RawRecord>> {
        self.records
            .get(&user.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::source_unavailable("records", format!("user {user:?} not found")))
    }
}

impl ReferenceSource for InMemorySource {
    fn fetch_references(&self) -> Result<Vec<ReferenceRecord>> {
        Ok(self.references.clone())
    }
}
