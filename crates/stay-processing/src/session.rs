//! Session-scoped table lifecycle.
//!
//! The listing table moves through a two-phase lifecycle: absent →
//! fetched-raw → preprocessed. [`SessionState`] owns both phases and
//! replaces them wholesale on every transition. A failed preprocess leaves
//! the previously published tables untouched, and a re-fetch discards any
//! earlier preprocessed table.
//!
//! The session is single-consumer: exactly one caller mutates it at a
//! time, and readers only see fully-settled snapshots. A UI shell that
//! needs shared access wraps the whole state in its own lock.

use crate::aggregate::AggregateViews;
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::flatten::extract_listings;
use crate::preprocess::preprocess;
use chrono::Utc;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Information about a single column of a loaded listing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

/// Metadata about a loaded listing table, cheap enough to hand to a UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
    /// Unix timestamp of when the table was installed.
    pub loaded_at: i64,
}

impl TableSummary {
    fn of(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                null_count: col.null_count(),
            })
            .collect();
        Self {
            row_count: df.height(),
            column_count: df.width(),
            columns,
            loaded_at: Utc::now().timestamp(),
        }
    }
}

/// A listing table bundled with its cached metadata.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: DataFrame,
    pub summary: TableSummary,
}

impl LoadedTable {
    fn new(table: DataFrame) -> Self {
        let summary = TableSummary::of(&table);
        Self { table, summary }
    }
}

/// Outcome of a fetch, for display by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub summary: TableSummary,
    /// Records dropped under the skip policy; 0 under abort.
    pub skipped_records: usize,
}

/// Owns the listing tables for one analytics session.
#[derive(Debug)]
pub struct SessionState {
    config: PipelineConfig,
    raw: Option<LoadedTable>,
    processed: Option<LoadedTable>,
}

impl SessionState {
    /// Create an empty session.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            raw: None,
            processed: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The fetched-raw table, if any.
    pub fn raw(&self) -> Option<&LoadedTable> {
        self.raw.as_ref()
    }

    /// The preprocessed table, if any.
    pub fn processed(&self) -> Option<&LoadedTable> {
        self.processed.as_ref()
    }

    pub fn is_fetched(&self) -> bool {
        self.raw.is_some()
    }

    pub fn is_preprocessed(&self) -> bool {
        self.processed.is_some()
    }

    /// Fetch: flatten a full record iterable into a new raw table.
    ///
    /// Replaces any prior raw table and discards any prior preprocessed
    /// table; the session falls back to the fetched-raw phase.
    pub fn fetch<I>(&mut self, records: I) -> Result<FetchOutcome>
    where
        I: IntoIterator<Item = Value>,
    {
        let extraction = extract_listings(records, self.config.record_error_policy)?;
        let loaded = LoadedTable::new(extraction.table);
        let outcome = FetchOutcome {
            summary: loaded.summary.clone(),
            skipped_records: extraction.skipped,
        };

        info!(
            "Fetched listing table: {} rows ({} records skipped)",
            outcome.summary.row_count, outcome.skipped_records
        );
        self.raw = Some(loaded);
        self.processed = None;
        Ok(outcome)
    }

    /// Preprocess the fetched-raw table and publish the result.
    ///
    /// On failure nothing is published: the raw table and any previously
    /// preprocessed table stay as they were.
    pub fn preprocess(&mut self) -> Result<&TableSummary> {
        let raw = self.raw.as_ref().ok_or(ProcessingError::NoDataLoaded)?;
        let processed = preprocess(&raw.table)?;
        let loaded = self.processed.insert(LoadedTable::new(processed));
        Ok(&loaded.summary)
    }

    /// Compute the advanced-analysis views from the preprocessed table.
    pub fn aggregate(&self) -> Result<AggregateViews> {
        let processed = self
            .processed
            .as_ref()
            .ok_or(ProcessingError::NotPreprocessed)?;
        AggregateViews::compute(&processed.table, self.config.min_reviews_for_preference)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
