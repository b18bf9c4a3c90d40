//! Listing Analytics Core
//!
//! The data backbone of an interactive analytics dashboard over a
//! fixed-schema short-term-rental listings dataset, built with Rust and
//! Polars.
//!
//! # Overview
//!
//! This library provides the full listing data pipeline:
//!
//! - **Flattening**: raw nested listing documents → one flat row of named
//!   scalar fields each, with required/optional lookup semantics and a
//!   configurable bad-record policy
//! - **Preprocessing**: whole-table type coercion, mean/mode imputation and
//!   blank-text normalization, all-or-nothing per invocation
//! - **Aggregation**: the six grouped summary tables behind the
//!   advanced-analysis views
//! - **Filtering & projection**: user-driven row predicates and the map
//!   marker records for the geospatial view
//! - **Session lifecycle**: an explicit state object owning the
//!   absent → fetched-raw → preprocessed table phases
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stay_processing::{PipelineConfig, SessionState};
//!
//! // Records come from an already-connected document store as an iterable
//! // of serde_json::Value documents.
//! let records: Vec<serde_json::Value> = load_listing_dump("listings.json")?;
//!
//! let mut session = SessionState::new(PipelineConfig::default());
//! let fetched = session.fetch(records)?;
//! println!("fetched {} listings", fetched.summary.row_count);
//!
//! session.preprocess()?;
//! let views = session.aggregate()?;
//! println!("{}", views.country_mean_price);
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`error::Result`]. Record-level integrity
//! errors ([`ProcessingError::MissingField`],
//! [`ProcessingError::MalformedField`]) are distinct from table-level ones,
//! and preprocessing never publishes a partial result.

pub mod aggregate;
pub mod columns;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod geo;
pub mod imputers;
pub mod preprocess;
pub mod session;
pub mod utils;

// Re-exports for convenient access
pub use aggregate::{
    AggregateViews, country_availability_mean, country_mean_price, listing_count_by_property,
    preferred_property_by_country, property_type_mean_price, room_type_property_mean_price,
};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder, RecordErrorPolicy};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use filter::{ListingFilter, listings_per_country, top_hosts};
pub use flatten::{Extraction, ListingRow, extract_listings, flatten, rows_to_dataframe};
pub use geo::{MapPoint, map_points};
pub use preprocess::preprocess;
pub use session::{ColumnInfo, FetchOutcome, LoadedTable, SessionState, TableSummary};
