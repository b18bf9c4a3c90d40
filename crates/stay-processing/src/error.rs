//! Custom error types for the listings analytics core.
//!
//! This module provides the error hierarchy using `thiserror` for better
//! error handling and context throughout the pipeline.
//!
//! Errors are serializable so a UI shell can display them directly; the
//! pipeline itself never reports partial successes (see `preprocess`).

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for listing extraction, preprocessing and aggregation.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// A required field was absent from a raw listing record.
    #[error("Required field '{0}' is missing from listing record")]
    MissingField(String),

    /// A field was present in a raw listing record but could not be read
    /// as the expected scalar shape. Distinct from absence.
    #[error("Field '{field}' is malformed: {reason}")]
    MalformedField { field: String, reason: String },

    /// Column was not found in the listing table.
    #[error("Column '{0}' not found in listing table")]
    ColumnNotFound(String),

    /// Whole-column type coercion failed during preprocessing.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// Imputation failed for a column.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// No non-null values were available to compute a fill statistic.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No listing table has been fetched yet.
    #[error("No listing data loaded")]
    NoDataLoaded,

    /// The listing table exists but has not been preprocessed.
    #[error("Listing table has not been preprocessed")]
    NotPreprocessed,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    ///
    /// These codes let a frontend distinguish error types without parsing
    /// messages (e.g. prompting a re-fetch on `NO_DATA_LOADED`).
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MalformedField { .. } => "MALFORMED_FIELD",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::NotPreprocessed => "NOT_PREPROCESSED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check whether this is a record-level integrity error (flattener),
    /// as opposed to a table-level error (preprocessor/aggregator).
    pub fn is_record_error(&self) -> bool {
        match self {
            Self::MissingField(_) | Self::MalformedField { .. } => true,
            Self::WithContext { source, .. } => source.is_record_error(),
            _ => false,
        }
    }

    /// Check if this error is recoverable by user action rather than a
    /// data or pipeline failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoDataLoaded | Self::NotPreprocessed | Self::InvalidConfig(_)
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to handle in a frontend.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::MissingField("host.host_id".to_string()).error_code(),
            "MISSING_FIELD"
        );
        assert_eq!(ProcessingError::NoDataLoaded.error_code(), "NO_DATA_LOADED");
    }

    #[test]
    fn test_is_record_error() {
        assert!(ProcessingError::MissingField("price".to_string()).is_record_error());
        assert!(
            ProcessingError::MalformedField {
                field: "minimum_nights".to_string(),
                reason: "not an integer".to_string(),
            }
            .is_record_error()
        );
        assert!(!ProcessingError::NoDataLoaded.is_record_error());
        // Context wrapping preserves the record-error classification
        assert!(
            ProcessingError::MissingField("price".to_string())
                .with_context("record 3")
                .is_record_error()
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(ProcessingError::NoDataLoaded.is_recoverable());
        assert!(ProcessingError::NotPreprocessed.is_recoverable());
        assert!(!ProcessingError::NoValidValues("Security_deposit".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("Price".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Price"));
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::MissingField("address.country".to_string())
            .with_context("While flattening record 12");
        assert!(error.to_string().contains("While flattening record 12"));
        assert_eq!(error.error_code(), "MISSING_FIELD"); // Preserves original code
    }
}
