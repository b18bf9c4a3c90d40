//! Configuration types for the listing pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Policy for handling a record that fails flattening.
///
/// The source data is assumed clean enough that aborting on the first bad
/// record is the safe default; `Skip` trades completeness for resilience and
/// surfaces the skipped count in the extraction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorPolicy {
    /// Abort extraction on the first record-level integrity error.
    #[default]
    Abort,
    /// Skip bad records and report how many were skipped.
    Skip,
}

/// Configuration for the listing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use stay_processing::config::{PipelineConfig, RecordErrorPolicy};
///
/// let config = PipelineConfig::builder()
///     .record_error_policy(RecordErrorPolicy::Skip)
///     .min_reviews_for_preference(50)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How the flattener reacts to a bad record.
    /// Default: Abort
    pub record_error_policy: RecordErrorPolicy,

    /// Minimum review count for a listing to take part in the
    /// preferred-property-per-country view.
    /// Default: 100
    pub min_reviews_for_preference: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            record_error_policy: RecordErrorPolicy::default(),
            min_reviews_for_preference: 100,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.min_reviews_for_preference < 0 {
            return Err(ConfigValidationError::NegativeReviewCutoff(
                self.min_reviews_for_preference,
            ));
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid review cutoff: {0} (must not be negative)")]
    NegativeReviewCutoff(i64),
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn record_error_policy(mut self, policy: RecordErrorPolicy) -> Self {
        self.config.record_error_policy = policy;
        self
    }

    pub fn min_reviews_for_preference(mut self, cutoff: i64) -> Self {
        self.config.min_reviews_for_preference = cutoff;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.record_error_policy, RecordErrorPolicy::Abort);
        assert_eq!(config.min_reviews_for_preference, 100);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::builder()
            .record_error_policy(RecordErrorPolicy::Skip)
            .min_reviews_for_preference(50)
            .build()
            .unwrap();
        assert_eq!(config.record_error_policy, RecordErrorPolicy::Skip);
        assert_eq!(config.min_reviews_for_preference, 50);
    }

    #[test]
    fn test_negative_cutoff_rejected() {
        let result = PipelineConfig::builder()
            .min_reviews_for_preference(-1)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PipelineConfig::builder()
            .record_error_policy(RecordErrorPolicy::Skip)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("skip"));
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record_error_policy, RecordErrorPolicy::Skip);
    }
}
