//! Configuration for the encoding stage.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults reproduce the ENCal survey setup: the two spellings of
//! "don't know / no answer" plus empty text count as missing, the date column
//! survives constant removal, and seven numeric columns are bucketed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::encoding::{BucketSpec, MISSING_PLACEHOLDER};
use crate::error::ProcessingError;

/// Bucketing applied to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRule {
    pub column: String,
    pub spec: BucketSpec,
}

impl BucketRule {
    pub fn new(column: impl Into<String>, spec: BucketSpec) -> Self {
        Self {
            column: column.into(),
            spec,
        }
    }
}

/// Configuration for the encoding stage.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use encal_processing::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .protect_column("fecha")
///     .drop_column("ola")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Text cells equal to one of these become missing.
    /// Default: `""`, `"NO SABE/NO RESPONDE"`, `"NO SABE/ NO RESPONDE"`
    pub missing_sentinels: Vec<String>,

    /// Range bucketing per column. Rules for absent columns are skipped.
    /// Default: [`default_bucket_rules`]
    pub bucket_rules: Vec<BucketRule>,

    /// Columns never removed as constant.
    /// Default: `["fecha"]`
    pub protected_columns: Vec<String>,

    /// Columns always removed at the constant-removal step.
    /// Default: empty
    pub drop_columns: Vec<String>,

    /// Text that stands in for a missing cell before encoding.
    /// Default: `"NaN"`
    pub missing_placeholder: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            missing_sentinels: default_missing_sentinels(),
            bucket_rules: default_bucket_rules(),
            protected_columns: vec!["fecha".to_string()],
            drop_columns: Vec::new(),
            missing_placeholder: MISSING_PLACEHOLDER.to_string(),
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
        if self.missing_placeholder.is_empty() {
            return Err(ConfigValidationError::EmptyPlaceholder);
        }

        let mut seen = HashSet::new();
        for rule in &self.bucket_rules {
            if !seen.insert(rule.column.as_str()) {
                return Err(ConfigValidationError::DuplicateBucketRule(
                    rule.column.clone(),
                ));
            }
            rule.spec
                .validate(&rule.column)
                .map_err(|e| ConfigValidationError::InvalidBucketRule(e.to_string()))?;
        }

        if let Some(name) = self
            .drop_columns
            .iter()
            .find(|name| self.protected_columns.contains(name))
        {
            return Err(ConfigValidationError::ProtectedAndDropped(name.clone()));
        }

        Ok(())
    }
}

/// Survey answers that carry no information.
pub fn default_missing_sentinels() -> Vec<String> {
    ["", "NO SABE/NO RESPONDE", "NO SABE/ NO RESPONDE"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Range rules for the numeric columns of the ENCal survey.
pub fn default_bucket_rules() -> Vec<BucketRule> {
    let inf = f64::INFINITY;
    let rule = |column: &str, breakpoints: Vec<f64>, labels: &[&str]| {
        BucketRule::new(column, BucketSpec::from_parts(breakpoints, labels))
    };

    vec![
        BucketRule::new("diascita", BucketSpec::days_since_event()),
        rule(
            "antescita",
            vec![0.0, 7.0, 30.0, 90.0, 180.0, 365.0, 720.0, inf],
            &[
                "1 week", "1 month", "3 months", "6 months", "1 year", "2 years", "+2 years",
            ],
        ),
        rule(
            "tmesphoci",
            vec![0.0, 10.0, 20.0, 30.0, 60.0, 120.0, 365.0, inf],
            &["10", "20", "30", "60", "120", "1 year", "+1 year"],
        ),
        rule(
            "antusuario",
            vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0, inf],
            &["1", "5", "10", "20", "50", "100", "+100"],
        ),
        rule(
            "tiempollegar",
            vec![0.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, inf],
            &["5", "10", "20", "30", "60", "120", "+120"],
        ),
        rule(
            "promedio_diario_2024",
            vec![0.0, 100.0, 500.0, 1000.0, 2000.0, 5000.0, inf],
            &["100", "500", "1000", "2000", "5000", "+5000"],
        ),
        rule(
            "FE_FinalNR",
            vec![0.0, 40.0, 80.0, 120.0, 160.0, 200.0, inf],
            &["40", "80", "120", "160", "200", "+240"],
        ),
    ]
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing placeholder must not be empty")]
    EmptyPlaceholder,

    #[error("More than one bucket rule for column '{0}'")]
    DuplicateBucketRule(String),

    #[error("{0}")]
    InvalidBucketRule(String),

    #[error("Column '{0}' is both protected and listed for dropping")]
    ProtectedAndDropped(String),
}

impl From<ConfigValidationError> for ProcessingError {
    fn from(err: ConfigValidationError) -> Self {
        ProcessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
///
/// Unset fields fall back to [`PipelineConfig::default()`].
#[derive(Debug, Default)]
#[must_use]
pub struct PipelineConfigBuilder {
    missing_sentinels: Option<Vec<String>>,
    bucket_rules: Option<Vec<BucketRule>>,
    protected_columns: Option<Vec<String>>,
    drop_columns: Vec<String>,
    missing_placeholder: Option<String>,
}

impl PipelineConfigBuilder {
    /// Replace the sentinel list.
    pub fn missing_sentinels(
        mut self,
        sentinels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.missing_sentinels = Some(sentinels.into_iter().map(Into::into).collect());
        self
    }

    /// Replace all bucket rules.
    pub fn bucket_rules(mut self, rules: Vec<BucketRule>) -> Self {
        self.bucket_rules = Some(rules);
        self
    }

    /// Add or replace the rule for one column.
    pub fn bucket_rule(mut self, column: impl Into<String>, spec: BucketSpec) -> Self {
        let column = column.into();
        let rules = self.bucket_rules.get_or_insert_with(default_bucket_rules);
        rules.retain(|rule| rule.column != column);
        rules.push(BucketRule::new(column, spec));
        self
    }

    /// Replace the protected column set.
    pub fn protected_columns(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.protected_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Add a column to the protected set.
    pub fn protect_column(mut self, column: impl Into<String>) -> Self {
        self.protected_columns
            .get_or_insert_with(|| PipelineConfig::default().protected_columns)
            .push(column.into());
        self
    }

    /// Add a column that is always dropped.
    pub fn drop_column(mut self, column: impl Into<String>) -> Self {
        self.drop_columns.push(column.into());
        self
    }

    /// Set the missing-value placeholder used by the encoder.
    pub fn missing_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.missing_placeholder = Some(placeholder.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            missing_sentinels: self.missing_sentinels.unwrap_or(defaults.missing_sentinels),
            bucket_rules: self.bucket_rules.unwrap_or(defaults.bucket_rules),
            protected_columns: self.protected_columns.unwrap_or(defaults.protected_columns),
            drop_columns: self.drop_columns,
            missing_placeholder: self
                .missing_placeholder
                .unwrap_or(defaults.missing_placeholder),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.missing_sentinels.len(), 3);
        assert_eq!(config.protected_columns, vec!["fecha".to_string()]);
        assert!(config.drop_columns.is_empty());
        assert_eq!(config.missing_placeholder, "NaN");
        assert_eq!(config.bucket_rules.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_rules_are_valid() {
        for rule in default_bucket_rules() {
            assert!(rule.spec.validate(&rule.column).is_ok(), "{}", rule.column);
        }
        let target = default_bucket_rules()
            .into_iter()
            .find(|r| r.column == "FE_FinalNR")
            .unwrap();
        assert_eq!(target.spec.label_for(Some("-3")), "NA");
        assert_eq!(target.spec.label_for(Some("0")), "40");
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .protected_columns(Vec::<String>::new())
            .drop_column("fecha")
            .missing_placeholder("MISSING")
            .build()
            .unwrap();

        assert!(config.protected_columns.is_empty());
        assert_eq!(config.drop_columns, vec!["fecha".to_string()]);
        assert_eq!(config.missing_placeholder, "MISSING");
    }

    #[test]
    fn test_bucket_rule_replaces_existing() {
        let config = PipelineConfig::builder()
            .bucket_rule(
                "edad",
                BucketSpec::new("edad", vec![0.0, 18.0, 120.0], ["menor", "adulto"]).unwrap(),
            )
            .bucket_rule("diascita", BucketSpec::days_since_event())
            .build()
            .unwrap();

        assert_eq!(config.bucket_rules.len(), 8);
        assert_eq!(
            config
                .bucket_rules
                .iter()
                .filter(|r| r.column == "diascita")
                .count(),
            1
        );
    }

    #[test]
    fn test_validation_protected_and_dropped() {
        let result = PipelineConfig::builder().drop_column("fecha").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ProtectedAndDropped(name) if name == "fecha"
        ));
    }

    #[test]
    fn test_validation_empty_placeholder() {
        let result = PipelineConfig::builder().missing_placeholder("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyPlaceholder
        ));
    }

    #[test]
    fn test_pipeline_config_from_json() {
        let json = r#"{
            "protected_columns": [],
            "drop_columns": ["fecha"],
            "bucket_rules": [
                {
                    "column": "diascita",
                    "spec": {
                        "breakpoints": ["-inf", 7, 30, "inf"],
                        "labels": ["week", "month", "later"]
                    }
                }
            ]
        }"#;

        let config: PipelineConfig =
            serde_json::from_str(json).expect("Should deserialize from JSON");
        assert!(config.validate().is_ok());
        assert_eq!(config.drop_columns, vec!["fecha".to_string()]);
        assert_eq!(config.bucket_rules.len(), 1);
        assert_eq!(config.bucket_rules[0].spec.label_for(Some("100")), "later");
        // Unlisted fields keep their defaults.
        assert_eq!(config.missing_sentinels.len(), 3);
        assert_eq!(config.missing_placeholder, "NaN");
    }

    #[test]
    fn test_invalid_rule_from_json_fails_validation() {
        let json = r#"{
            "bucket_rules": [
                { "column": "edad", "spec": { "breakpoints": [0, 10], "labels": ["a", "b"] } }
            ]
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        let err: ProcessingError = config.validate().unwrap_err().into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
