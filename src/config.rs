//! Configuration for the trip cleaning pipeline.
//!
//! This module provides the input/output paths of a run using the builder
//! pattern. The defaults reproduce the conventional fixed file names of a
//! one-shot batch run; the builder exists so tests and the CLI can point
//! the pipeline at other locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a single pipeline run.
///
/// Use [`PipelineConfig::builder()`] to override individual paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delimited trip data file with a header row.
    pub trip_data: PathBuf,

    /// Surcharge JSON file keyed by record identifier.
    pub surcharge_data: PathBuf,

    /// Lookup table mapping payment_type codes to names.
    pub payment_lookup: PathBuf,

    /// Lookup table mapping vendor_id codes to names.
    pub vendor_lookup: PathBuf,

    /// Lookup table mapping ratecode_id codes to names.
    pub ratecode_lookup: PathBuf,

    /// Output directory for all written artifacts.
    /// Default: "outputs"
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trip_data: PathBuf::from("data/yellow_tripdata.csv"),
            surcharge_data: PathBuf::from("data/surcharge_data.json"),
            payment_lookup: PathBuf::from("data/payment_type.csv"),
            vendor_lookup: PathBuf::from("data/vendor_id.csv"),
            ratecode_lookup: PathBuf::from("data/ratecode_id.csv"),
            output_dir: PathBuf::from("outputs"),
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
        for (field, path) in [
            ("trip_data", &self.trip_data),
            ("surcharge_data", &self.surcharge_data),
            ("payment_lookup", &self.payment_lookup),
            ("vendor_lookup", &self.vendor_lookup),
            ("ratecode_lookup", &self.ratecode_lookup),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath {
                    field: field.to_string(),
                });
            }
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath {
                field: "output_dir".to_string(),
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Path for '{field}' must not be empty")]
    EmptyPath { field: String },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    trip_data: Option<PathBuf>,
    surcharge_data: Option<PathBuf>,
    payment_lookup: Option<PathBuf>,
    vendor_lookup: Option<PathBuf>,
    ratecode_lookup: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    /// Set the trip data CSV path.
    pub fn trip_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.trip_data = Some(path.into());
        self
    }

    /// Set the surcharge JSON path.
    pub fn surcharge_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.surcharge_data = Some(path.into());
        self
    }

    /// Set the payment type lookup CSV path.
    pub fn payment_lookup(mut self, path: impl Into<PathBuf>) -> Self {
        self.payment_lookup = Some(path.into());
        self
    }

    /// Set the vendor lookup CSV path.
    pub fn vendor_lookup(mut self, path: impl Into<PathBuf>) -> Self {
        self.vendor_lookup = Some(path.into());
        self
    }

    /// Set the ratecode lookup CSV path.
    pub fn ratecode_lookup(mut self, path: impl Into<PathBuf>) -> Self {
        self.ratecode_lookup = Some(path.into());
        self
    }

    /// Set the output directory for written artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            trip_data: self.trip_data.unwrap_or(defaults.trip_data),
            surcharge_data: self.surcharge_data.unwrap_or(defaults.surcharge_data),
            payment_lookup: self.payment_lookup.unwrap_or(defaults.payment_lookup),
            vendor_lookup: self.vendor_lookup.unwrap_or(defaults.vendor_lookup),
            ratecode_lookup: self.ratecode_lookup.unwrap_or(defaults.ratecode_lookup),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}
