//! Error types for the trip cleaning pipeline.
//!
//! One `thiserror` hierarchy covers the whole run. Every error is fatal:
//! the pipeline is an offline, single-operator batch job with no partial
//! success mode, so errors carry enough context (stage, column, file) for
//! the operator to act on and nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An input file is missing or malformed.
    #[error("Failed to load '{path}': {reason}")]
    Load { path: PathBuf, reason: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A column's values could not be cast to the declared type.
    #[error("Failed to coerce column '{column}' to {target_type}: {reason}")]
    Coercion {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A timestamp column could not be parsed.
    #[error("Failed to parse column '{column}' as datetime: {reason}")]
    Parse { column: String, reason: String },

    /// The merge changed row counts or duplicated keys, signaling a key
    /// mismatch between the trip and surcharge tables.
    #[error("Data integrity violation: {0}")]
    Integrity(String),

    /// Heatmap rendering failed.
    #[error("Failed to render heatmap: {0}")]
    Render(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with stage context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add stage context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error was raised by the merge integrity checks.
    pub fn is_integrity(&self) -> bool {
        match self {
            Self::Integrity(_) => true,
            Self::WithContext { source, .. } => source.is_integrity(),
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding stage context to Results.
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
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_preserves_source() {
        let error = PipelineError::ColumnNotFound("trip_id".to_string())
            .with_context("While splitting partitions");
        assert!(error.to_string().contains("While splitting partitions"));
        assert!(error.to_string().contains("trip_id"));
    }

    #[test]
    fn test_is_integrity_through_context() {
        let error = PipelineError::Integrity("row count changed".to_string())
            .with_context("While merging");
        assert!(error.is_integrity());
        assert!(!PipelineError::ColumnNotFound("x".to_string()).is_integrity());
    }

    #[test]
    fn test_coercion_message_names_column() {
        let error = PipelineError::Coercion {
            column: "vendor_id".to_string(),
            target_type: "Int64".to_string(),
            reason: "null value present".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("vendor_id"));
        assert!(msg.contains("Int64"));
    }
}
