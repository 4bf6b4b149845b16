//! Trip Data Cleaning Pipeline Library
//!
//! A single-pass cleaning pipeline for taxi trip records built with Rust
//! and Polars.
//!
//! # Overview
//!
//! The pipeline loads a delimited trip file, a JSON surcharge file and
//! three code lookup tables, then runs a fixed sequence of stages:
//!
//! - **Loading**: CSV ingestion with full-file schema inference and JSON
//!   surcharge ingestion keyed by trip identifier
//! - **Inspection**: structural reporting per table (shape, dtypes, null
//!   and unique counts, value ranges, seeded sample values)
//! - **Normalization**: column renames to snake_case, integer coercion of
//!   code columns, distance unit stripping, timestamp parsing, derived
//!   day-of-week columns and label attachment from the lookups
//! - **Merging**: full outer join of trips and surcharges on `trip_id`
//!   with row-count and key-uniqueness integrity checks
//! - **Splitting**: partitioning of the merged table into null-carrying,
//!   negative-carrying and cleaned row sets
//! - **Summarizing**: pairwise Pearson correlation matrix over the numeric
//!   columns of the cleaned set, written as CSV and an annotated heatmap
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use trip_processing::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .trip_data("data/yellow_tripdata.csv")
//!     .output_dir("outputs")
//!     .build()?;
//!
//! let summary = Pipeline::new(config).run()?;
//! println!("{} cleaned rows", summary.cleaned_rows);
//! ```
//!
//! Every stage failure is fatal; the run aborts with an error naming the
//! stage and, where applicable, the offending column or file.

pub mod config;
pub mod error;
pub mod inspector;
pub mod loader;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod splitter;
pub mod summarizer;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result, ResultExt};
pub use inspector::{ColumnReport, Inspector, TableReport};
pub use merger::Merger;
pub use normalizer::{Lookups, Normalizer, TIMESTAMP_FORMAT};
pub use pipeline::{Pipeline, RunSummary};
pub use splitter::{
    NEGATIVE_PRONE_COLUMNS, NULL_PRONE_COLUMNS, Splitter, TripPartitions,
};
pub use summarizer::{CorrelationMatrix, Summarizer, render_heatmap};
