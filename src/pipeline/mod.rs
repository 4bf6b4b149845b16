//! Pipeline orchestration.
//!
//! Runs the stages in fixed order: load, inspect, normalize, merge, split,
//! summarize. Each stage output is a new table produced from its inputs;
//! every table the run produces is written under the configured output
//! directory. There is no branching control state, no retry and no partial
//! success: the first failing stage aborts the run.

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::inspector::Inspector;
use crate::loader;
use crate::merger::Merger;
use crate::normalizer::{Lookups, Normalizer};
use crate::splitter::Splitter;
use crate::summarizer::{Summarizer, render_heatmap};
use polars::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub trip_rows: usize,
    pub surcharge_rows: usize,
    pub merged_rows: usize,
    pub null_rows: usize,
    pub negative_rows: usize,
    pub cleaned_rows: usize,
    pub duration_ms: u64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    /// Paths of every written artifact, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// The cleaning pipeline.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline over a validated configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run all stages once, in order, writing every artifact.
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut artifacts = Vec::new();

        std::fs::create_dir_all(&self.config.output_dir)?;

        info!("Step 1: Loading input files...");
        let raw_trips = loader::load_csv(&self.config.trip_data)
            .context("loading trip data")?;
        let raw_surcharges = loader::load_surcharges(&self.config.surcharge_data)
            .context("loading surcharge data")?;
        let payment = loader::load_csv(&self.config.payment_lookup)
            .context("loading payment type lookup")?;
        let vendor = loader::load_csv(&self.config.vendor_lookup)
            .context("loading vendor lookup")?;
        let ratecode = loader::load_csv(&self.config.ratecode_lookup)
            .context("loading ratecode lookup")?;

        info!("Step 2: Inspecting raw tables...");
        let trip_key = detect_key(&raw_trips);
        Inspector::inspect("trips", &raw_trips, trip_key)
            .context("inspecting trip table")?
            .log();
        Inspector::inspect("surcharges", &raw_surcharges, Some("trip_id"))
            .context("inspecting surcharge table")?
            .log();

        info!("Step 3: Normalizing tables...");
        let lookups = Lookups::from_frames(&payment, &vendor, &ratecode)
            .context("building lookup tables")?;
        let trips = Normalizer::normalize_trips(raw_trips, &lookups)
            .context("normalizing trip table")?;
        let surcharges = Normalizer::normalize_surcharges(raw_surcharges)
            .context("normalizing surcharge table")?;
        artifacts.push(self.write_csv(&trips, "trips.csv")?);
        artifacts.push(self.write_csv(&surcharges, "surcharges.csv")?);

        info!("Step 4: Merging trip and surcharge tables...");
        let merged = Merger::merge(&trips, &surcharges)
            .context("merging trip and surcharge tables")?;
        artifacts.push(self.write_csv(&merged, "merged.csv")?);

        info!("Step 5: Splitting null/negative/cleaned partitions...");
        let partitions = Splitter::split(&merged).context("splitting partitions")?;
        artifacts.push(self.write_csv(&partitions.nulls, "null_rows.csv")?);
        artifacts.push(self.write_csv(&partitions.negatives, "negative_rows.csv")?);
        artifacts.push(self.write_csv(&partitions.cleaned, "cleaned.csv")?);

        info!("Step 6: Summarizing correlations...");
        let matrix = Summarizer::correlation_matrix(&partitions.cleaned)
            .context("computing correlation matrix")?;
        let matrix_df = matrix.to_dataframe()?;
        artifacts.push(self.write_csv(&matrix_df, "correlation_matrix.csv")?);

        let heatmap_path = self.config.output_dir.join("correlation_heatmap.png");
        render_heatmap(&matrix, &heatmap_path).context("rendering heatmap")?;
        artifacts.push(heatmap_path);

        let summary = RunSummary {
            trip_rows: trips.height(),
            surcharge_rows: surcharges.height(),
            merged_rows: merged.height(),
            null_rows: partitions.nulls.height(),
            negative_rows: partitions.negatives.height(),
            cleaned_rows: partitions.cleaned.height(),
            duration_ms: started.elapsed().as_millis() as u64,
            completed_at: chrono::Utc::now(),
            artifacts,
        };

        info!(
            "Run complete in {}ms: {} merged rows, {} cleaned",
            summary.duration_ms, summary.merged_rows, summary.cleaned_rows
        );
        Ok(summary)
    }

    fn write_csv(&self, df: &DataFrame, name: &str) -> Result<PathBuf> {
        let path = self.config.output_dir.join(name);
        let file = std::fs::File::create(&path)?;
        let mut df = df.clone();
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut df)
            .context(format!("writing {}", name))?;
        info!("Wrote {:?} ({} rows)", path, df.height());
        Ok(path)
    }
}

/// The raw trip file carries its key as `tripId`; fixtures that are already
/// canonical carry `trip_id`.
fn detect_key(df: &DataFrame) -> Option<&'static str> {
    let names = df.get_column_names();
    if names.iter().any(|n| n.as_str() == "tripId") {
        Some("tripId")
    } else if names.iter().any(|n| n.as_str() == "trip_id") {
        Some("trip_id")
    } else {
        None
    }
}
