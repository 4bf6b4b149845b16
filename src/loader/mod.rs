//! Loaders for the raw input files.
//!
//! Three kinds of inputs exist: the delimited trip file, the surcharge JSON
//! file (one top-level object whose keys are record identifiers), and the
//! small two-column lookup tables. Everything is read once into memory; a
//! missing or malformed file aborts the run with [`PipelineError::Load`].

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Load a delimited file with a header row into a DataFrame.
///
/// Schema inference scans the whole file so that columns with late-appearing
/// mixed values (e.g. a unit suffix in `trip_distance`) come in as text
/// rather than failing mid-read.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| load_error(path, e))?
        .finish()
        .map_err(|e| load_error(path, e))?;

    debug!("Loaded {:?}: {:?}", path, df.shape());
    Ok(df)
}

/// Load the surcharge JSON file into a DataFrame.
///
/// The file is a single JSON object oriented by record: each top-level key
/// is a record identifier and becomes a row under the `trip_id` column.
/// Keys are read through an ordered map so the resulting table is
/// deterministic regardless of file layout.
pub fn load_surcharges(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| load_error(path, e))?;
    let records: BTreeMap<String, serde_json::Value> =
        serde_json::from_reader(file).map_err(|e| load_error(path, e))?;

    let mut trip_ids = Vec::with_capacity(records.len());
    let mut improvement = Vec::with_capacity(records.len());
    let mut congestion = Vec::with_capacity(records.len());

    for (trip_id, entry) in records {
        let obj = entry.as_object().ok_or_else(|| PipelineError::Load {
            path: path.to_path_buf(),
            reason: format!("record '{}' is not a JSON object", trip_id),
        })?;
        improvement.push(field_as_f64(obj, "improvement_surcharge"));
        congestion.push(field_as_f64(obj, "congestion_surcharge"));
        trip_ids.push(trip_id);
    }

    let df = df!(
        "trip_id" => trip_ids,
        "improvement_surcharge" => improvement,
        "congestion_surcharge" => congestion,
    )?;

    debug!("Loaded {:?}: {:?}", path, df.shape());
    Ok(df)
}

fn field_as_f64(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(serde_json::Value::as_f64)
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
