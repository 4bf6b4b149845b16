//! Read-only diagnostics over the loaded tables.
//!
//! The inspector computes shape, per-column dtype, null counts, unique
//! counts and duplicate counts for a table. Its output is advisory: it
//! documents the data-quality findings (which columns are null-prone,
//! which monetary columns go negative, vendor_id showing more codes than
//! the metadata documents) that the fixed thresholds in the splitter were
//! chosen from. Nothing downstream depends on it structurally.

use crate::error::{Result, ResultExt};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use rand::prelude::*;
use serde::Serialize;
use tracing::info;

const SAMPLE_SIZE: usize = 5;

/// Diagnostic summary of a single column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub unique_count: usize,
    /// Minimum value, for numeric columns only.
    pub min: Option<f64>,
    /// Maximum value, for numeric columns only.
    pub max: Option<f64>,
    pub sample_values: Vec<String>,
}

/// Diagnostic summary of a whole table.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub name: String,
    /// (rows, columns)
    pub shape: (usize, usize),
    pub columns: Vec<ColumnReport>,
    /// Count of fully duplicated rows.
    pub duplicate_rows: usize,
    /// Count of duplicated values in the declared unique key, if one exists.
    pub key_duplicates: Option<usize>,
}

/// Inspector over in-memory tables.
pub struct Inspector;

impl Inspector {
    /// Inspect a table, optionally checking uniqueness of a key column.
    pub fn inspect(name: &str, df: &DataFrame, key: Option<&str>) -> Result<TableReport> {
        let mut columns = Vec::with_capacity(df.width());
        for col_name in df.get_column_names() {
            columns.push(Self::inspect_column(df, col_name)?);
        }

        let duplicate_rows = df.height()
            - df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)
                .context(format!("counting duplicate rows of '{}'", name))?
                .height();

        let key_duplicates = match key {
            Some(key_col) => {
                let series = df
                    .column(key_col)
                    .context(format!("resolving key column of '{}'", name))?
                    .as_materialized_series();
                Some(df.height() - series.n_unique()?)
            }
            None => None,
        };

        Ok(TableReport {
            name: name.to_string(),
            shape: (df.height(), df.width()),
            columns,
            duplicate_rows,
            key_duplicates,
        })
    }

    fn inspect_column(df: &DataFrame, col_name: &PlSmallStr) -> Result<ColumnReport> {
        let series = df.column(col_name)?.as_materialized_series();
        let dtype = format!("{:?}", series.dtype());
        let null_count = series.null_count();
        let unique_count = series.n_unique()?;

        let (min, max) = if is_numeric_dtype(series.dtype()) {
            (series.min::<f64>()?, series.max::<f64>()?)
        } else {
            (None, None)
        };

        // Seeded sampling keeps the report reproducible between runs.
        let mut sample_values = Vec::new();
        let non_null = series.drop_nulls();
        if !non_null.is_empty() {
            let sample_size = SAMPLE_SIZE.min(non_null.len());
            let mut rng = StdRng::seed_from_u64(42);
            let indices: Vec<usize> = (0..non_null.len()).collect();
            for idx in indices.choose_multiple(&mut rng, sample_size) {
                if let Ok(val) = non_null.get(*idx) {
                    sample_values.push(format!("{}", val));
                }
            }
        }

        Ok(ColumnReport {
            name: col_name.to_string(),
            dtype,
            null_count,
            unique_count,
            min,
            max,
            sample_values,
        })
    }
}

impl TableReport {
    /// Render the report as a human-readable table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Table '{}': {} rows x {} columns\n",
            self.name, self.shape.0, self.shape.1
        ));
        out.push_str(&format!(
            "{:<24} {:<16} {:>8} {:>8} {:>12} {:>12}\n",
            "Column", "Type", "Nulls", "Unique", "Min", "Max"
        ));
        out.push_str(&format!("{}\n", "-".repeat(86)));

        for col in &self.columns {
            out.push_str(&format!(
                "{:<24} {:<16} {:>8} {:>8} {:>12} {:>12}\n",
                truncate(&col.name, 23),
                truncate(&col.dtype, 15),
                col.null_count,
                col.unique_count,
                format_bound(col.min),
                format_bound(col.max),
            ));
        }

        out.push_str(&format!("Duplicate rows: {}\n", self.duplicate_rows));
        if let Some(dups) = self.key_duplicates {
            out.push_str(&format!("Duplicate keys: {}\n", dups));
        }
        out
    }

    /// Log the rendered report line by line at info level.
    pub fn log(&self) {
        for line in self.render().lines() {
            info!("{}", line);
        }
    }

    /// Look up the report of a single column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.name == name)
    }
}

fn format_bound(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
