//! Code-to-label lookup tables.
//!
//! A lookup table is a small static mapping from an integer code to a
//! display label, loaded once and used only for enrichment. Missing or
//! null keys yield a null label, never an error: unmatched rows are
//! retained and annotated, not dropped.

use crate::error::{Result, ResultExt};
use polars::prelude::*;
use std::collections::HashMap;

/// Immutable mapping from an integer code to a display label.
#[derive(Debug, Clone)]
pub struct LookupTable {
    labels: HashMap<i64, String>,
}

impl LookupTable {
    /// Build a lookup table from a two-column DataFrame.
    ///
    /// Rows whose key is null or not castable to an integer are skipped.
    pub fn from_dataframe(df: &DataFrame, key_col: &str, label_col: &str) -> Result<Self> {
        let keys = df
            .column(key_col)
            .context(format!("resolving lookup key column '{}'", key_col))?
            .as_materialized_series()
            .cast(&DataType::Int64)?;
        let labels = df
            .column(label_col)
            .context(format!("resolving lookup label column '{}'", label_col))?
            .as_materialized_series()
            .cast(&DataType::String)?;

        let mut map = HashMap::with_capacity(df.height());
        for (key, label) in keys.i64()?.into_iter().zip(labels.str()?.into_iter()) {
            if let (Some(key), Some(label)) = (key, label) {
                map.insert(key, label.to_string());
            }
        }

        Ok(Self { labels: map })
    }

    /// Look up the label for a code. Missing keys are `None`, not an error.
    pub fn get(&self, key: i64) -> Option<&str> {
        self.labels.get(&key).map(String::as_str)
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Map a whole key column to its labels.
    ///
    /// The key series is cast to integers non-strictly first, so null or
    /// unparseable keys come out as null labels (left-join-as-map semantics).
    pub fn label_column(&self, keys: &Series, out_name: &str) -> Result<Series> {
        let keys = keys.cast(&DataType::Int64)?;
        let labels: Vec<Option<String>> = keys
            .i64()?
            .into_iter()
            .map(|key| key.and_then(|k| self.get(k).map(str::to_string)))
            .collect();
        Ok(Series::new(out_name.into(), labels))
    }
}
