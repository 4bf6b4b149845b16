//! Partitioning of the merged table into null, negative and cleaned sets.
//!
//! The column sets below are thresholds, not algorithms: they encode the
//! inspector's findings on this dataset. Both problem partitions are kept
//! as separate outputs for manual audit; removal from the analysis set is
//! a one-time decision made here and not revisited downstream.
//!
//! All three partitions are computed from boolean masks over the same
//! input, so the result is deterministic regardless of row ordering.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::info;

/// Columns where nulls are expected: the three raw columns the inspector
/// flagged plus the two labels that go null as a consequence of the
/// vendor and ratecode lookups.
pub const NULL_PRONE_COLUMNS: [&str; 5] = [
    "passenger_count",
    "ratecode_id",
    "store_and_fwd_flag",
    "vendor",
    "ratecode",
];

/// Monetary and surcharge columns where negative values were observed.
pub const NEGATIVE_PRONE_COLUMNS: [&str; 7] = [
    "fare_amount",
    "extra",
    "mta_tax",
    "tip_amount",
    "tolls_amount",
    "improvement_surcharge",
    "congestion_surcharge",
];

/// The three partitions of the merged table.
///
/// `nulls` and `negatives` may overlap each other; `cleaned` is their
/// complement and disjoint from both.
#[derive(Debug, Clone)]
pub struct TripPartitions {
    pub nulls: DataFrame,
    pub negatives: DataFrame,
    pub cleaned: DataFrame,
}

/// Splitter over the merged table.
pub struct Splitter;

impl Splitter {
    /// Partition the merged table into null, negative and cleaned sets.
    pub fn split(df: &DataFrame) -> Result<TripPartitions> {
        let null_mask = any_null_mask(df, &NULL_PRONE_COLUMNS)?;
        let negative_mask = any_negative_mask(df, &NEGATIVE_PRONE_COLUMNS)?;
        let problem_mask = &null_mask | &negative_mask;
        let cleaned_mask = !&problem_mask;

        let partitions = TripPartitions {
            nulls: df.filter(&null_mask)?,
            negatives: df.filter(&negative_mask)?,
            cleaned: df.filter(&cleaned_mask)?,
        };

        info!(
            "Split {} rows: {} with nulls, {} with negatives, {} cleaned",
            df.height(),
            partitions.nulls.height(),
            partitions.negatives.height(),
            partitions.cleaned.height()
        );
        Ok(partitions)
    }
}

/// Rows where any of the given columns is null.
fn any_null_mask(df: &DataFrame, columns: &[&str]) -> Result<BooleanChunked> {
    let mut mask = BooleanChunked::full("null_mask".into(), false, df.height());
    for name in columns {
        let series = df
            .column(name)
            .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?
            .as_materialized_series();
        mask = &mask | &series.is_null();
    }
    Ok(mask)
}

/// Rows where any of the given columns is strictly negative. Null values
/// never count as negative.
fn any_negative_mask(df: &DataFrame, columns: &[&str]) -> Result<BooleanChunked> {
    let mut mask = BooleanChunked::full("negative_mask".into(), false, df.height());
    for name in columns {
        let series = df
            .column(name)
            .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        // Built element-wise so a null never leaks into the mask as a null
        let negative: BooleanChunked = series
            .f64()?
            .into_iter()
            .map(|value| Some(value.is_some_and(|v| v < 0.0)))
            .collect();
        mask = &mask | &negative;
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn merged() -> DataFrame {
        df!(
            "trip_id" => [1i64, 2, 3, 4, 5],
            "passenger_count" => [Some(1i64), None, Some(2), Some(1), Some(3)],
            "ratecode_id" => [Some(1i64), Some(1), None, Some(1), Some(1)],
            "store_and_fwd_flag" => [Some("N"), Some("N"), Some("N"), Some("N"), Some("Y")],
            "vendor" => [Some("VeriFone"), None, Some("VeriFone"), Some("VeriFone"), Some("VeriFone")],
            "ratecode" => [Some("Standard"), Some("Standard"), None, Some("Standard"), Some("Standard")],
            "fare_amount" => [10.0f64, 20.0, 30.0, -5.0, 12.0],
            "extra" => [0.5f64, 0.5, 0.5, 0.5, 0.5],
            "mta_tax" => [0.5f64, 0.5, 0.5, 0.5, 0.5],
            "tip_amount" => [1.0f64, 0.0, 2.0, 0.0, 1.5],
            "tolls_amount" => [0.0f64, 0.0, 0.0, 0.0, 0.0],
            "improvement_surcharge" => [0.3f64, 0.3, 0.3, 0.3, 0.3],
            "congestion_surcharge" => [2.5f64, 2.5, 2.5, 2.5, 2.5],
        )
        .unwrap()
    }

    fn ids(df: &DataFrame) -> Vec<i64> {
        df.column("trip_id")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_negative_fare_lands_in_negative_partition_only() {
        let parts = Splitter::split(&merged()).unwrap();

        assert_eq!(ids(&parts.negatives), vec![4]);
        assert!(!ids(&parts.cleaned).contains(&4));
        assert!(!ids(&parts.nulls).contains(&4));
    }

    #[test]
    fn test_null_ratecode_lands_in_null_partition() {
        let parts = Splitter::split(&merged()).unwrap();

        // Row 2 has null passenger_count/vendor, row 3 null ratecode_id/ratecode
        assert_eq!(ids(&parts.nulls), vec![2, 3]);
        assert!(!ids(&parts.cleaned).contains(&3));
    }

    #[test]
    fn test_coverage_and_disjointness_laws() {
        let df = merged();
        let parts = Splitter::split(&df).unwrap();

        let nulls: HashSet<i64> = ids(&parts.nulls).into_iter().collect();
        let negatives: HashSet<i64> = ids(&parts.negatives).into_iter().collect();
        let cleaned: HashSet<i64> = ids(&parts.cleaned).into_iter().collect();

        let all: HashSet<i64> = ids(&df).into_iter().collect();
        let union: HashSet<i64> = nulls.union(&negatives).chain(cleaned.iter()).copied().collect();
        assert_eq!(union, all, "partitions must cover the merged table");

        let problems: HashSet<i64> = nulls.union(&negatives).copied().collect();
        assert!(
            cleaned.is_disjoint(&problems),
            "cleaned partition must be disjoint from the problem partitions"
        );
    }

    #[test]
    fn test_row_in_both_problem_partitions() {
        let mut df = merged();
        // Make the null-carrying row 2 also carry a negative tip
        df.replace(
            "tip_amount",
            Series::new("tip_amount".into(), [1.0f64, -1.0, 2.0, 0.0, 1.5]),
        )
        .unwrap();

        let parts = Splitter::split(&df).unwrap();
        assert!(ids(&parts.nulls).contains(&2));
        assert!(ids(&parts.negatives).contains(&2));
        assert!(!ids(&parts.cleaned).contains(&2));
    }

    #[test]
    fn test_null_monetary_value_is_not_negative() {
        let mut df = merged();
        df.replace(
            "tolls_amount",
            Series::new(
                "tolls_amount".into(),
                [Some(0.0f64), Some(0.0), Some(0.0), Some(0.0), None],
            ),
        )
        .unwrap();

        let parts = Splitter::split(&df).unwrap();
        // Row 5's null toll is not a negative; it is not null-prone either,
        // because tolls_amount is not in the null-prone set.
        assert!(!ids(&parts.negatives).contains(&5));
        assert!(ids(&parts.cleaned).contains(&5));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let df = df!("trip_id" => [1i64]).unwrap();
        let err = Splitter::split(&df).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(_)));
    }
}
