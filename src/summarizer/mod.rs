//! Descriptive correlation summary of the cleaned table.
//!
//! Computes the full pairwise Pearson correlation matrix over the numeric
//! columns of the cleaned partition, using pairwise-complete observations.
//! Cells are undefined (null) where fewer than two overlapping non-null
//! values exist or where a column has zero variance. Descriptive only; no
//! modeling happens here.

mod heatmap;

pub use heatmap::render_heatmap;

use crate::error::{PipelineError, Result};
use crate::utils::{column_as_f64, numeric_column_names};
use polars::prelude::*;
use tracing::info;

/// Symmetric Pearson correlation matrix over named columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    /// Row-major, `values[i][j]` is the correlation of columns i and j.
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Names of the correlated columns, in matrix order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows/columns of the square matrix.
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Correlation of columns i and j; `None` where undefined.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values[i][j]
    }

    /// Render the matrix as a DataFrame with a leading name column,
    /// suitable for writing as a delimited artifact. Undefined cells
    /// become nulls (empty fields in CSV output).
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.size() + 1);
        columns.push(Column::new("column".into(), self.columns.clone()));
        for (j, name) in self.columns.iter().enumerate() {
            let col_values: Vec<Option<f64>> =
                (0..self.size()).map(|i| self.values[i][j]).collect();
            columns.push(Column::new(name.as_str().into(), col_values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Summarizer over the cleaned partition.
pub struct Summarizer;

impl Summarizer {
    /// Compute the pairwise Pearson correlation matrix over the numeric
    /// columns of the given table.
    pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
        let names = numeric_column_names(df);
        if names.is_empty() {
            return Err(PipelineError::Integrity(
                "cleaned table has no numeric columns to correlate".to_string(),
            ));
        }

        info!(
            "Computing {}x{} correlation matrix over numeric columns",
            names.len(),
            names.len()
        );

        let series: Vec<Vec<Option<f64>>> = names
            .iter()
            .map(|name| column_as_f64(df, name))
            .collect::<PolarsResult<_>>()?;

        let n = names.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let corr = pearson(&series[i], &series[j]);
                values[i][j] = corr;
                values[j][i] = corr;
            }
        }

        Ok(CorrelationMatrix {
            columns: names,
            values,
        })
    }
}

/// Pearson correlation over pairwise-complete observations.
///
/// Returns `None` with fewer than two overlapping non-null pairs or when
/// either side has zero variance.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cleaned() -> DataFrame {
        df!(
            "fare_amount" => [10.0f64, 20.0, 30.0, 40.0],
            "tip_amount" => [1.0f64, 2.0, 3.0, 4.0],
            "tolls_amount" => [4.0f64, 3.0, 2.0, 1.0],
            "store_and_fwd_flag" => ["N", "N", "Y", "N"],
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_covers_numeric_columns_only() {
        let matrix = Summarizer::correlation_matrix(&cleaned()).unwrap();
        assert_eq!(
            matrix.columns(),
            &["fare_amount".to_string(), "tip_amount".to_string(), "tolls_amount".to_string()]
        );
        assert_eq!(matrix.size(), 3);
    }

    #[test]
    fn test_perfect_correlations() {
        let matrix = Summarizer::correlation_matrix(&cleaned()).unwrap();

        // fare and tip rise together, tolls falls as fare rises
        assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get(0, 2).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry_and_unit_diagonal() {
        let matrix = Summarizer::correlation_matrix(&cleaned()).unwrap();

        for i in 0..matrix.size() {
            assert!((matrix.get(i, i).unwrap() - 1.0).abs() < 1e-12);
            for j in 0..matrix.size() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let df = df!(
            "fare_amount" => [10.0f64, 20.0, 30.0],
            "mta_tax" => [0.5f64, 0.5, 0.5],
        )
        .unwrap();
        let matrix = Summarizer::correlation_matrix(&df).unwrap();

        assert_eq!(matrix.get(0, 1), None);
        assert_eq!(matrix.get(1, 1), None);
        assert!((matrix.get(0, 0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let df = df!(
            "fare_amount" => [Some(1.0f64), Some(2.0), Some(3.0), Some(4.0)],
            "tip_amount" => [Some(2.0f64), None, Some(6.0), Some(8.0)],
        )
        .unwrap();
        let matrix = Summarizer::correlation_matrix(&df).unwrap();

        // The null pair is dropped; remaining pairs are perfectly correlated
        assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_overlap_is_undefined() {
        let xs = [Some(1.0), None, Some(3.0)];
        let ys = [Some(2.0), Some(4.0), None];
        assert_eq!(pearson(&xs, &ys), None);
    }

    #[test]
    fn test_to_dataframe_layout() {
        let matrix = Summarizer::correlation_matrix(&cleaned()).unwrap();
        let df = matrix.to_dataframe().unwrap();

        assert_eq!(df.shape(), (3, 4));
        let names: Vec<Option<&str>> =
            df.column("column").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(names, vec![Some("fare_amount"), Some("tip_amount"), Some("tolls_amount")]);

        let diag = df.column("tip_amount").unwrap().f64().unwrap().get(1).unwrap();
        assert!((diag - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_numeric_columns_is_an_error() {
        let df = df!("store_and_fwd_flag" => ["N", "Y"]).unwrap();
        assert!(Summarizer::correlation_matrix(&df).is_err());
    }
}
