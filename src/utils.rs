//! Shared utilities for the trip cleaning pipeline.

use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Names of the numeric columns of a DataFrame, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Extract a column as `Vec<Option<f64>>`, casting through Float64.
pub fn column_as_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df!(
            "fare_amount" => [1.0f64, 2.0],
            "store_and_fwd_flag" => ["N", "Y"],
            "passenger_count" => [1i64, 2],
        )
        .unwrap();
        assert_eq!(
            numeric_column_names(&df),
            vec!["fare_amount".to_string(), "passenger_count".to_string()]
        );
    }

    #[test]
    fn test_column_as_f64_casts_integers() {
        let df = df!("passenger_count" => [Some(1i64), None, Some(3)]).unwrap();
        let values = column_as_f64(&df, "passenger_count").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
    }
}
