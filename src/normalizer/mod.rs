//! Normalization of the raw trip and surcharge tables.
//!
//! Column renames to canonical snake_case names, integer coercion of the
//! code columns, unit-suffix cleanup of `trip_distance`, timestamp parsing
//! with derived day-of-week columns, and lookup-label enrichment. Each
//! transform produces a new table; nothing mutates a table it does not own.

mod lookup;

pub use lookup::LookupTable;

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Fixed timestamp layout of the raw pickup and dropoff columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source-to-canonical column renames for the trip table.
const TRIP_RENAMES: [(&str, &str); 3] = [
    ("VendorID", "vendor_id"),
    ("RatecodeID", "ratecode_id"),
    ("tripId", "trip_id"),
];

/// The three enrichment lookups, keyed the way their source files are.
#[derive(Debug, Clone)]
pub struct Lookups {
    pub payment: LookupTable,
    pub vendor: LookupTable,
    pub ratecode: LookupTable,
}

impl Lookups {
    /// Build the lookup set from the three loaded lookup tables.
    pub fn from_frames(
        payment: &DataFrame,
        vendor: &DataFrame,
        ratecode: &DataFrame,
    ) -> Result<Self> {
        Ok(Self {
            payment: LookupTable::from_dataframe(payment, "payment_type", "payment_type_name")?,
            vendor: LookupTable::from_dataframe(vendor, "vendor_id", "vendor")?,
            ratecode: LookupTable::from_dataframe(ratecode, "ratecode_id", "ratecode")?,
        })
    }
}

/// Normalizer for the raw input tables.
pub struct Normalizer;

impl Normalizer {
    /// Normalize the trip table.
    ///
    /// Precondition: `vendor_id` and `payment_type` are non-null; the strict
    /// integer cast fails on anything else.
    pub fn normalize_trips(df: DataFrame, lookups: &Lookups) -> Result<DataFrame> {
        info!("Normalizing trip table ({} rows)", df.height());

        let mut df = rename_trip_columns(df)?;
        df = coerce_to_int(df, "vendor_id")?;
        df = coerce_to_int(df, "payment_type")?;
        df = clean_trip_distance(df)?;
        df = parse_datetime_column(df, "tpep_pickup_datetime")?;
        df = parse_datetime_column(df, "tpep_dropoff_datetime")?;
        df = add_day_columns(df)?;
        df = attach_labels(df, lookups)?;

        debug!("Trip table normalized: {:?}", df.shape());
        Ok(df)
    }

    /// Normalize the surcharge table: its `trip_id` arrives as text (the JSON
    /// object key) and is coerced to the same integer type as the trip key.
    pub fn normalize_surcharges(df: DataFrame) -> Result<DataFrame> {
        info!("Normalizing surcharge table ({} rows)", df.height());
        coerce_to_int(df, "trip_id")
    }
}

/// Rename source column names to canonical snake_case names.
///
/// A rename is applied when the source name is present; either way the
/// canonical name must exist afterwards.
fn rename_trip_columns(mut df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for (source, canonical) in TRIP_RENAMES {
        if names.iter().any(|n| n == source) {
            df.rename(source, canonical.into())?;
        } else if !names.iter().any(|n| n == canonical) {
            return Err(PipelineError::ColumnNotFound(source.to_string()));
        }
    }
    Ok(df)
}

/// Strictly cast a column to Int64, failing with a coercion error.
fn coerce_to_int(df: DataFrame, column: &str) -> Result<DataFrame> {
    df.lazy()
        .with_column(col(column).strict_cast(DataType::Int64))
        .collect()
        .map_err(|e| PipelineError::Coercion {
            column: column.to_string(),
            target_type: "Int64".to_string(),
            reason: e.to_string(),
        })
}

/// Strip the "km" unit suffix from `trip_distance` where the column arrived
/// as text, then parse it as Float64.
fn clean_trip_distance(df: DataFrame) -> Result<DataFrame> {
    let column = "trip_distance";
    let dtype = df
        .column(column)
        .map_err(|_| PipelineError::ColumnNotFound(column.to_string()))?
        .dtype()
        .clone();

    let expr = if dtype == DataType::String {
        col(column)
            .str()
            .strip_suffix(lit("km"))
            .strict_cast(DataType::Float64)
    } else {
        col(column).strict_cast(DataType::Float64)
    };

    df.lazy()
        .with_column(expr)
        .collect()
        .map_err(|e| PipelineError::Coercion {
            column: column.to_string(),
            target_type: "Float64".to_string(),
            reason: e.to_string(),
        })
}

/// Parse a timestamp column with the fixed layout, strictly.
fn parse_datetime_column(df: DataFrame, column: &str) -> Result<DataFrame> {
    let options = StrptimeOptions {
        format: Some(TIMESTAMP_FORMAT.into()),
        ..Default::default()
    };

    df.lazy()
        .with_column(col(column).str().to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            options,
            lit("raise"),
        ))
        .collect()
        .map_err(|e| PipelineError::Parse {
            column: column.to_string(),
            reason: e.to_string(),
        })
}

/// Derive locale-independent English day names from the parsed timestamps.
fn add_day_columns(df: DataFrame) -> Result<DataFrame> {
    Ok(df
        .lazy()
        .with_columns([
            col("tpep_pickup_datetime").dt().strftime("%A").alias("pickup_day"),
            col("tpep_dropoff_datetime").dt().strftime("%A").alias("dropoff_day"),
        ])
        .collect()?)
}

/// Attach the three human-readable label columns from the lookups.
fn attach_labels(mut df: DataFrame, lookups: &Lookups) -> Result<DataFrame> {
    for (source, out_name, lookup) in [
        ("payment_type", "paymenttype", &lookups.payment),
        ("vendor_id", "vendor", &lookups.vendor),
        ("ratecode_id", "ratecode", &lookups.ratecode),
    ] {
        let keys = df
            .column(source)
            .map_err(|_| PipelineError::ColumnNotFound(source.to_string()))?
            .as_materialized_series()
            .clone();
        let labels = lookup.label_column(&keys, out_name)?;
        df.with_column(labels)?;
    }
    Ok(df)
}
