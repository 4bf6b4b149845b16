//! Merge of the normalized trip and surcharge tables.
//!
//! The two tables are expected to carry identical `trip_id` sets, so the
//! merge should never change row counts. A full outer join is used anyway:
//! a key mismatch then surfaces as null-filled columns and a row-count
//! deviation caught by the integrity checks, instead of rows silently
//! disappearing the way an inner join would drop them.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::{debug, info};

const KEY: &str = "trip_id";

/// Merger of the normalized tables.
pub struct Merger;

impl Merger {
    /// Outer-join trips and surcharges on `trip_id` and verify integrity.
    ///
    /// Fails with [`PipelineError::Integrity`] when either side carries
    /// duplicate keys, or when the joined row count differs from the larger
    /// input (the signature of a key mismatch between the two tables).
    pub fn merge(trips: &DataFrame, surcharges: &DataFrame) -> Result<DataFrame> {
        info!(
            "Merging {} trip rows with {} surcharge rows",
            trips.height(),
            surcharges.height()
        );

        Self::check_unique_key(trips, "trip")?;
        Self::check_unique_key(surcharges, "surcharge")?;

        let merged = Self::outer_join(trips, surcharges)?;

        let expected = trips.height().max(surcharges.height());
        if merged.height() != expected {
            return Err(PipelineError::Integrity(format!(
                "outer join produced {} rows, expected {}: trip and surcharge \
                 key sets differ",
                merged.height(),
                expected
            )));
        }
        Self::check_unique_key(&merged, "merged")?;

        debug!("Merged table: {:?}", merged.shape());
        Ok(merged)
    }

    /// The raw outer join with a coalesced key column, without integrity
    /// verification. Exposed so a key mismatch can be audited: unmatched
    /// rows come back null-filled rather than dropped.
    pub fn outer_join(trips: &DataFrame, surcharges: &DataFrame) -> Result<DataFrame> {
        let joined = trips
            .clone()
            .lazy()
            .join(
                surcharges.clone().lazy(),
                [col(KEY)],
                [col(KEY)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .collect()?;
        Ok(joined)
    }

    fn check_unique_key(df: &DataFrame, table: &str) -> Result<()> {
        let unique = df.column(KEY)?.as_materialized_series().n_unique()?;
        if unique != df.height() {
            return Err(PipelineError::Integrity(format!(
                "{} table has {} duplicate '{}' values",
                table,
                df.height() - unique,
                KEY
            )));
        }
        Ok(())
    }
}
