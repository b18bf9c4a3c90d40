//! Statistical imputation for the listing table.
//!
//! Fill values are always computed from the column's own post-coercion
//! non-null values. A column with nulls but no valid values cannot be
//! imputed and fails the whole preprocessing pass.

use crate::error::{ProcessingError, Result};
use crate::utils::{fill_f64_nulls, fill_i64_nulls};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Rounding applied to a mean before filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanRounding {
    /// Use the mean as-is.
    Exact,
    /// Truncate the mean toward zero before filling.
    Truncate,
}

/// Fill nulls in a Float64 column with the column mean.
///
/// No-op when the column has no nulls, so re-running preprocessing over an
/// already-imputed table changes nothing.
pub fn fill_with_mean(df: &mut DataFrame, col_name: &str, rounding: MeanRounding) -> Result<()> {
    let series = df
        .column(col_name)
        .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();

    if series.null_count() == 0 {
        return Ok(());
    }

    let mean = series
        .mean()
        .ok_or_else(|| ProcessingError::NoValidValues(col_name.to_string()))?;
    let fill_value = match rounding {
        MeanRounding::Exact => mean,
        MeanRounding::Truncate => mean.trunc(),
    };

    let filled = fill_f64_nulls(&series, fill_value)?;
    df.replace(col_name, filled)?;
    debug!("Filled '{}' with mean: {}", col_name, fill_value);
    Ok(())
}

/// Fill nulls in a numeric column with the column mode.
///
/// Ties are broken stably: among equally frequent values, the one seen
/// first in row order wins. No-op when the column has no nulls.
pub fn fill_with_mode(df: &mut DataFrame, col_name: &str) -> Result<()> {
    let series = df
        .column(col_name)
        .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();

    if series.null_count() == 0 {
        return Ok(());
    }

    match series.dtype() {
        DataType::Int64 => {
            let mode = i64_mode(&series)?
                .ok_or_else(|| ProcessingError::NoValidValues(col_name.to_string()))?;
            let filled = fill_i64_nulls(&series, mode)?;
            df.replace(col_name, filled)?;
            debug!("Filled '{}' with mode: {}", col_name, mode);
        }
        DataType::Float64 => {
            let mode = f64_mode(&series)?
                .ok_or_else(|| ProcessingError::NoValidValues(col_name.to_string()))?;
            let filled = fill_f64_nulls(&series, mode)?;
            df.replace(col_name, filled)?;
            debug!("Filled '{}' with mode: {}", col_name, mode);
        }
        other => {
            return Err(ProcessingError::ImputationFailed {
                column: col_name.to_string(),
                reason: format!("mode imputation not supported for dtype {other}"),
            });
        }
    }

    Ok(())
}

/// Most frequent value of an Int64 series, first-encountered among ties.
fn i64_mode(series: &Series) -> Result<Option<i64>> {
    let ca = series.i64()?;
    let mut counts: HashMap<i64, usize> = HashMap::new();
    let mut order: Vec<i64> = Vec::new();

    for value in ca.into_iter().flatten() {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for value in order {
        let count = counts[&value];
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((value, count));
        }
    }
    Ok(best.map(|(value, _)| value))
}

/// Most frequent value of a Float64 series, first-encountered among ties.
fn f64_mode(series: &Series) -> Result<Option<f64>> {
    let ca = series.f64()?;
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut order: Vec<f64> = Vec::new();

    for value in ca.into_iter().flatten() {
        let count = counts.entry(value.to_bits()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(f64, usize)> = None;
    for value in order {
        let count = counts[&value.to_bits()];
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((value, count));
        }
    }
    Ok(best.map(|(value, _)| value))
}
