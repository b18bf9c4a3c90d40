//! Whole-table preprocessing of the flattened listing table.
//!
//! Coerces field types, imputes missing values per a fixed per-field policy,
//! and normalizes blank text fields. The pass is atomic: it works on its own
//! copy of the table and returns it only if every step succeeds, so a failure
//! never publishes a partially preprocessed table.
//!
//! The numeric text fields pass through an explicit text stage upstream (see
//! `flatten`): values arrive in mixed representations, and for the two
//! mean-imputed fee fields an unparseable value must become a null rather
//! than abort the table. `Price` and the night counts are assumed always
//! present and well-formed; a malformed value there is a hard error.

use crate::columns;
use crate::error::{ProcessingError, Result};
use crate::imputers::{MeanRounding, fill_with_mean, fill_with_mode};
use crate::utils::{is_numeric_dtype, parse_f64};
use polars::prelude::*;
use tracing::{debug, info};

/// Run the full preprocessing pass over a flattened listing table.
///
/// Returns the preprocessed table, leaving the input untouched. Any
/// coercion or imputation error fails the whole pass.
///
/// The pass is idempotent: every coercion accepts already-coerced columns
/// and every imputation is a no-op on a null-free column.
pub fn preprocess(table: &DataFrame) -> Result<DataFrame> {
    let mut df = table.clone();

    // Type coercions, in fixed order.
    to_int64_strict(&mut df, columns::MAXIMUM_NIGHTS)?;
    to_int64_strict(&mut df, columns::MINIMUM_NIGHTS)?;
    to_float64_lenient(&mut df, columns::SECURITY_DEPOSIT)?;
    to_float64_strict(&mut df, columns::PRICE)?;
    to_float64_lenient(&mut df, columns::CLEANING_FEE)?;
    to_int64_strict(&mut df, columns::EXTRA_PEOPLE)?;
    to_int64_strict(&mut df, columns::GUESTS_INCLUDED)?;

    // Missing-value imputation from the post-coercion columns.
    fill_with_mode(&mut df, columns::TOTAL_BEDS)?;
    fill_with_mode(&mut df, columns::TOTAL_BEDROOMS)?;
    fill_with_mean(&mut df, columns::SECURITY_DEPOSIT, MeanRounding::Truncate)?;
    fill_with_mean(&mut df, columns::CLEANING_FEE, MeanRounding::Exact)?;
    fill_with_mode(&mut df, columns::REVIEW_SCORES)?;

    // Blank text normalization.
    blank_to_na(&mut df, columns::DESCRIPTION)?;
    blank_to_na(&mut df, columns::HOUSE_RULES)?;
    blank_to_na(&mut df, columns::AMENITIES)?;

    info!(
        "Preprocessed listing table: {} rows, {} columns",
        df.height(),
        df.width()
    );
    Ok(df)
}

fn conversion_failed(
    column: &str,
    target_type: &str,
    reason: impl Into<String>,
) -> ProcessingError {
    ProcessingError::TypeConversionFailed {
        column: column.to_string(),
        target_type: target_type.to_string(),
        reason: reason.into(),
    }
}

/// Coerce a column to Int64, failing on nulls and unparseable values.
///
/// String input goes through a float stage first, so `"15.00"` coerces to
/// 15; float input is truncated.
fn to_int64_strict(df: &mut DataFrame, col_name: &str) -> Result<()> {
    let series = df
        .column(col_name)
        .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();

    if series.null_count() > 0 {
        return Err(conversion_failed(col_name, "integer", "column contains nulls"));
    }

    let coerced: Series = match series.dtype() {
        DataType::Int64 => return Ok(()),
        dtype if is_numeric_dtype(dtype) => {
            let floats = series.cast(&DataType::Float64)?;
            let values: Vec<i64> = floats
                .f64()?
                .into_iter()
                .map(|v| v.map(|f| f.trunc() as i64))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| conversion_failed(col_name, "integer", "column contains nulls"))?;
            Series::new(col_name.into(), values)
        }
        DataType::String => {
            let ca = series.str()?;
            let mut values: Vec<i64> = Vec::with_capacity(ca.len());
            for opt_val in ca.into_iter() {
                let val = opt_val
                    .ok_or_else(|| conversion_failed(col_name, "integer", "column contains nulls"))?;
                let parsed = parse_f64(val).ok_or_else(|| {
                    conversion_failed(col_name, "integer", format!("unparseable value '{val}'"))
                })?;
                values.push(parsed.trunc() as i64);
            }
            Series::new(col_name.into(), values)
        }
        other => {
            return Err(conversion_failed(
                col_name,
                "integer",
                format!("unsupported dtype {other}"),
            ));
        }
    };

    df.replace(col_name, coerced)?;
    debug!("Coerced '{}' to Int64", col_name);
    Ok(())
}

/// Coerce a column to Float64, failing on nulls and unparseable values.
fn to_float64_strict(df: &mut DataFrame, col_name: &str) -> Result<()> {
    let series = df
        .column(col_name)
        .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();

    if series.null_count() > 0 {
        return Err(conversion_failed(col_name, "float", "column contains nulls"));
    }

    let coerced: Series = match series.dtype() {
        DataType::Float64 => return Ok(()),
        dtype if is_numeric_dtype(dtype) => series.cast(&DataType::Float64)?,
        DataType::String => {
            let ca = series.str()?;
            let mut values: Vec<f64> = Vec::with_capacity(ca.len());
            for opt_val in ca.into_iter() {
                let val = opt_val
                    .ok_or_else(|| conversion_failed(col_name, "float", "column contains nulls"))?;
                let parsed = parse_f64(val).ok_or_else(|| {
                    conversion_failed(col_name, "float", format!("unparseable value '{val}'"))
                })?;
                values.push(parsed);
            }
            Series::new(col_name.into(), values)
        }
        other => {
            return Err(conversion_failed(
                col_name,
                "float",
                format!("unsupported dtype {other}"),
            ));
        }
    };

    df.replace(col_name, coerced)?;
    debug!("Coerced '{}' to Float64", col_name);
    Ok(())
}

/// Coerce a column to Float64, mapping unparseable values to null so they
/// can be mean-imputed. Existing nulls are preserved.
fn to_float64_lenient(df: &mut DataFrame, col_name: &str) -> Result<()> {
    let series = df
        .column(col_name)
        .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();

    let coerced: Series = match series.dtype() {
        DataType::Float64 => return Ok(()),
        dtype if is_numeric_dtype(dtype) => series.cast(&DataType::Float64)?,
        DataType::String => {
            let ca = series.str()?;
            let values: Vec<Option<f64>> = ca
                .into_iter()
                .map(|opt_val| opt_val.and_then(parse_f64))
                .collect();
            Series::new(col_name.into(), values)
        }
        other => {
            return Err(conversion_failed(
                col_name,
                "float",
                format!("unsupported dtype {other}"),
            ));
        }
    };

    df.replace(col_name, coerced)?;
    debug!("Coerced '{}' to Float64 (lenient)", col_name);
    Ok(())
}

/// Replace empty strings with the `"NA"` sentinel. Nulls are left alone:
/// only the empty string is normalized.
fn blank_to_na(df: &mut DataFrame, col_name: &str) -> Result<()> {
    let series = df
        .column(col_name)
        .map_err(|_| ProcessingError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();

    let ca = series.str()?;
    let values: Vec<Option<&str>> = ca
        .into_iter()
        .map(|opt_val| opt_val.map(|v| if v.is_empty() { "NA" } else { v }))
        .collect();

    let replaced = Series::new(col_name.into(), values);
    df.replace(col_name, replaced)?;
    Ok(())
}
