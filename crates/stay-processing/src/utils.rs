//! Shared utilities for the listing pipeline.
//!
//! Small helpers used by more than one module.

use polars::prelude::*;

/// Try to parse a string as a numeric value (f64).
///
/// Leading/trailing whitespace is ignored; an empty string is not a number.
pub fn parse_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Check if a DataType is an integer or floating point type.
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

/// Fill null values in a Float64 Series with a specific value.
pub fn fill_f64_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let ca = series.f64()?;
    let filled: Vec<f64> = ca.into_iter().map(|v| v.unwrap_or(fill_value)).collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in an Int64 Series with a specific value.
pub fn fill_i64_nulls(series: &Series, fill_value: i64) -> PolarsResult<Series> {
    let ca = series.i64()?;
    let filled: Vec<i64> = ca.into_iter().map(|v| v.unwrap_or(fill_value)).collect();
    Ok(Series::new(series.name().clone(), filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("42"), Some(42.0));
        assert_eq!(parse_f64("  -3.5 "), Some(-3.5));
        assert_eq!(parse_f64("80.00"), Some(80.0));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("   "), None);
        assert_eq!(parse_f64("not-a-number"), None);
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_fill_f64_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_f64_nulls(&series, 2.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
    }

    #[test]
    fn test_fill_i64_nulls() {
        let series = Series::new("test".into(), &[Some(1_i64), None, Some(3)]);
        let filled = fill_i64_nulls(&series, 7).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<i64>().unwrap(), 7);
    }
}
