//! DataFrame value helpers shared by the stages.

use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NewChunkedArray};

use nfse_model::SourceRole;

use crate::error::{Result, TransformError};

/// Render a cell as text. Null becomes the empty string.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "True" } else { "False" }.to_string(),
        other => other.to_string(),
    }
}

/// Format a float without a trailing `.0` on whole values.
pub fn format_numeric(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Read a cell as an integer.
///
/// Floats and numeric text are accepted only when they have no fractional
/// part, so `12.0` reads as `12` and `12.5` does not read at all.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => integral_f64(f64::from(v)),
        AnyValue::Float64(v) => integral_f64(v),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

/// Read a cell as a finite float. Text uses `.` as decimal separator.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let parsed = match value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse trimmed text as an integer, accepting whole-valued decimals.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(integral_f64))
}

/// Parse trimmed text as a finite float.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn integral_f64(value: f64) -> Option<i64> {
    // Above 2^53 floats no longer hold every integer.
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Every value of a column rendered as text.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Every value of a column read as an integer.
pub fn column_i64(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_i64(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Every value of a column read as a float.
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|column| column.as_str() == name)
}

/// Fail with `MissingColumn` unless `name` exists.
pub fn require_column(df: &DataFrame, table: SourceRole, name: &str) -> Result<()> {
    if has_column(df, name) {
        Ok(())
    } else {
        Err(TransformError::MissingColumn {
            table,
            column: name.to_string(),
        })
    }
}

pub(crate) fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_from_text_and_floats() {
        assert_eq!(any_to_i64(AnyValue::String("  42 ")), Some(42));
        assert_eq!(any_to_i64(AnyValue::String("12.0")), Some(12));
        assert_eq!(any_to_i64(AnyValue::String("12.5")), None);
        assert_eq!(any_to_i64(AnyValue::Float64(101.0)), Some(101));
        assert_eq!(any_to_i64(AnyValue::Float64(f64::NAN)), None);
        assert_eq!(any_to_i64(AnyValue::Null), None);
    }

    #[test]
    fn floats_are_finite() {
        assert_eq!(any_to_f64(AnyValue::String("1234.56")), Some(1234.56));
        assert_eq!(any_to_f64(AnyValue::String("inf")), None);
        assert_eq!(any_to_f64(AnyValue::String("NaN")), None);
        assert_eq!(any_to_f64(AnyValue::Int64(3)), Some(3.0));
    }

    #[test]
    fn text_rendering() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Float64(101.0)), "101");
        assert_eq!(any_to_string(AnyValue::Float64(10.5)), "10.5");
        assert_eq!(any_to_string(AnyValue::Int64(-7)), "-7");
    }
}
