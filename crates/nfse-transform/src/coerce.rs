//! Typed coercion of numeric columns.
//!
//! Values are rendered as text, trimmed and parsed. A row whose value does not
//! parse is removed from the table and recorded in the [`CoercionReport`];
//! it is never kept as a null.

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use nfse_model::{CoercionMode, CoercionReport, DroppedRow, SourceRole};

use crate::data_utils::{column_strings, filter_rows, parse_f64, parse_i64, require_column};
use crate::error::{Result, TransformError};

/// Coerce `columns` of `df`, in order, to `mode`.
///
/// Rows are dropped column by column. `DroppedRow::row` is the row position in
/// `df` as passed in, whichever column caused the drop.
pub fn coerce_columns(
    df: &DataFrame,
    columns: &[&str],
    mode: CoercionMode,
    table: SourceRole,
) -> Result<(DataFrame, CoercionReport)> {
    if columns.is_empty() {
        return Err(TransformError::EmptyColumnList);
    }
    for column in columns {
        require_column(df, table, column)?;
    }

    let mut current = df.clone();
    let mut positions: Vec<usize> = (0..df.height()).collect();
    let mut report = CoercionReport::default();

    for &column in columns {
        let raw = column_strings(&current, column)?;
        let mut keep = Vec::with_capacity(raw.len());
        let mut ints = Vec::new();
        let mut floats = Vec::new();
        for (idx, value) in raw.iter().enumerate() {
            let accepted = match mode {
                CoercionMode::Integer => parse_i64(value).map(|v| ints.push(v)).is_some(),
                CoercionMode::Float => parse_f64(&value.replace(',', "."))
                    .map(|v| floats.push(v))
                    .is_some(),
            };
            if !accepted {
                report.dropped.push(DroppedRow {
                    row: positions[idx],
                    column: column.to_string(),
                    mode,
                    value: value.clone(),
                });
            }
            keep.push(accepted);
        }

        let dropped = keep.iter().filter(|kept| !**kept).count();
        if dropped > 0 {
            current = filter_rows(&current, &keep)?;
            positions = positions
                .into_iter()
                .zip(&keep)
                .filter_map(|(position, kept)| kept.then_some(position))
                .collect();
        }
        let typed = match mode {
            CoercionMode::Integer => Column::new(column.into(), ints),
            CoercionMode::Float => Column::new(column.into(), floats),
        };
        current.with_column(typed)?;
        debug!(
            table = %table,
            column,
            mode = %mode,
            input_rows = raw.len(),
            dropped_rows = dropped,
            "column coerced"
        );
    }

    Ok((current, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_utils::column_names;

    fn ledger() -> DataFrame {
        DataFrame::new(vec![
            Column::new("invoice_number".into(), vec!["101", " 102 ", "abc", "104", "12.0"]),
            Column::new("amount".into(), vec!["1234,56", "10", "5", "", "7,5"]),
        ])
        .unwrap()
    }

    #[test]
    fn integer_mode_drops_unparseable_rows() {
        let (out, report) =
            coerce_columns(&ledger(), &["invoice_number"], CoercionMode::Integer, SourceRole::Ledger)
                .unwrap();
        let values: Vec<Option<i64>> = out
            .column("invoice_number")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(101), Some(102), Some(104), Some(12)]);
        assert_eq!(report.dropped_count(), 1);
        assert_eq!(report.dropped[0].row, 2);
        assert_eq!(report.dropped[0].value, "abc");
    }

    #[test]
    fn float_mode_accepts_decimal_comma() {
        let (out, report) =
            coerce_columns(&ledger(), &["amount"], CoercionMode::Float, SourceRole::Ledger)
                .unwrap();
        let values: Vec<Option<f64>> = out
            .column("amount")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1234.56), Some(10.0), Some(5.0), Some(7.5)]);
        assert_eq!(report.dropped[0].row, 3);
    }

    #[test]
    fn positions_refer_to_input_rows_across_columns() {
        let (out, report) = coerce_columns(
            &ledger(),
            &["invoice_number", "amount"],
            CoercionMode::Float,
            SourceRole::Ledger,
        )
        .unwrap();
        // "abc" is row 2; the empty amount is row 3 of the input, not of the
        // table left after the first column.
        let rows: Vec<usize> = report.dropped.iter().map(|row| row.row).collect();
        assert_eq!(rows, vec![2, 3]);
        assert_eq!(out.height(), 3);
        assert_eq!(column_names(&out), vec!["invoice_number", "amount"]);
    }

    #[test]
    fn fractional_and_non_finite_values_are_rejected() {
        let df = DataFrame::new(vec![Column::new(
            "n".into(),
            vec!["12.5", "inf", "NaN", "-3"],
        )])
        .unwrap();
        let (out, report) =
            coerce_columns(&df, &["n"], CoercionMode::Integer, SourceRole::Authority).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(report.dropped_count(), 3);

        let (out, report) =
            coerce_columns(&df, &["n"], CoercionMode::Float, SourceRole::Authority).unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(report.dropped_count(), 2);
    }

    #[test]
    fn null_values_are_dropped() {
        let df = DataFrame::new(vec![Column::new("n".into(), vec![Some("1"), None])]).unwrap();
        let (out, report) =
            coerce_columns(&df, &["n"], CoercionMode::Integer, SourceRole::Ledger).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(report.dropped[0].value, "");
    }

    #[test]
    fn empty_column_list_is_rejected() {
        let err = coerce_columns(&ledger(), &[], CoercionMode::Float, SourceRole::Ledger)
            .unwrap_err();
        assert!(matches!(err, TransformError::EmptyColumnList));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let err = coerce_columns(&ledger(), &["valor"], CoercionMode::Float, SourceRole::Ledger)
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { .. }));
    }
}
