//! Assembly of loaded cells into a Polars DataFrame.

use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame};
use tracing::warn;

use crate::error::Result;

/// A single loaded value before column typing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::Int(_) | Self::Float(_) => false,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                Some(*value as i64)
            }
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(format_float(*value)),
            Self::Text(value) if value.trim().is_empty() => None,
            Self::Text(value) => Some(value.clone()),
        }
    }
}

/// Header plus data rows as read from a source.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// How column dtypes are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnTyping {
    /// Every column is a string column.
    Text,
    /// Columns holding only numbers become Int64 or Float64.
    Infer,
}

/// Build a DataFrame, dropping columns that hold no value at all.
///
/// Rows that are entirely blank are removed when `drop_blank_rows` is set.
/// Blank headers are named `unnamed_<index>` and repeated headers get a
/// `.<n>` suffix.
pub(crate) fn build_frame(
    mut table: RawTable,
    typing: ColumnTyping,
    drop_blank_rows: bool,
) -> Result<DataFrame> {
    let width = table.headers.len();
    let truncated = fit_rows(&mut table.rows, width);
    if truncated > 0 {
        warn!(
            rows = truncated,
            header_width = width,
            "rows with values beyond the last header column, extra values ignored"
        );
    }
    if drop_blank_rows {
        table.rows.retain(|row| row.iter().any(|cell| !cell.is_blank()));
    }

    let has_rows = !table.rows.is_empty();
    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(width);
    for (idx, header) in table.headers.iter().enumerate() {
        let cells: Vec<&Cell> = table.rows.iter().map(|row| &row[idx]).collect();
        if has_rows && cells.iter().all(|cell| cell.is_blank()) {
            continue;
        }
        let name = unique_name(&mut seen, column_name(header, idx));
        columns.push(build_column(&name, &cells, typing));
    }
    Ok(DataFrame::new(columns)?)
}

/// Pad or cut every row to `width` cells.
///
/// Returns how many rows lost a non-blank value.
fn fit_rows(rows: &mut [Vec<Cell>], width: usize) -> usize {
    let mut truncated = 0;
    for row in rows {
        if row.iter().skip(width).any(|cell| !cell.is_blank()) {
            truncated += 1;
        }
        row.resize(width, Cell::Empty);
    }
    truncated
}

fn column_name(header: &str, idx: usize) -> String {
    let trimmed = header.trim().trim_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        format!("unnamed_{idx}")
    } else {
        trimmed.to_string()
    }
}

fn unique_name(seen: &mut BTreeSet<String>, name: String) -> String {
    if seen.insert(name.clone()) {
        return name;
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{name}.{suffix}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn build_column(name: &str, cells: &[&Cell], typing: ColumnTyping) -> Column {
    if typing == ColumnTyping::Infer {
        let mut filled = cells.iter().filter(|cell| !cell.is_blank()).peekable();
        if filled.peek().is_some() {
            let filled: Vec<&&Cell> = filled.collect();
            if filled.iter().all(|cell| cell.as_integer().is_some()) {
                let values: Vec<Option<i64>> = cells.iter().map(|cell| cell.as_integer()).collect();
                return Column::new(name.into(), values);
            }
            if filled.iter().all(|cell| cell.as_float().is_some()) {
                let values: Vec<Option<f64>> = cells.iter().map(|cell| cell.as_float()).collect();
                return Column::new(name.into(), values);
            }
        }
    }
    let values: Vec<Option<String>> = cells.iter().map(|cell| cell.to_text()).collect();
    Column::new(name.into(), values)
}

/// Render a float without a trailing `.0` for whole numbers.
pub(crate) fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
