//! Spreadsheet reading (xlsx, xlsm, xls, xlsb, ods) via calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::frame::{Cell, ColumnTyping, RawTable, build_frame, format_float};

/// Read one worksheet into a DataFrame.
///
/// The first row of the used range is the header. Entirely blank rows and
/// columns are dropped, and columns holding only numbers become numeric.
/// When `sheet` is `None` the first worksheet is used.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook = open_workbook_auto(path).map_err(|error| IngestError::Workbook {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
                available: sheet_names.join(", "),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IngestError::EmptySource {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|error| IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("sheet '{sheet_name}': {error}"),
        })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();
    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(to_cell).collect()).collect();
    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        columns = headers.len(),
        rows = rows.len(),
        "worksheet read"
    );
    build_frame(RawTable { headers, rows }, ColumnTyping::Infer, true)
}

fn header_text(cell: &Data) -> String {
    match to_cell(cell) {
        Cell::Empty => String::new(),
        Cell::Int(value) => value.to_string(),
        Cell::Float(value) => format_float(value),
        Cell::Text(value) => value,
    }
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::Int(value) => Cell::Int(*value),
        Data::Float(value) => Cell::Float(*value),
        Data::String(value) => {
            if value.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(value.clone())
            }
        }
        Data::Bool(value) => Cell::Text(if *value { "True" } else { "False" }.to_string()),
        Data::DateTime(value) => Cell::Text(format_float(value.as_f64())),
        Data::DateTimeIso(value) | Data::DurationIso(value) => Cell::Text(value.clone()),
        Data::Error(error) => Cell::Text(format!("#{error:?}")),
    }
}
