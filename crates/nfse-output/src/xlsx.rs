//! Workbook rendering of result tables via rust_xlsxwriter.

use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use nfse_transform::data_utils::any_to_string;

/// Sheet holding the unmatched-record list.
pub const RESULT_SHEET: &str = "Resultado";
/// Sheet holding the regional comparison.
pub const COMPARISON_SHEET: &str = "Comparacao";

/// Write `df` to a single-sheet workbook at `path`.
///
/// Numeric columns become number cells, nulls stay blank, everything else is
/// written as text. The header row is bold.
pub fn write_xlsx(path: &Path, df: &DataFrame, sheet: &str) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(sheet)?;
    let header = Format::new().set_bold();

    let columns = df.get_columns();
    for (col, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column.name().as_str(), &header)?;
    }
    for idx in 0..df.height() {
        let row = (idx + 1) as u32;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            match column.get(idx).unwrap_or(AnyValue::Null) {
                AnyValue::Null => {}
                AnyValue::Int64(v) => {
                    worksheet.write_number(row, col, v as f64)?;
                }
                AnyValue::Int32(v) => {
                    worksheet.write_number(row, col, v)?;
                }
                AnyValue::Float64(v) => {
                    worksheet.write_number(row, col, v)?;
                }
                AnyValue::Float32(v) => {
                    worksheet.write_number(row, col, v)?;
                }
                other => {
                    worksheet.write_string(row, col, any_to_string(other))?;
                }
            }
        }
    }
    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}
