//! Comma-separated rendering of result tables.

use std::io::Write;

use polars::prelude::{AnyValue, DataFrame};

use nfse_transform::data_utils::any_to_string;

/// UTF-8 byte order mark; spreadsheet programs use it to detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `df` as comma-separated text: one header line, then one line per
/// row in table order. Nulls are written as empty fields.
pub fn write_csv<W: Write>(mut writer: W, df: &DataFrame, bom: bool) -> csv::Result<()> {
    if bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    let columns = df.get_columns();
    out.write_record(columns.iter().map(|column| column.name().as_str()))?;
    let mut record = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        for column in columns {
            record.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn render(df: &DataFrame, bom: bool) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, df, bom).unwrap();
        buffer
    }

    #[test]
    fn renders_rows_in_order() {
        let df = DataFrame::new(vec![
            Column::new("client".into(), vec!["padaria, são joão", "ana"]),
            Column::new("invoice_number".into(), vec![Some(101i64), None]),
            Column::new("region_code".into(), vec!["SP", "RJ"]),
        ])
        .unwrap();
        let text = String::from_utf8(render(&df, false)).unwrap();
        insta::assert_snapshot!(text, @r#"
        client,invoice_number,region_code
        "padaria, são joão",101,SP
        ana,,RJ
        "#);
    }

    #[test]
    fn bom_prefix() {
        let df = DataFrame::new(vec![Column::new("region_code".into(), Vec::<String>::new())])
            .unwrap();
        let bytes = render(&df, true);
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(&bytes[UTF8_BOM.len()..], b"region_code\n");
    }
}
