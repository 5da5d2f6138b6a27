//! Delimited-text reading for report-style exports.
//!
//! Accounting reports carry banner lines above the header and interleave
//! section totals with the data. The reader skips a fixed number of leading
//! lines, decodes the configured encoding, and drops every row that contains
//! one of the configured marker phrases.

use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::Encoding;
use nfse_model::SourceConfig;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::{IngestError, Result, open_error};
use crate::frame::{Cell, ColumnTyping, RawTable, build_frame};

/// Options for reading one delimited file.
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    pub skip_rows: usize,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub marker_phrases: Vec<String>,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            delimiter: b',',
            encoding: encoding_rs::UTF_8,
            marker_phrases: Vec::new(),
        }
    }
}

impl DelimitedOptions {
    /// Resolve the options of a configured source.
    pub fn from_source(source: &SourceConfig) -> Result<Self> {
        let encoding = Encoding::for_label(source.encoding.trim().as_bytes()).ok_or_else(|| {
            IngestError::UnsupportedEncoding {
                path: source.path.clone(),
                label: source.encoding.clone(),
            }
        })?;
        let delimiter = source
            .delimiter_byte()
            .ok_or_else(|| IngestError::CsvParse {
                path: source.path.clone(),
                message: format!("delimiter {:?} is not a single byte", source.delimiter),
            })?;
        Ok(Self {
            skip_rows: source.skip_rows,
            delimiter,
            encoding,
            marker_phrases: source.marker_phrases.clone(),
        })
    }
}

/// Read a delimited file into a DataFrame of string columns.
pub fn read_delimited(path: &Path, options: &DelimitedOptions) -> Result<DataFrame> {
    let bytes = std::fs::read(path).map_err(|error| open_error(path, error))?;
    let content = decode(path, &bytes, options.encoding)?;
    let table = parse_delimited(path, &content, options)?;
    build_frame(table, ColumnTyping::Text, false)
}

fn decode(path: &Path, bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    // BOM sniffing: a UTF-8 export declared as Latin-1 still decodes correctly.
    let (decoded, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(IngestError::Decode {
            path: path.to_path_buf(),
            encoding: used.name(),
        });
    }
    Ok(decoded.into_owned())
}

/// Byte offset just past the first `count` lines.
fn skip_lines(content: &str, count: usize) -> Option<usize> {
    let mut offset = 0usize;
    for _ in 0..count {
        let rest = &content[offset..];
        let newline = rest.find('\n')?;
        offset += newline + 1;
    }
    Some(offset)
}

fn parse_delimited(path: &Path, content: &str, options: &DelimitedOptions) -> Result<RawTable> {
    let start = skip_lines(content, options.skip_rows).ok_or_else(|| IngestError::NoHeader {
        path: path.to_path_buf(),
        skip_rows: options.skip_rows,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(content[start..].as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|error| csv_error(path, &error))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => {
            return Err(IngestError::NoHeader {
                path: path.to_path_buf(),
                skip_rows: options.skip_rows,
            });
        }
    };
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    let mut marker_rows = 0usize;
    for record in records {
        let record = record.map_err(|error| csv_error(path, &error))?;
        if contains_marker(&record, &options.marker_phrases) {
            marker_rows += 1;
            continue;
        }
        let row: Vec<Cell> = record
            .iter()
            .map(|value| {
                let value = value.trim();
                if value.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(value.to_string())
                }
            })
            .collect();
        rows.push(row);
    }
    debug!(
        path = %path.display(),
        skip_rows = options.skip_rows,
        columns = headers.len(),
        rows = rows.len(),
        marker_rows,
        "delimited source parsed"
    );
    Ok(RawTable { headers, rows })
}

fn contains_marker(record: &csv::StringRecord, phrases: &[String]) -> bool {
    if phrases.is_empty() {
        return false;
    }
    record
        .iter()
        .any(|field| phrases.iter().any(|phrase| field.contains(phrase.as_str())))
}

fn csv_error(path: &Path, error: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_lines_counts_newlines() {
        let content = "a\nb\nc\n";
        assert_eq!(skip_lines(content, 0), Some(0));
        assert_eq!(skip_lines(content, 2), Some(4));
        assert_eq!(skip_lines(content, 3), Some(6));
        assert_eq!(skip_lines(content, 4), None);
    }

    #[test]
    fn parse_filters_marker_rows() {
        let options = DelimitedOptions {
            delimiter: b';',
            marker_phrases: vec!["Total Geral".to_string()],
            ..DelimitedOptions::default()
        };
        let content = "Cliente;Nota\nAna;1\nTotal Geral;;\nBia;2\n";
        let table = parse_delimited(Path::new("t.csv"), content, &options).unwrap();
        assert_eq!(table.headers, vec!["Cliente", "Nota"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], Cell::Text("Bia".to_string()));
    }

    #[test]
    fn parse_without_header_fails() {
        let options = DelimitedOptions {
            skip_rows: 2,
            ..DelimitedOptions::default()
        };
        let error = parse_delimited(Path::new("t.csv"), "banner\n", &options).unwrap_err();
        assert!(matches!(error, IngestError::NoHeader { .. }));
    }

    #[test]
    fn decode_latin1() {
        let bytes = b"Cont\xe1bil";
        let decoded = decode(Path::new("t.csv"), bytes, encoding_rs::WINDOWS_1252).unwrap();
        assert_eq!(decoded, "Contábil");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let error = decode(Path::new("t.csv"), b"Cont\xe1bil", encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(error, IngestError::Decode { .. }));
    }
}
