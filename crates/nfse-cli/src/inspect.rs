//! Header report for the `inspect` command.

use polars::prelude::DataFrame;

use nfse_model::{CanonicalField, SourceConfig};
use nfse_transform::data_utils::column_names;
use nfse_transform::{mapped_field, normalize_column_name};

/// How one raw header of a source is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    pub raw: String,
    pub normalized: String,
    /// Canonical field the column feeds, `None` when unmapped.
    pub field: Option<CanonicalField>,
}

/// Normalized name and canonical field of every column of `df`, in column order.
pub fn inspect_rows(df: &DataFrame, source: &SourceConfig) -> Vec<HeaderRow> {
    column_names(df)
        .into_iter()
        .map(|raw| {
            let normalized = normalize_column_name(&raw);
            let field = mapped_field(&source.columns, &normalized);
            HeaderRow {
                raw,
                normalized,
                field,
            }
        })
        .collect()
}
