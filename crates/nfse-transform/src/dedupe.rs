use std::collections::BTreeSet;

use polars::prelude::{AnyValue, DataFrame};
use tracing::debug;

use nfse_model::SourceRole;

use crate::data_utils::{any_to_string, filter_rows, require_column};
use crate::error::Result;

/// Keep the first row for each distinct value of `key`, preserving order.
///
/// Nulls count as one distinct value. Returns the table and the number of
/// rows removed.
pub fn dedupe_by_key(df: &DataFrame, key: &str, table: SourceRole) -> Result<(DataFrame, usize)> {
    require_column(df, table, key)?;
    if df.height() == 0 {
        return Ok((df.clone(), 0));
    }
    let column = df.column(key)?;
    let mut seen: BTreeSet<Option<String>> = BTreeSet::new();
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = match column.get(idx).unwrap_or(AnyValue::Null) {
            AnyValue::Null => None,
            other => Some(any_to_string(other)),
        };
        keep.push(seen.insert(value));
    }
    let removed = keep.iter().filter(|kept| !**kept).count();
    if removed == 0 {
        return Ok((df.clone(), 0));
    }
    let out = filter_rows(df, &keep)?;
    debug!(
        table = %table,
        key,
        input_rows = df.height(),
        output_rows = out.height(),
        removed,
        "duplicates removed"
    );
    Ok((out, removed))
}
