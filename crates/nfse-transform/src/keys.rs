use polars::prelude::{Column, DataFrame};

use nfse_model::{CLIENT, REGION_CODE, SourceRole};

use crate::data_utils::{column_strings, require_column};
use crate::error::Result;

/// Client names compare trimmed and lower-cased.
pub fn standardize_client(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Region codes compare trimmed and upper-cased.
pub fn standardize_region(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Rewrite `client` and `region_code` as standardized text columns.
///
/// Both tables go through this same function before the join. Nulls become
/// empty strings.
pub fn standardize_keys(df: &DataFrame, table: SourceRole) -> Result<DataFrame> {
    require_column(df, table, CLIENT)?;
    require_column(df, table, REGION_CODE)?;

    let clients: Vec<String> = column_strings(df, CLIENT)?
        .iter()
        .map(|value| standardize_client(value))
        .collect();
    let regions: Vec<String> = column_strings(df, REGION_CODE)?
        .iter()
        .map(|value| standardize_region(value))
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(CLIENT.into(), clients))?;
    out.with_column(Column::new(REGION_CODE.into(), regions))?;
    Ok(out)
}
