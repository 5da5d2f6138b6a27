use polars::prelude::DataFrame;
use tracing::debug;

use nfse_model::{RegionTotals, SourceRole};

use crate::data_utils::{column_f64, column_strings, require_column};
use crate::error::Result;

/// Sum `value` per distinct `group`, ordered by group.
///
/// Rows with an empty group or an unreadable value are left out; their count
/// is returned alongside the totals.
pub fn region_totals(
    df: &DataFrame,
    group: &str,
    value: &str,
    table: SourceRole,
) -> Result<(RegionTotals, usize)> {
    require_column(df, table, group)?;
    require_column(df, table, value)?;
    let groups = column_strings(df, group)?;
    let values = column_f64(df, value)?;

    let mut totals = RegionTotals::new();
    let mut skipped = 0usize;
    for (key, amount) in groups.iter().zip(values) {
        let key = key.trim();
        match amount {
            Some(amount) if !key.is_empty() => {
                *totals.entry(key.to_string()).or_insert(0.0) += amount;
            }
            _ => skipped += 1,
        }
    }
    debug!(
        table = %table,
        input_rows = df.height(),
        regions = totals.len(),
        skipped,
        "regional totals computed"
    );
    Ok((totals, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn sums_per_region() {
        let df = DataFrame::new(vec![
            Column::new("region_code".into(), vec!["SP", "RJ", "SP", "", "MG"]),
            Column::new("amount".into(), vec![Some(60.0), Some(50.0), Some(40.0), Some(9.0), None]),
        ])
        .unwrap();
        let (totals, skipped) =
            region_totals(&df, "region_code", "amount", SourceRole::Authority).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("SP"), Some(&100.0));
        assert_eq!(totals.get("RJ"), Some(&50.0));
        assert_eq!(skipped, 2);
        let order: Vec<&str> = totals.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["RJ", "SP"]);
    }

    #[test]
    fn empty_table_has_no_totals() {
        let df = DataFrame::new(vec![
            Column::new("region_code".into(), Vec::<String>::new()),
            Column::new("amount".into(), Vec::<f64>::new()),
        ])
        .unwrap();
        let (totals, skipped) =
            region_totals(&df, "region_code", "amount", SourceRole::Ledger).unwrap();
        assert!(totals.is_empty());
        assert_eq!(skipped, 0);
    }
}
