use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame};

use nfse_model::{REGION_CODE, RegionComparison, RegionTotals};

use crate::error::Result;

pub const AUTHORITY_TOTAL: &str = "authority_total";
pub const LEDGER_TOTAL: &str = "ledger_total";

/// Align both sets of regional totals, one line per region seen on either
/// side. A region missing from one side counts as zero there.
pub fn compare_totals(authority: &RegionTotals, ledger: &RegionTotals) -> Vec<RegionComparison> {
    let regions: BTreeSet<&String> = authority.keys().chain(ledger.keys()).collect();
    regions
        .into_iter()
        .map(|region| RegionComparison {
            region_code: region.clone(),
            authority_total: authority.get(region).copied().unwrap_or(0.0),
            ledger_total: ledger.get(region).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Comparison lines as a table of `region_code`, `authority_total`,
/// `ledger_total`.
pub fn comparison_frame(rows: &[RegionComparison]) -> Result<DataFrame> {
    let regions: Vec<&str> = rows.iter().map(|row| row.region_code.as_str()).collect();
    let authority: Vec<f64> = rows.iter().map(|row| row.authority_total).collect();
    let ledger: Vec<f64> = rows.iter().map(|row| row.ledger_total).collect();
    Ok(DataFrame::new(vec![
        Column::new(REGION_CODE.into(), regions),
        Column::new(AUTHORITY_TOTAL.into(), authority),
        Column::new(LEDGER_TOTAL.into(), ledger),
    ])?)
}
