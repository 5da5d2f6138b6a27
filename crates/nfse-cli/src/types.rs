use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use nfse_model::{RegionComparison, TableStats};
use nfse_transform::ReconciliationOutcome;

/// What one `reconcile` run did, printed as tables and optionally as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub authority_path: PathBuf,
    pub ledger_path: PathBuf,
    pub authority: TableStats,
    pub ledger: TableStats,
    pub unmatched_rows: usize,
    pub matched_rows: usize,
    pub ledger_only_keys: usize,
    /// Unmatched authority rows listed without an invoice number.
    pub unreadable_invoices: usize,
    pub comparison: Vec<RegionComparison>,
    /// Coercion drops per `table.column`.
    pub dropped_by_column: BTreeMap<String, usize>,
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn from_outcome(
        outcome: &ReconciliationOutcome,
        authority_path: PathBuf,
        ledger_path: PathBuf,
        outputs: Vec<PathBuf>,
        dry_run: bool,
    ) -> Self {
        let mut dropped_by_column = BTreeMap::new();
        for table in [&outcome.authority, &outcome.ledger] {
            for (column, count) in table.coercion.counts_by_column() {
                dropped_by_column.insert(format!("{}.{column}", table.role), count);
            }
        }
        Self {
            authority_path,
            ledger_path,
            authority: outcome.authority.stats.clone(),
            ledger: outcome.ledger.stats.clone(),
            unmatched_rows: outcome.unmatched.height(),
            matched_rows: outcome.matched_rows,
            ledger_only_keys: outcome.ledger_only_keys,
            unreadable_invoices: outcome.unreadable_invoices.len(),
            comparison: outcome.comparison.clone(),
            dropped_by_column,
            outputs,
            dry_run,
        }
    }

    pub fn coercion_dropped(&self) -> usize {
        self.authority.coercion_dropped + self.ledger.coercion_dropped
    }
}
