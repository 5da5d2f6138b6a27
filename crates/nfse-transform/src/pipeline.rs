//! Pipeline entry point.
//!
//! Runs every stage for both sources and returns the unmatched-record table,
//! the regional comparison and the per-table diagnostics. Nothing here reads
//! or writes files.

use std::collections::BTreeSet;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use nfse_model::{
    AMOUNT, CoercionMode, CoercionReport, INVOICE_NUMBER, REGION_CODE, ReconConfig,
    RegionComparison, RegionTotals, SourceConfig, SourceRole, TableStats,
};

use crate::aggregate::region_totals;
use crate::coerce::coerce_columns;
use crate::columns::normalize_columns;
use crate::compare::{compare_totals, comparison_frame};
use crate::dedupe::dedupe_by_key;
use crate::error::Result;
use crate::keys::standardize_keys;
use crate::reconcile::{UnreadableInvoice, reconcile};
use crate::schema::map_to_canonical;

/// One source after normalization, coercion, de-duplication and key
/// standardization.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub role: SourceRole,
    pub frame: DataFrame,
    pub coercion: CoercionReport,
    pub stats: TableStats,
    pub totals: RegionTotals,
}

/// Everything one reconciliation run produces.
#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    pub authority: PreparedTable,
    pub ledger: PreparedTable,
    /// `client`, `invoice_number`, `region_code` of authority rows the ledger
    /// lacks, sorted.
    pub unmatched: DataFrame,
    /// Authority table with its `origin` marker column.
    pub tagged_authority: DataFrame,
    pub comparison: Vec<RegionComparison>,
    pub comparison_frame: DataFrame,
    pub matched_rows: usize,
    pub ledger_only_keys: usize,
    /// Authority rows listed with a null invoice number.
    pub unreadable_invoices: Vec<UnreadableInvoice>,
}

impl ReconciliationOutcome {
    /// Rows dropped by coercion across both sources.
    pub fn coercion_dropped(&self) -> usize {
        self.authority.coercion.dropped_count() + self.ledger.coercion.dropped_count()
    }

    pub fn table(&self, role: SourceRole) -> &PreparedTable {
        match role {
            SourceRole::Authority => &self.authority,
            SourceRole::Ledger => &self.ledger,
        }
    }
}

/// Run every stage on the two raw tables.
pub fn run_pipeline(
    config: &ReconConfig,
    authority: &DataFrame,
    ledger: &DataFrame,
) -> Result<ReconciliationOutcome> {
    let span = info_span!("pipeline");
    let _guard = span.enter();
    let start = Instant::now();

    let authority = prepare_table(authority, &config.authority, SourceRole::Authority)?;
    let ledger = prepare_table(ledger, &config.ledger, SourceRole::Ledger)?;

    let joined = info_span!("reconcile").in_scope(|| reconcile(&authority.frame, &ledger.frame))?;
    let comparison = compare_totals(&authority.totals, &ledger.totals);
    let comparison_table = comparison_frame(&comparison)?;

    info!(
        unmatched_rows = joined.unmatched.height(),
        matched_rows = joined.matched_rows,
        ledger_only_keys = joined.ledger_only_keys,
        regions = comparison.len(),
        coercion_dropped = authority.coercion.dropped_count() + ledger.coercion.dropped_count(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(ReconciliationOutcome {
        authority,
        ledger,
        unmatched: joined.unmatched,
        tagged_authority: joined.tagged,
        comparison,
        comparison_frame: comparison_table,
        matched_rows: joined.matched_rows,
        ledger_only_keys: joined.ledger_only_keys,
        unreadable_invoices: joined.unreadable_invoices,
    })
}

/// Normalize one raw source table.
pub fn prepare_table(
    raw: &DataFrame,
    source: &SourceConfig,
    role: SourceRole,
) -> Result<PreparedTable> {
    let span = info_span!("prepare", table = %role);
    let _guard = span.enter();
    let start = Instant::now();
    let mut stats = TableStats {
        loaded_rows: raw.height(),
        ..TableStats::default()
    };

    let normalized = normalize_columns(raw, role)?;
    let canonical = map_to_canonical(&normalized, &source.columns, role)?;

    let mut coercion = CoercionReport::default();
    let mut frame = canonical;
    // Row positions of `frame` in the loaded table.
    let mut positions: Vec<usize> = (0..frame.height()).collect();
    for (fields, mode) in [
        (&source.coerce_integer, CoercionMode::Integer),
        (&source.coerce_float, CoercionMode::Float),
    ] {
        if fields.is_empty() {
            continue;
        }
        let columns: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
        let (coerced, mut report) = coerce_columns(&frame, &columns, mode, role)?;
        let dropped: BTreeSet<usize> = report.dropped.iter().map(|row| row.row).collect();
        for row in &mut report.dropped {
            row.row = positions[row.row];
        }
        positions = positions
            .into_iter()
            .enumerate()
            .filter_map(|(idx, position)| (!dropped.contains(&idx)).then_some(position))
            .collect();
        frame = coerced;
        coercion.extend(report);
    }
    stats.coercion_dropped = coercion.dropped_count();

    let (deduped, removed) = dedupe_by_key(&frame, INVOICE_NUMBER, role)?;
    stats.duplicates_removed = removed;
    let frame = standardize_keys(&deduped, role)?;
    stats.final_rows = frame.height();

    let (totals, skipped) = region_totals(&frame, REGION_CODE, AMOUNT, role)?;
    stats.aggregate_skipped = skipped;

    debug!(
        table = %role,
        input_rows = stats.loaded_rows,
        output_rows = stats.final_rows,
        dropped_rows = stats.coercion_dropped,
        duplicates_removed = stats.duplicates_removed,
        duration_ms = start.elapsed().as_millis(),
        "table prepared"
    );
    Ok(PreparedTable {
        role,
        frame,
        coercion,
        stats,
        totals,
    })
}
