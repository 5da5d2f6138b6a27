//! Load, reconcile and emit, wired to the loader and sink traits.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, info_span, warn};

use nfse_ingest::TableLoader;
use nfse_model::{ReconConfig, SourceRole};
use nfse_output::ReconciliationSink;
use nfse_transform::{PreparedTable, ReconciliationOutcome, run_pipeline};

use crate::logging::redact_value;

/// Switches of one run that are not part of the configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Also hand both cleaned tables to the sink.
    pub export_normalized: bool,
    /// Fail before writing anything when more rows than this were dropped.
    pub max_dropped_rows: Option<usize>,
    /// Run every stage but emit nothing.
    pub dry_run: bool,
}

/// Run one reconciliation end to end.
///
/// The sink receives nothing unless every stage succeeded and the dropped-row
/// limit holds.
pub fn run_reconciliation<L, S>(
    config: &ReconConfig,
    loader: &L,
    sink: &mut S,
    options: &RunOptions,
) -> Result<ReconciliationOutcome>
where
    L: TableLoader,
    S: ReconciliationSink,
{
    let span = info_span!("reconciliation");
    let _guard = span.enter();
    let start = Instant::now();

    let authority = loader
        .load_authority()
        .with_context(|| format!("load authority extract {}", config.authority.path.display()))?;
    let ledger = loader
        .load_ledger()
        .with_context(|| format!("load ledger extract {}", config.ledger.path.display()))?;

    let outcome = run_pipeline(config, &authority, &ledger).context("reconcile sources")?;
    log_dropped_rows(&outcome.authority);
    log_dropped_rows(&outcome.ledger);
    for invoice in &outcome.unreadable_invoices {
        warn!(
            row = invoice.row,
            client = redact_value(&invoice.client),
            value = redact_value(&invoice.value),
            "authority invoice number unreadable, listed without it"
        );
    }

    let dropped = outcome.coercion_dropped();
    if let Some(limit) = options.max_dropped_rows
        && dropped > limit
    {
        bail!("{dropped} rows were dropped as unparseable, more than the allowed {limit}");
    }

    if options.dry_run {
        info!(
            unmatched_rows = outcome.unmatched.height(),
            "dry run, no files written"
        );
    } else {
        sink.emit_unmatched(&outcome.unmatched)
            .context("write unmatched records")?;
        sink.emit_comparison(&outcome.comparison_frame)
            .context("write regional comparison")?;
        if options.export_normalized {
            for role in [SourceRole::Authority, SourceRole::Ledger] {
                sink.emit_normalized(role.as_str(), &outcome.table(role).frame)
                    .with_context(|| format!("write normalized {role} table"))?;
            }
        }
    }

    info!(
        unmatched_rows = outcome.unmatched.height(),
        coercion_dropped = dropped,
        duration_ms = start.elapsed().as_millis(),
        "reconciliation complete"
    );
    Ok(outcome)
}

fn log_dropped_rows(table: &PreparedTable) {
    if table.coercion.is_empty() {
        return;
    }
    for (column, count) in table.coercion.counts_by_column() {
        warn!(table = %table.role, column, count, "rows dropped: value not numeric");
    }
    for row in &table.coercion.dropped {
        debug!(
            table = %table.role,
            row = row.row,
            column = %row.column,
            mode = %row.mode,
            value = redact_value(&row.value),
            "dropped row"
        );
    }
}
