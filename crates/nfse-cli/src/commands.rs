use std::fs;

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Color, Table};
use tracing::info;

use nfse_ingest::{FileLoader, TableLoader};
use nfse_model::{ReconConfig, SourceRole};
use nfse_output::FileSink;

use crate::cli::{InspectArgs, ReconcileArgs, SourceArgs};
use crate::summary::{align_column, apply_table_style, dim_cell, header_cell};
use nfse_cli::inspect::inspect_rows;
use nfse_cli::pipeline::{RunOptions, run_reconciliation};
use nfse_cli::types::RunSummary;

pub fn run_reconcile(args: &ReconcileArgs) -> Result<RunSummary> {
    let mut config = load_config(&args.sources)?;
    if let Some(dir) = &args.output_dir {
        config.output.dir.clone_from(dir);
    }
    if let Some(name) = &args.output_name {
        config.output.base_name.clone_from(name);
    }
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if args.no_bom {
        config.output.bom = false;
    }
    if args.export_normalized {
        config.output.export_normalized = true;
    }
    config.validate().context("invalid configuration")?;

    let options = RunOptions {
        export_normalized: config.output.export_normalized,
        max_dropped_rows: args.max_dropped_rows,
        dry_run: args.dry_run,
    };
    let loader = FileLoader::new(&config);
    let mut sink = FileSink::new(&config.output);
    let outcome = run_reconciliation(&config, &loader, &mut sink, &options)?;

    let summary = RunSummary::from_outcome(
        &outcome,
        config.authority.path.clone(),
        config.ledger.path.clone(),
        sink.written_files().to_vec(),
        args.dry_run,
    );
    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        fs::write(path, json)
            .with_context(|| format!("write run summary {}", path.display()))?;
        info!(path = %path.display(), "run summary written");
    }
    Ok(summary)
}

/// Print, per source, how each raw header is normalized and which canonical
/// field it feeds.
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let config = load_config(&args.sources)?;
    config.validate().context("invalid configuration")?;
    let loader = FileLoader::new(&config);
    for role in [SourceRole::Authority, SourceRole::Ledger] {
        let source = config.source(role);
        let df = loader
            .load(role)
            .with_context(|| format!("load {role} extract {}", source.path.display()))?;
        println!("{role}: {} ({} rows)", source.path.display(), df.height());

        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Column"),
            header_cell("Normalized"),
            header_cell("Field"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 2, CellAlignment::Center);
        for row in inspect_rows(&df, source) {
            let field_cell = match row.field {
                Some(field) => Cell::new(field.as_str()).fg(Color::Green),
                None => dim_cell("-"),
            };
            table.add_row(vec![Cell::new(row.raw), Cell::new(row.normalized), field_cell]);
        }
        println!("{table}");
    }
    Ok(())
}

fn load_config(args: &SourceArgs) -> Result<ReconConfig> {
    let mut config = match &args.config {
        Some(path) => ReconConfig::from_path(path)
            .with_context(|| format!("load configuration {}", path.display()))?,
        None => ReconConfig::default(),
    };
    if let Some(path) = &args.authority {
        config.authority.path.clone_from(path);
    }
    if let Some(sheet) = &args.authority_sheet {
        config.authority.sheet = Some(sheet.clone());
    }
    if let Some(path) = &args.ledger {
        config.ledger.path.clone_from(path);
    }
    if let Some(skip_rows) = args.ledger_skip_rows {
        config.ledger.skip_rows = skip_rows;
    }
    Ok(config)
}
