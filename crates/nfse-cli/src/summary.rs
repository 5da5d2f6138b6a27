use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use nfse_model::TableStats;
use nfse_transform::data_utils::format_numeric;

use nfse_cli::types::RunSummary;

/// Tolerance below which a regional difference is shown as balanced.
const BALANCED_EPSILON: f64 = 0.005;

pub fn print_summary(summary: &RunSummary) {
    println!("Authority: {}", summary.authority_path.display());
    println!("Ledger: {}", summary.ledger_path.display());
    print_table_stats(summary);
    print_comparison(summary);
    print_dropped(summary);

    println!(
        "Unmatched authority records: {} (matched {}, ledger-only keys {})",
        summary.unmatched_rows, summary.matched_rows, summary.ledger_only_keys
    );
    if summary.unreadable_invoices > 0 {
        println!(
            "Listed without an invoice number (unreadable in the authority extract): {}",
            summary.unreadable_invoices
        );
    }
    if summary.dry_run {
        println!("Dry run: no files written");
    } else {
        for path in &summary.outputs {
            println!("Wrote {}", path.display());
        }
    }
}

fn print_table_stats(summary: &RunSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Loaded"),
        header_cell("Dropped"),
        header_cell("Duplicates"),
        header_cell("Rows"),
        header_cell("Not totalled"),
    ]);
    apply_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (name, stats) in [("authority", &summary.authority), ("ledger", &summary.ledger)] {
        table.add_row(stats_row(name, stats));
    }
    println!("{table}");
}

fn stats_row(name: &str, stats: &TableStats) -> Vec<Cell> {
    vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new(stats.loaded_rows),
        count_cell(stats.coercion_dropped, Color::Yellow),
        count_cell(stats.duplicates_removed, Color::Yellow),
        Cell::new(stats.final_rows),
        count_cell(stats.aggregate_skipped, Color::Yellow),
    ]
}

fn print_comparison(summary: &RunSummary) {
    if summary.comparison.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("UF"),
        header_cell("Authority"),
        header_cell("Ledger"),
        header_cell("Difference"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for index in 1..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut authority_sum = 0.0;
    let mut ledger_sum = 0.0;
    for row in &summary.comparison {
        authority_sum += row.authority_total;
        ledger_sum += row.ledger_total;
        table.add_row(vec![
            Cell::new(&row.region_code),
            Cell::new(format_numeric(row.authority_total)),
            Cell::new(format_numeric(row.ledger_total)),
            difference_cell(row.difference()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format_numeric(authority_sum)).add_attribute(Attribute::Bold),
        Cell::new(format_numeric(ledger_sum)).add_attribute(Attribute::Bold),
        difference_cell(authority_sum - ledger_sum).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_dropped(summary: &RunSummary) {
    if summary.dropped_by_column.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Dropped rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (column, count) in &summary.dropped_by_column {
        table.add_row(vec![Cell::new(column), count_cell(*count, Color::Yellow)]);
    }
    println!("{table}");
}

fn difference_cell(value: f64) -> Cell {
    if value.abs() < BALANCED_EPSILON {
        dim_cell(format_numeric(0.0))
    } else {
        Cell::new(format_numeric(value))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
