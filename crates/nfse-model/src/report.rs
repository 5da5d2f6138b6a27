//! Diagnostics produced by the pipeline stages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sum of amounts per region code, ordered by region.
pub type RegionTotals = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionMode {
    /// Parse as a 64-bit integer.
    Integer,
    /// Parse as a float, accepting a decimal comma.
    Float,
}

impl fmt::Display for CoercionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
        }
    }
}

/// A row removed because one of its values could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRow {
    /// Zero-based position of the row in the table handed to the coercer.
    pub row: usize,
    pub column: String,
    pub mode: CoercionMode,
    /// Raw text that failed to parse (empty for nulls).
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionReport {
    pub dropped: Vec<DroppedRow>,
}

impl CoercionReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }

    /// Dropped rows per column, in column order.
    pub fn counts_by_column(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.dropped {
            *counts.entry(row.column.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn extend(&mut self, other: CoercionReport) {
        self.dropped.extend(other.dropped);
    }
}

/// Row counts of one source as it moves through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub loaded_rows: usize,
    pub coercion_dropped: usize,
    pub duplicates_removed: usize,
    pub final_rows: usize,
    /// Rows left out of the regional totals (empty region or unreadable amount).
    pub aggregate_skipped: usize,
}

/// One line of the regional comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionComparison {
    pub region_code: String,
    pub authority_total: f64,
    pub ledger_total: f64,
}

impl RegionComparison {
    /// Authority total minus ledger total.
    pub fn difference(&self) -> f64 {
        self.authority_total - self.ledger_total
    }
}
