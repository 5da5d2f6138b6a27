//! NFS-e reconciliation stages.
//!
//! This crate holds the pipeline that turns the two raw source tables into
//! the follow-up list and the regional comparison:
//!
//! - **columns**: header normalization (accents, separators, case)
//! - **schema**: native column names onto the canonical fields
//! - **coerce**: typed numeric columns, failing rows dropped and reported
//! - **dedupe**: one row per invoice number
//! - **keys**: comparable client names and region codes
//! - **reconcile**: authority rows missing from the ledger
//! - **aggregate** / **compare**: per-region totals side by side
//! - **pipeline**: all of the above for one [`nfse_model::ReconConfig`]
//!
//! Every stage takes a `&DataFrame` and returns a new one.

pub mod aggregate;
pub mod coerce;
pub mod columns;
pub mod compare;
pub mod data_utils;
pub mod dedupe;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod reconcile;
pub mod schema;

pub use aggregate::region_totals;
pub use coerce::coerce_columns;
pub use columns::{normalize_column_name, normalize_columns};
pub use compare::{AUTHORITY_TOTAL, LEDGER_TOTAL, compare_totals, comparison_frame};
pub use dedupe::dedupe_by_key;
pub use error::{Result, TransformError};
pub use keys::{standardize_client, standardize_keys, standardize_region};
pub use pipeline::{PreparedTable, ReconciliationOutcome, prepare_table, run_pipeline};
pub use reconcile::{ORIGIN, Reconciliation, UnreadableInvoice, reconcile};
pub use schema::{map_to_canonical, mapped_field};
