//! Source loaders for NFS-e reconciliation.
//!
//! This crate turns the two exported extracts into Polars DataFrames in their
//! native schema. Nothing here renames or coerces columns; that belongs to
//! `nfse-transform`.
//!
//! # Features
//!
//! - **Spreadsheets**: the authority workbook, one worksheet, numeric columns typed
//! - **Delimited reports**: leading banner lines skipped, any text encoding,
//!   marker rows (section totals, licence banners) filtered out
//! - **Loader trait**: [`TableLoader`] decouples the pipeline from files
//!
//! # Example
//!
//! ```ignore
//! use nfse_ingest::{FileLoader, TableLoader};
//! use nfse_model::ReconConfig;
//!
//! let loader = FileLoader::new(&ReconConfig::default());
//! let authority = loader.load_authority()?;
//! let ledger = loader.load_ledger()?;
//! ```

mod delimited;
mod error;
mod frame;
mod loader;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Readers ===
pub use delimited::{DelimitedOptions, read_delimited};
pub use workbook::read_workbook;

// === Loading ===
pub use loader::{FileLoader, SourceKind, TableLoader, read_source};
