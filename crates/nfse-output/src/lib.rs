//! Output sinks for NFS-e reconciliation results.
//!
//! - **delimited**: CSV rendering, optional UTF-8 byte order mark
//! - **xlsx**: single-sheet workbooks
//! - **sink**: the [`ReconciliationSink`] trait and the file-backed [`FileSink`]

pub mod delimited;
pub mod error;
pub mod sink;
pub mod xlsx;

pub use delimited::{UTF8_BOM, write_csv};
pub use error::{OutputError, Result};
pub use sink::{FileSink, ReconciliationSink};
pub use xlsx::{COMPARISON_SHEET, RESULT_SHEET, write_xlsx};
