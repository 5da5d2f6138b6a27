pub mod canonical;
pub mod config;
pub mod error;
pub mod report;

pub use canonical::{
    AMOUNT, CLIENT, CanonicalField, INVOICE_NUMBER, Origin, REGION_CODE, REQUIRED_FIELDS,
    SourceRole,
};
pub use config::{ColumnMapping, OutputConfig, OutputFormat, ReconConfig, SourceConfig};
pub use error::{ModelError, Result};
pub use report::{
    CoercionMode, CoercionReport, DroppedRow, RegionComparison, RegionTotals, TableStats,
};
