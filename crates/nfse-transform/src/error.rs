use nfse_model::SourceRole;
use thiserror::Error;

/// Structural failures of the pipeline stages.
///
/// Rows that fail coercion are not errors; they are recorded in a
/// [`nfse_model::CoercionReport`].
#[derive(Debug, Error)]
pub enum TransformError {
    /// A required column is absent from a table.
    #[error("{table} table has no column '{column}'")]
    MissingColumn { table: SourceRole, column: String },

    /// Two columns end up with the same name.
    #[error("{table} table has more than one column named '{column}'")]
    DuplicateColumn { table: SourceRole, column: String },

    /// Two column-mapping entries name the same normalized header.
    #[error("{table} column mapping assigns '{column}' to more than one field")]
    AmbiguousMapping { table: SourceRole, column: String },

    /// A stage was asked to work on no columns at all.
    #[error("column list is empty")]
    EmptyColumnList,

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
