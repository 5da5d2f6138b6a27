//! Source loading entry points.
//!
//! The pipeline only sees the [`TableLoader`] trait; [`FileLoader`] is the
//! implementation backed by the files named in a [`ReconConfig`].

use std::path::Path;
use std::time::Instant;

use nfse_model::{ReconConfig, SourceConfig, SourceRole};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use crate::delimited::{DelimitedOptions, read_delimited};
use crate::error::Result;
use crate::workbook::read_workbook;

/// File layout of a source, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Spreadsheet,
    Delimited,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => Self::Spreadsheet,
            _ => Self::Delimited,
        }
    }
}

/// Supplies the two raw tables in their native schemas.
pub trait TableLoader {
    fn load(&self, role: SourceRole) -> Result<DataFrame>;

    fn load_authority(&self) -> Result<DataFrame> {
        self.load(SourceRole::Authority)
    }

    fn load_ledger(&self) -> Result<DataFrame> {
        self.load(SourceRole::Ledger)
    }
}

/// Loads both sources from the files described in the configuration.
#[derive(Debug, Clone)]
pub struct FileLoader {
    authority: SourceConfig,
    ledger: SourceConfig,
}

impl FileLoader {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            authority: config.authority.clone(),
            ledger: config.ledger.clone(),
        }
    }
}

impl TableLoader for FileLoader {
    fn load(&self, role: SourceRole) -> Result<DataFrame> {
        let source = match role {
            SourceRole::Authority => &self.authority,
            SourceRole::Ledger => &self.ledger,
        };
        let span = info_span!("load", table = %role, path = %source.path.display());
        let _guard = span.enter();
        let start = Instant::now();
        let df = read_source(source)?;
        info!(
            table = %role,
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "source loaded"
        );
        Ok(df)
    }
}

/// Read a single configured source, dispatching on its file kind.
pub fn read_source(source: &SourceConfig) -> Result<DataFrame> {
    match SourceKind::from_path(&source.path) {
        SourceKind::Spreadsheet => read_workbook(&source.path, source.sheet.as_deref()),
        SourceKind::Delimited => {
            let options = DelimitedOptions::from_source(source)?;
            read_delimited(&source.path, &options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(
            SourceKind::from_path(Path::new("data/dados_nfse_prefeitura.XLSX")),
            SourceKind::Spreadsheet
        );
        assert_eq!(
            SourceKind::from_path(Path::new("dados.ods")),
            SourceKind::Spreadsheet
        );
        assert_eq!(
            SourceKind::from_path(Path::new("data/dados_nfse_dominio.csv")),
            SourceKind::Delimited
        );
        assert_eq!(SourceKind::from_path(Path::new("export")), SourceKind::Delimited);
    }
}
