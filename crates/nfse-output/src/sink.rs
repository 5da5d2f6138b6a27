//! Result sinks.
//!
//! The pipeline hands its tables to a [`ReconciliationSink`] only after every
//! stage has succeeded. [`FileSink`] writes them next to each other in one
//! directory, each file first to a temporary sibling that is then renamed
//! over the destination.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use nfse_model::{OutputConfig, OutputFormat};

use crate::delimited::write_csv;
use crate::error::{OutputError, Result};
use crate::xlsx::{COMPARISON_SHEET, RESULT_SHEET, write_xlsx};

/// Receives the result tables of one run.
pub trait ReconciliationSink {
    /// Authority records with no ledger counterpart.
    fn emit_unmatched(&mut self, df: &DataFrame) -> Result<()>;

    /// Regional totals side by side.
    fn emit_comparison(&mut self, df: &DataFrame) -> Result<()>;

    /// A cleaned source table, written only when asked for.
    fn emit_normalized(&mut self, name: &str, df: &DataFrame) -> Result<()>;
}

/// Writes result tables as CSV, XLSX or both into one directory.
///
/// File stems: `<base_name>` for the unmatched records,
/// `<base_name>_comparison` for the comparison, `<base_name>_<name>` for
/// normalized source tables.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    base_name: String,
    format: OutputFormat,
    bom: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            base_name: config.base_name.trim().to_string(),
            format: config.format,
            bom: config.bom,
            written: Vec::new(),
        }
    }

    /// Files written so far, in write order.
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    /// Paths the sink writes for `stem`, in write order.
    pub fn planned_paths(&self, stem: &str) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if self.format.writes_csv() {
            paths.push(self.dir.join(format!("{stem}.csv")));
        }
        if self.format.writes_xlsx() {
            paths.push(self.dir.join(format!("{stem}.xlsx")));
        }
        paths
    }

    pub fn unmatched_stem(&self) -> String {
        self.base_name.clone()
    }

    pub fn comparison_stem(&self) -> String {
        format!("{}_comparison", self.base_name)
    }

    pub fn normalized_stem(&self, name: &str) -> String {
        format!("{}_{name}", self.base_name)
    }

    fn write_table(&mut self, stem: &str, sheet: &str, df: &DataFrame) -> Result<()> {
        let start = Instant::now();
        fs::create_dir_all(&self.dir).map_err(|source| OutputError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let bom = self.bom;
        for path in self.planned_paths(stem) {
            let is_xlsx = path.extension().is_some_and(|ext| ext == "xlsx");
            replace_atomically(&path, |tmp| {
                if is_xlsx {
                    write_xlsx(tmp, df, sheet).map_err(|error| OutputError::Xlsx {
                        path: path.clone(),
                        message: error.to_string(),
                    })
                } else {
                    let file = File::create(tmp).map_err(|source| OutputError::Write {
                        path: tmp.to_path_buf(),
                        source,
                    })?;
                    write_csv(BufWriter::new(file), df, bom).map_err(|error| OutputError::Csv {
                        path: path.clone(),
                        message: error.to_string(),
                    })
                }
            })?;
            self.written.push(path);
        }
        debug!(
            stem,
            rows = df.height(),
            duration_ms = start.elapsed().as_millis(),
            "table written"
        );
        Ok(())
    }
}

impl ReconciliationSink for FileSink {
    fn emit_unmatched(&mut self, df: &DataFrame) -> Result<()> {
        let stem = self.unmatched_stem();
        self.write_table(&stem, RESULT_SHEET, df)?;
        info!(rows = df.height(), dir = %self.dir.display(), stem = %stem, "unmatched records written");
        Ok(())
    }

    fn emit_comparison(&mut self, df: &DataFrame) -> Result<()> {
        let stem = self.comparison_stem();
        self.write_table(&stem, COMPARISON_SHEET, df)
    }

    fn emit_normalized(&mut self, name: &str, df: &DataFrame) -> Result<()> {
        let stem = self.normalized_stem(name);
        self.write_table(&stem, name, df)
    }
}

/// Run `write` against `<path>.tmp`, then rename it over `path`.
///
/// On failure the temporary file is removed and `path` is left untouched.
fn replace_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    if let Err(error) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(error);
    }
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        OutputError::Replace {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(format: OutputFormat) -> FileSink {
        FileSink::new(&OutputConfig {
            dir: PathBuf::from("out"),
            base_name: " clientes_para_busca ".to_string(),
            format,
            ..OutputConfig::default()
        })
    }

    #[test]
    fn stems_follow_base_name() {
        let sink = sink(OutputFormat::Csv);
        assert_eq!(sink.unmatched_stem(), "clientes_para_busca");
        assert_eq!(sink.comparison_stem(), "clientes_para_busca_comparison");
        assert_eq!(sink.normalized_stem("ledger"), "clientes_para_busca_ledger");
    }

    #[test]
    fn planned_paths_per_format() {
        let both = sink(OutputFormat::Both).planned_paths("x");
        assert_eq!(both, vec![PathBuf::from("out/x.csv"), PathBuf::from("out/x.xlsx")]);
        let xlsx = sink(OutputFormat::Xlsx).planned_paths("x");
        assert_eq!(xlsx, vec![PathBuf::from("out/x.xlsx")]);
    }
}
