//! CLI argument definitions for the reconciliation tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use nfse_model::OutputFormat;

#[derive(Parser)]
#[command(
    name = "nfse-recon",
    version,
    about = "Reconcile municipal NFS-e records against the accounting ledger",
    long_about = "Reconcile the service invoices (NFS-e) registered with the municipal \
                  tax authority against the accounting ledger export.\n\n\
                  Lists authority invoices the ledger does not contain and compares \
                  invoiced totals per state (UF)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow client names and raw cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the reconciliation and write the follow-up list.
    Reconcile(ReconcileArgs),

    /// Show how the headers of both sources are normalized and mapped.
    Inspect(InspectArgs),
}

/// Source selection shared by every command.
#[derive(Parser)]
pub struct SourceArgs {
    /// TOML configuration file; values not given keep their defaults.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Authority extract (xlsx workbook or delimited text).
    #[arg(long = "authority", value_name = "PATH")]
    pub authority: Option<PathBuf>,

    /// Worksheet of the authority workbook.
    #[arg(long = "authority-sheet", value_name = "NAME")]
    pub authority_sheet: Option<String>,

    /// Ledger extract (delimited report or workbook).
    #[arg(long = "ledger", value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Banner lines above the ledger header.
    #[arg(long = "ledger-skip-rows", value_name = "N")]
    pub ledger_skip_rows: Option<usize>,
}

#[derive(Parser)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Directory for the output files.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base file name (without extension) of the follow-up list.
    #[arg(long = "output-name", value_name = "NAME")]
    pub output_name: Option<String>,

    /// Output file format.
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Write CSV files without the UTF-8 byte order mark.
    #[arg(long = "no-bom")]
    pub no_bom: bool,

    /// Also write both cleaned source tables.
    #[arg(long = "export-normalized")]
    pub export_normalized: bool,

    /// Fail when more rows than this are dropped as unparseable.
    #[arg(long = "max-dropped-rows", value_name = "N")]
    pub max_dropped_rows: Option<usize>,

    /// Run every stage and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write a machine-readable run summary to this path.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Xlsx,
    Both,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Csv => Self::Csv,
            OutputFormatArg::Xlsx => Self::Xlsx,
            OutputFormatArg::Both => Self::Both,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reconcile_flags_parse() {
        let cli = Cli::try_parse_from([
            "nfse-recon",
            "reconcile",
            "--ledger",
            "dominio.csv",
            "--format",
            "both",
            "--max-dropped-rows",
            "3",
            "--dry-run",
        ])
        .unwrap();
        let Command::Reconcile(args) = cli.command else {
            panic!("expected reconcile");
        };
        assert_eq!(args.sources.ledger, Some(PathBuf::from("dominio.csv")));
        assert_eq!(args.max_dropped_rows, Some(3));
        assert!(args.dry_run);
        assert_eq!(
            args.format.map(OutputFormat::from),
            Some(OutputFormat::Both)
        );
    }
}
