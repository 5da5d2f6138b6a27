//! Tests for loading reconciliation configuration files.

use std::io::Write;
use std::path::PathBuf;

use nfse_model::{CanonicalField, ModelError, OutputFormat, ReconConfig, SourceRole};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
fn defaults_match_exported_layouts() {
    let config = ReconConfig::default();
    assert_eq!(config.authority.sheet.as_deref(), Some("Resultado"));
    assert_eq!(config.authority.columns.client, "nome_razao_social_tomador");
    assert_eq!(config.ledger.encoding, "iso-8859-1");
    assert_eq!(config.ledger.skip_rows, 5);
    assert_eq!(config.ledger.coerce_integer, vec![CanonicalField::InvoiceNumber]);
    assert_eq!(config.ledger.coerce_float, vec![CanonicalField::Amount]);
    assert_eq!(config.ledger.marker_phrases.len(), 4);
    assert_eq!(config.output.base_name, "clientes_para_busca");
    assert!(config.output.bom);
}

#[test]
fn file_overrides_are_merged() {
    let file = write_config(
        r#"
[authority]
path = "in/prefeitura.xlsx"

[authority.columns]
amount = "valor_liquido"

[output]
dir = "out"
format = "both"
"#,
    );
    let config = ReconConfig::from_path(file.path()).unwrap();
    assert_eq!(config.authority.path, PathBuf::from("in/prefeitura.xlsx"));
    assert_eq!(config.authority.columns.amount, "valor_liquido");
    assert_eq!(config.authority.columns.invoice_number, "numero");
    assert_eq!(config.source(SourceRole::Authority).sheet.as_deref(), Some("Resultado"));
    assert_eq!(config.output.dir, PathBuf::from("out"));
    assert_eq!(config.output.format, OutputFormat::Both);
    assert_eq!(config.output.base_name, "clientes_para_busca");
}

#[test]
fn missing_file_is_reported() {
    let error = ReconConfig::from_path(std::path::Path::new("/nonexistent/recon.toml")).unwrap_err();
    assert!(matches!(error, ModelError::ConfigRead { .. }));
}

#[test]
fn parse_error_names_the_file() {
    let file = write_config("[output\n");
    let error = ReconConfig::from_path(file.path()).unwrap_err();
    match error {
        ModelError::ConfigParse { path, .. } => assert_eq!(path, file.path()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn base_name_must_be_a_stem() {
    let error = ReconConfig::from_toml_str("[output]\nbase_name = \"out/result\"\n").unwrap_err();
    assert!(matches!(error, ModelError::ConfigValidation(_)));
}

#[test]
fn conflicting_coercions_are_rejected() {
    let error =
        ReconConfig::from_toml_str("[ledger]\ncoerce_float = [\"amount\", \"invoice_number\"]\n")
            .unwrap_err();
    assert!(error.to_string().contains("invoice_number"));
}
