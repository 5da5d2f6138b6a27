//! Run configuration.
//!
//! A [`ReconConfig`] carries everything one reconciliation run needs: where
//! each source lives, how its file is laid out, how its native headers map to
//! the canonical schema, and where results go. The defaults reproduce the
//! layout of the authority workbook and the ledger report as exported today.
//!
//! TOML files only need to mention the values they change; they are merged
//! over [`ReconConfig::default`] key by key before deserialization.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalField, REQUIRED_FIELDS, SourceRole};
use crate::error::{ModelError, Result};

/// Rows of the ledger report containing any of these phrases are banners or
/// section totals, not invoices.
pub const DEFAULT_LEDGER_MARKER_PHRASES: [&str; 4] = [
    "ACOMPANHAMENTO DE SERVIÇOS",
    "Sistema licenciado para",
    "Total Estado",
    "Total Geral",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub authority: SourceConfig,
    pub ledger: SourceConfig,
    pub output: OutputConfig,
}

/// Location, layout and column mapping of one source extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Worksheet to read from spreadsheet sources. First sheet when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Lines to discard before the header line (delimited text only).
    pub skip_rows: usize,
    pub delimiter: char,
    /// WHATWG encoding label, e.g. `utf-8` or `iso-8859-1`.
    pub encoding: String,
    /// Rows containing any of these substrings are dropped on load.
    pub marker_phrases: Vec<String>,
    pub columns: ColumnMapping,
    /// Canonical fields coerced to 64-bit integers.
    pub coerce_integer: Vec<CanonicalField>,
    /// Canonical fields coerced to floats (decimal comma accepted).
    pub coerce_float: Vec<CanonicalField>,
}

/// Normalized native column name for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    pub client: String,
    pub invoice_number: String,
    pub region_code: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// File stem of the unmatched-record output, without extension.
    pub base_name: String,
    pub format: OutputFormat,
    /// Prefix CSV files with a UTF-8 byte order mark.
    pub bom: bool,
    /// Also write the cleaned source tables next to the results.
    pub export_normalized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
    Both,
}

impl OutputFormat {
    pub fn writes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn writes_xlsx(self) -> bool {
        matches!(self, Self::Xlsx | Self::Both)
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            authority: SourceConfig::default_authority(),
            ledger: SourceConfig::default_ledger(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            base_name: "clientes_para_busca".to_string(),
            format: OutputFormat::Csv,
            bom: true,
            export_normalized: false,
        }
    }
}

impl SourceConfig {
    /// Layout of the authority workbook (`Resultado` sheet).
    pub fn default_authority() -> Self {
        Self {
            path: PathBuf::from("data/dados_nfse_prefeitura.xlsx"),
            sheet: Some("Resultado".to_string()),
            skip_rows: 0,
            delimiter: ',',
            encoding: "utf-8".to_string(),
            marker_phrases: Vec::new(),
            columns: ColumnMapping {
                client: "nome_razao_social_tomador".to_string(),
                invoice_number: "numero".to_string(),
                region_code: "uf_tomador".to_string(),
                amount: "valor_servicos".to_string(),
            },
            coerce_integer: Vec::new(),
            coerce_float: Vec::new(),
        }
    }

    /// Layout of the ledger services report.
    pub fn default_ledger() -> Self {
        Self {
            path: PathBuf::from("data/dados_nfse_dominio.csv"),
            sheet: None,
            skip_rows: 5,
            delimiter: ';',
            encoding: "iso-8859-1".to_string(),
            marker_phrases: DEFAULT_LEDGER_MARKER_PHRASES
                .iter()
                .map(|phrase| (*phrase).to_string())
                .collect(),
            columns: ColumnMapping {
                client: "cliente".to_string(),
                invoice_number: "nota".to_string(),
                region_code: "uf".to_string(),
                amount: "valor_contabil".to_string(),
            },
            coerce_integer: vec![CanonicalField::InvoiceNumber],
            coerce_float: vec![CanonicalField::Amount],
        }
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(u32::from(self.delimiter)).ok()
    }

    fn validate(&self, role: SourceRole) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ModelError::ConfigValidation(format!("{role}.path is empty")));
        }
        if self.delimiter_byte().is_none_or(|byte| !byte.is_ascii()) {
            return Err(ModelError::ConfigValidation(format!(
                "{role}.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.encoding.trim().is_empty() {
            return Err(ModelError::ConfigValidation(format!(
                "{role}.encoding is empty"
            )));
        }
        let mut seen = BTreeSet::new();
        for field in REQUIRED_FIELDS {
            let native = self.columns.get(field);
            if native.trim().is_empty() {
                return Err(ModelError::ConfigValidation(format!(
                    "{role}.columns.{field} is empty"
                )));
            }
            if !seen.insert(native) {
                return Err(ModelError::ConfigValidation(format!(
                    "{role}.columns maps '{native}' to more than one field"
                )));
            }
        }
        if let Some(field) = self
            .coerce_integer
            .iter()
            .find(|field| self.coerce_float.contains(field))
        {
            return Err(ModelError::ConfigValidation(format!(
                "{role}: '{field}' is listed in both coerce_integer and coerce_float"
            )));
        }
        Ok(())
    }
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Client => &self.client,
            CanonicalField::InvoiceNumber => &self.invoice_number,
            CanonicalField::RegionCode => &self.region_code,
            CanonicalField::Amount => &self.amount,
        }
    }

    /// `(native, canonical)` pairs in canonical field order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, CanonicalField)> {
        REQUIRED_FIELDS
            .into_iter()
            .map(move |field| (self.get(field), field))
    }
}

impl ReconConfig {
    pub fn source(&self, role: SourceRole) -> &SourceConfig {
        match role {
            SourceRole::Authority => &self.authority,
            SourceRole::Ledger => &self.ledger,
        }
    }

    /// Load a TOML file and merge it over the defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|error| match error {
            ModelError::ConfigParse { message, .. } => ModelError::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let overlay: toml::Table = text.parse().map_err(|error: toml::de::Error| {
            ModelError::ConfigParse {
                path: PathBuf::from("<inline>"),
                message: error.message().to_string(),
            }
        })?;
        let mut base = match toml::Value::try_from(Self::default()) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) | Err(_) => {
                return Err(ModelError::ConfigValidation(
                    "default configuration is not representable as TOML".to_string(),
                ));
            }
        };
        merge_tables(&mut base, overlay);
        let config: Self = toml::Value::Table(base).try_into().map_err(
            |error: toml::de::Error| ModelError::ConfigParse {
                path: PathBuf::from("<inline>"),
                message: error.message().to_string(),
            },
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.authority.validate(SourceRole::Authority)?;
        self.ledger.validate(SourceRole::Ledger)?;
        let base_name = self.output.base_name.trim();
        if base_name.is_empty() {
            return Err(ModelError::ConfigValidation(
                "output.base_name is empty".to_string(),
            ));
        }
        if base_name.contains(['/', '\\']) {
            return Err(ModelError::ConfigValidation(format!(
                "output.base_name must be a file stem, got '{base_name}'"
            )));
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ReconConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ReconConfig::from_toml_str(
            r#"
            [ledger]
            path = "exports/ledger.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger.path, PathBuf::from("exports/ledger.csv"));
        assert_eq!(config.ledger.skip_rows, 5);
        assert_eq!(config.ledger.delimiter, ';');
        assert_eq!(config.ledger.columns.invoice_number, "nota");
        assert_eq!(config.authority, SourceConfig::default_authority());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let error = ReconConfig::from_toml_str("[output]\nbasename = \"x\"\n").unwrap_err();
        assert!(matches!(error, ModelError::ConfigParse { .. }));
    }

    #[test]
    fn multibyte_delimiter_is_rejected() {
        let error = ReconConfig::from_toml_str("[ledger]\ndelimiter = \"§\"\n").unwrap_err();
        assert!(matches!(error, ModelError::ConfigValidation(_)));
    }

    #[test]
    fn duplicate_native_column_is_rejected() {
        let error = ReconConfig::from_toml_str(
            "[authority.columns]\nclient = \"numero\"\n",
        )
        .unwrap_err();
        assert!(error.to_string().contains("more than one field"));
    }

    #[test]
    fn output_format_flags() {
        assert!(OutputFormat::Both.writes_csv());
        assert!(OutputFormat::Both.writes_xlsx());
        assert!(!OutputFormat::Csv.writes_xlsx());
        assert!(!OutputFormat::Xlsx.writes_csv());
    }
}
