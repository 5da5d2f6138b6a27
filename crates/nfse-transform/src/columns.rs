//! Column header normalization.
//!
//! Both extracts are exported with human-oriented headers ("Valor Contábil",
//! "Nome/Razão Social Tomador"). Every header is reduced to a lower-case,
//! accent-free identifier before anything else looks at the table.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use nfse_model::SourceRole;

use crate::data_utils::column_names;
use crate::error::{Result, TransformError};

/// Normalize one raw column name.
///
/// Lower-case, decompose (NFD) and drop nonspacing marks, trim, turn spaces
/// and slashes into `_`, drop parentheses, trim again. Lower-casing comes
/// first because it can itself produce combining marks (`İ` → `i̇`).
///
/// ```
/// use nfse_transform::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Valor Contábil"), "valor_contabil");
/// assert_eq!(normalize_column_name(" Nome/Razão Social Tomador "), "nome_razao_social_tomador");
/// assert_eq!(normalize_column_name("Valor (R$)"), "valor_r$");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    let stripped: String = raw
        .to_lowercase()
        .nfd()
        .filter(|ch| ch.general_category() != GeneralCategory::NonspacingMark)
        .collect();
    let replaced: String = stripped
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '(' | ')'))
        .map(|ch| if matches!(ch, ' ' | '/') { '_' } else { ch })
        .collect();
    replaced.trim().to_string()
}

/// Rename every column of `df` with [`normalize_column_name`].
///
/// Fails with `DuplicateColumn` when two headers normalize to the same name.
pub fn normalize_columns(df: &DataFrame, table: SourceRole) -> Result<DataFrame> {
    let original = column_names(df);
    let mut seen = BTreeSet::new();
    let mut renamed = Vec::with_capacity(original.len());
    for name in &original {
        let normalized = normalize_column_name(name);
        if !seen.insert(normalized.clone()) {
            return Err(TransformError::DuplicateColumn {
                table,
                column: normalized,
            });
        }
        if normalized != *name {
            debug!(table = %table, from = %name, to = %normalized, "column renamed");
        }
        renamed.push(normalized);
    }
    let mut out = df.clone();
    out.set_column_names(renamed)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn accents_and_separators() {
        assert_eq!(normalize_column_name("Número"), "numero");
        assert_eq!(normalize_column_name("UF Tomador"), "uf_tomador");
        assert_eq!(normalize_column_name("Valor Serviços"), "valor_servicos");
        assert_eq!(normalize_column_name("Data/Hora (Emissão)"), "data_hora_emissao");
    }

    #[test]
    fn dotted_capital_i_leaves_no_mark() {
        assert_eq!(normalize_column_name("İNSCRİÇÃO"), "inscricao");
    }

    #[test]
    fn trailing_parenthesis_leaves_no_whitespace() {
        assert_eq!(normalize_column_name("Total\t("), "total");
        assert_eq!(normalize_column_name("()"), "");
    }

    #[test]
    fn renames_frame_columns() {
        let df = DataFrame::new(vec![
            Column::new("Cliente".into(), vec!["a"]),
            Column::new("Valor Contábil".into(), vec!["1"]),
        ])
        .unwrap();
        let out = normalize_columns(&df, SourceRole::Ledger).unwrap();
        assert_eq!(column_names(&out), vec!["cliente", "valor_contabil"]);
    }

    #[test]
    fn collapsing_headers_are_rejected() {
        let df = DataFrame::new(vec![
            Column::new("Nota".into(), vec!["1"]),
            Column::new(" nota ".into(), vec!["2"]),
        ])
        .unwrap();
        let err = normalize_columns(&df, SourceRole::Ledger).unwrap_err();
        assert!(matches!(err, TransformError::DuplicateColumn { .. }));
    }
}
