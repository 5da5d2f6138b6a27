//! Mapping of normalized native columns onto the canonical fields.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use tracing::debug;

use nfse_model::{CanonicalField, ColumnMapping, REQUIRED_FIELDS, SourceRole};

use crate::columns::normalize_column_name;
use crate::data_utils::{column_names, require_column};
use crate::error::{Result, TransformError};

/// Canonical field fed by the normalized header `name`, if any.
pub fn mapped_field(mapping: &ColumnMapping, name: &str) -> Option<CanonicalField> {
    mapping
        .pairs()
        .find(|(native, _)| normalize_column_name(native) == name)
        .map(|(_, field)| field)
}

/// Rename the mapped native columns of `df` to their canonical names.
///
/// Mapping entries are normalized the same way headers are, so a config
/// may say `"Valor Contábil"` or `"valor_contabil"`. Two entries that
/// normalize to the same header are an `AmbiguousMapping` error. Unmapped
/// columns are kept as they are; one that already carries a canonical name
/// is a `DuplicateColumn` error.
pub fn map_to_canonical(
    df: &DataFrame,
    mapping: &ColumnMapping,
    table: SourceRole,
) -> Result<DataFrame> {
    let mut natives = BTreeSet::new();
    for (native, _) in mapping.pairs() {
        let native = normalize_column_name(native);
        require_column(df, table, &native)?;
        if !natives.insert(native.clone()) {
            return Err(TransformError::AmbiguousMapping {
                table,
                column: native,
            });
        }
    }

    let mut renamed = Vec::with_capacity(df.width());
    for name in column_names(df) {
        if let Some(field) = mapped_field(mapping, &name) {
            renamed.push(field.as_str().to_string());
        } else if REQUIRED_FIELDS.iter().any(|field| field.as_str() == name) {
            return Err(TransformError::DuplicateColumn {
                table,
                column: name,
            });
        } else {
            renamed.push(name);
        }
    }
    debug!(table = %table, columns = renamed.len(), "canonical schema applied");
    let mut out = df.clone();
    out.set_column_names(renamed)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfse_model::{AMOUNT, CLIENT, INVOICE_NUMBER, REGION_CODE, SourceConfig};
    use polars::prelude::Column;

    fn ledger_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("cliente".into(), vec!["Ana"]),
            Column::new("nota".into(), vec!["1"]),
            Column::new("uf".into(), vec!["SP"]),
            Column::new("valor_contabil".into(), vec!["1,00"]),
            Column::new("cfop".into(), vec!["5933"]),
        ])
        .unwrap()
    }

    #[test]
    fn renames_mapped_and_keeps_others() {
        let mapping = SourceConfig::default_ledger().columns;
        let out = map_to_canonical(&ledger_frame(), &mapping, SourceRole::Ledger).unwrap();
        assert_eq!(
            column_names(&out),
            vec![CLIENT, INVOICE_NUMBER, REGION_CODE, AMOUNT, "cfop"]
        );
    }

    #[test]
    fn mapping_entries_are_normalized() {
        let mut mapping = SourceConfig::default_ledger().columns;
        mapping.amount = "Valor Contábil".to_string();
        let out = map_to_canonical(&ledger_frame(), &mapping, SourceRole::Ledger).unwrap();
        assert!(column_names(&out).contains(&AMOUNT.to_string()));
    }

    #[test]
    fn missing_native_column() {
        let mapping = SourceConfig::default_authority().columns;
        let err = map_to_canonical(&ledger_frame(), &mapping, SourceRole::Authority).unwrap_err();
        match err {
            TransformError::MissingColumn { table, column } => {
                assert_eq!(table, SourceRole::Authority);
                assert_eq!(column, "nome_razao_social_tomador");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unmapped_canonical_name_collides() {
        let mut df = ledger_frame();
        df.with_column(Column::new("amount".into(), vec!["2"])).unwrap();
        let mapping = SourceConfig::default_ledger().columns;
        let err = map_to_canonical(&df, &mapping, SourceRole::Ledger).unwrap_err();
        assert!(matches!(err, TransformError::DuplicateColumn { .. }));
    }

    #[test]
    fn entries_colliding_after_normalization_are_rejected() {
        let df = DataFrame::new(vec![
            Column::new("numero".into(), vec![1i64]),
            Column::new("uf_tomador".into(), vec!["SP"]),
            Column::new("valor_servicos".into(), vec![1.0]),
        ])
        .unwrap();
        let mut mapping = SourceConfig::default_authority().columns;
        mapping.client = "Número".to_string();
        let err = map_to_canonical(&df, &mapping, SourceRole::Authority).unwrap_err();
        match err {
            TransformError::AmbiguousMapping { table, column } => {
                assert_eq!(table, SourceRole::Authority);
                assert_eq!(column, "numero");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mapped_field_matches_normalized_headers() {
        let mapping = SourceConfig::default_ledger().columns;
        assert_eq!(
            mapped_field(&mapping, "valor_contabil"),
            Some(CanonicalField::Amount)
        );
        assert_eq!(mapped_field(&mapping, "cfop"), None);
    }
}
