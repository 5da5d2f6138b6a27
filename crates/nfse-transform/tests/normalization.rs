//! Property tests for column header normalization.

use proptest::prelude::*;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use nfse_transform::normalize_column_name;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Headers as the exports spell them: Portuguese letters, separators,
/// parentheses, stray whitespace and the odd combining accent.
fn arb_header() -> impl Strategy<Value = String> {
    r"[a-zA-Z0-9 /()_.\t\-ÀÁÂÃÇÉÊÍÓÔÕÚÜàáâãçéêíóôõúüİ\x{0301}\x{0303}]{0,24}"
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn output_has_no_nonspacing_marks(raw in any::<String>()) {
        let normalized = normalize_column_name(&raw);
        prop_assert!(
            normalized
                .chars()
                .all(|ch| ch.general_category() != GeneralCategory::NonspacingMark)
        );
    }

    #[test]
    fn output_has_no_separators_or_parentheses(raw in any::<String>()) {
        let normalized = normalize_column_name(&raw);
        prop_assert!(!normalized.contains([' ', '/', '(', ')']));
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }

    #[test]
    fn normalization_is_idempotent(raw in arb_header()) {
        let once = normalize_column_name(&raw);
        let twice = normalize_column_name(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn output_is_lower_case(raw in arb_header()) {
        let normalized = normalize_column_name(&raw);
        prop_assert_eq!(normalized.to_lowercase(), normalized);
    }
}

#[test]
fn export_headers() {
    let cases = [
        ("Número", "numero"),
        ("Nome/Razão Social Tomador", "nome_razao_social_tomador"),
        ("UF Tomador", "uf_tomador"),
        ("Valor Serviços", "valor_servicos"),
        ("Cliente", "cliente"),
        ("Valor Contábil", "valor_contabil"),
        ("  Alíquota (%) ", "aliquota_%"),
    ];
    for (raw, expected) in cases {
        assert_eq!(normalize_column_name(raw), expected, "header {raw:?}");
    }
}
