//! Tests for reading authority workbooks.

use nfse_ingest::{IngestError, read_workbook};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn write_authority_workbook(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("dados_nfse_prefeitura.xlsx");
    let mut workbook = Workbook::new();

    let notes = workbook.add_worksheet();
    notes.set_name("Notas").unwrap();
    notes.write_string(0, 0, "ignored").unwrap();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Resultado").unwrap();
    let headers = [
        "Número",
        "Nome/Razão Social Tomador",
        "UF Tomador",
        "Valor Serviços",
        "Observação",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_number(1, 0, 101.0).unwrap();
    sheet.write_string(1, 1, "Padaria São João").unwrap();
    sheet.write_string(1, 2, "SP").unwrap();
    sheet.write_number(1, 3, 1234.56).unwrap();
    // Row 2 left entirely blank.
    sheet.write_number(3, 0, 102.0).unwrap();
    sheet.write_string(3, 1, "Mercado Boa Vista").unwrap();
    sheet.write_string(3, 2, "rj ").unwrap();
    sheet.write_number(3, 3, 50.0).unwrap();

    workbook.save(&path).unwrap();
    path
}

#[test]
fn reads_named_sheet_with_typed_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_authority_workbook(&dir);

    let df = read_workbook(&path, Some("Resultado")).unwrap();

    assert_eq!(df.height(), 2);
    // "Observação" has no values and is dropped.
    assert_eq!(df.width(), 4);
    let numbers = df.column("Número").unwrap().i64().unwrap();
    assert_eq!(numbers.get(0), Some(101));
    assert_eq!(numbers.get(1), Some(102));
    let amounts = df.column("Valor Serviços").unwrap().f64().unwrap();
    assert_eq!(amounts.get(0), Some(1234.56));
    let regions = df.column("UF Tomador").unwrap().str().unwrap();
    assert_eq!(regions.get(1), Some("rj "));
}

#[test]
fn first_sheet_when_unnamed() {
    let dir = TempDir::new().unwrap();
    let path = write_authority_workbook(&dir);
    let df = read_workbook(&path, None).unwrap();
    assert_eq!(df.width(), 1);
    assert_eq!(df.height(), 0);
}

#[test]
fn missing_sheet_lists_available() {
    let dir = TempDir::new().unwrap();
    let path = write_authority_workbook(&dir);
    let error = read_workbook(&path, Some("Planilha1")).unwrap_err();
    match error {
        IngestError::SheetNotFound { available, .. } => {
            assert_eq!(available, "Notas, Resultado");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_workbook() {
    let error =
        read_workbook(std::path::Path::new("/nonexistent/prefeitura.xlsx"), None).unwrap_err();
    assert!(matches!(error, IngestError::FileNotFound { .. }));
}
