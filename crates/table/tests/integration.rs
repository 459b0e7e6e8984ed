use escolar_table::{CellValue, CsvOptions, Table, TableError};
use tempfile::tempdir;

// ===== Table Creation Tests =====

#[test]
fn test_table_from_data() {
    let table = Table::from_data(vec![vec![1, 2, 3], vec![4, 5, 6]]);

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.col_count(), 3);
    assert_eq!(table.get(0, 0).unwrap(), &CellValue::Int(1));
    assert_eq!(table.get(1, 2).unwrap(), &CellValue::Int(6));
}

#[test]
fn test_table_from_strings() {
    let table = Table::from_data(vec![
        vec!["Escola", "GRE", "Municipio"],
        vec!["Escola A", "GRE 1", "Recife"],
    ]);

    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.get(0, 0).unwrap(),
        &CellValue::String("Escola".to_string())
    );
}

// ===== Named Access Tests =====

#[test]
fn test_column_access_by_name() {
    let mut table = Table::from_data(vec![
        vec!["Escola", "IEG"],
        vec!["Escola A", "7.5"],
        vec!["Escola B", "6.1"],
    ]);
    table.name_columns_by_row(0).unwrap();

    let schools = table.column_by_name("Escola").unwrap();
    assert_eq!(schools.len(), 2);
    assert_eq!(schools[1].as_str(), "Escola B");

    let missing = table.column_by_name("Municipio");
    assert!(matches!(missing, Err(TableError::ColumnNotFound { .. })));
}

#[test]
fn test_column_map_by_name_trims() {
    let mut table = Table::from_data(vec![
        vec!["Escola"],
        vec!["  Escola A  "],
    ]);
    table.name_columns_by_row(0).unwrap();

    table
        .column_map_by_name("Escola", |cell| {
            CellValue::String(cell.as_str().trim().to_string())
        })
        .unwrap();

    assert_eq!(table.get_by_name(1, "Escola").unwrap().as_str(), "Escola A");
}

// ===== File Round-trip Tests =====

#[test]
fn test_csv_to_xlsx_round_trip() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    let xlsx_path = dir.path().join("data.xlsx");

    let table = Table::from_csv_str_with_options(
        "Escola,IEG\nEscola A,7.5\nEscola B,6.1",
        CsvOptions::default().with_headers(true),
    )
    .unwrap();

    table.save_as_csv(&csv_path).unwrap();
    table.save_as_xlsx(&xlsx_path).unwrap();

    let from_csv = Table::from_csv(&csv_path).unwrap();
    let from_xlsx = Table::from_xlsx(&xlsx_path).unwrap();

    assert_eq!(from_csv.row_count(), from_xlsx.row_count());
    assert_eq!(from_csv.col_count(), from_xlsx.col_count());
}
