use escolar_compare::{
    compare_snapshots, write_report, DiffKind, ReportColumns, Snapshot, SnapshotOptions, ABSENT,
    PRESENT,
};
use escolar_table::Table;
use tempfile::tempdir;

fn save_xlsx(rows: Vec<Vec<&str>>, path: &std::path::Path) {
    Table::from_data(rows).save_as_xlsx(path).unwrap();
}

// End-to-end: two xlsx exports in, difference report out.
#[test]
fn test_compare_xlsx_files() {
    let dir = tempdir().unwrap();
    let prev_path = dir.path().join("anteriores.xlsx");
    let cur_path = dir.path().join("atuais.xlsx");

    save_xlsx(
        vec![
            vec!["Escola", "inep", "GRE", "IEG"],
            vec!["Escola A", "1001", "GRE 1", "7.5"],
            vec!["Escola B", "1002", "GRE 1", "6.0"],
            vec!["Escola C", "1003", "GRE 2", "5.5"],
        ],
        &prev_path,
    );
    save_xlsx(
        vec![
            vec!["Escola", "inep", "GRE", "IEG"],
            vec!["Escola A", "1001", "GRE 1", "7.9"],
            vec!["Escola C", "1003", "GRE 2", "5.5"],
            vec!["Escola D", "1004", "GRE 2", "6.8"],
        ],
        &cur_path,
    );

    let options = SnapshotOptions::default();
    let prev = Snapshot::load(&prev_path, options.clone()).unwrap();
    let cur = Snapshot::load(&cur_path, options).unwrap();

    let report = compare_snapshots(&prev, &cur).unwrap();

    // IEG change for A, B removed, D added
    assert_eq!(report.len(), 3);

    let ieg = &report.entries()[0];
    assert_eq!(ieg.key, "Escola A");
    assert_eq!(ieg.column, "IEG");
    assert_eq!(ieg.kind, DiffKind::Value);

    let removed = &report.entries()[1];
    assert_eq!(removed.key, "Escola B");
    assert_eq!(removed.previous, PRESENT);
    assert_eq!(removed.current, ABSENT);
    assert_eq!(removed.id, "1002");

    let added = &report.entries()[2];
    assert_eq!(added.key, "Escola D");
    assert_eq!(added.previous, ABSENT);
    assert_eq!(added.current, PRESENT);

    // write and re-read the report
    let report_path = dir.path().join("relatorio_diferencas.xlsx");
    write_report(&report, &ReportColumns::default(), &report_path).unwrap();

    let loaded = Table::from_xlsx(&report_path).unwrap();
    assert_eq!(loaded.row_count(), 4); // header + 3 entries
    assert_eq!(loaded.get(0, 0).unwrap().as_str(), "Escola");
    assert_eq!(loaded.get(1, 2).unwrap().as_str(), "IEG");
}

// Blank keys are dropped before the merge, trimmed keys still match.
#[test]
fn test_cleaning_before_compare() {
    let dir = tempdir().unwrap();
    let prev_path = dir.path().join("prev.csv");
    let cur_path = dir.path().join("cur.csv");

    std::fs::write(
        &prev_path,
        "Escola,inep,IEG\nEscola A  ,1001,7.5\n,9999,1.0\n",
    )
    .unwrap();
    std::fs::write(&cur_path, "Escola,inep,IEG\nEscola A,1001,7.5\n").unwrap();

    let options = SnapshotOptions::default();
    let prev = Snapshot::load(&prev_path, options.clone()).unwrap();
    let cur = Snapshot::load(&cur_path, options).unwrap();

    assert_eq!(prev.keys(), vec!["Escola A"]);
    let report = compare_snapshots(&prev, &cur).unwrap();
    assert!(report.is_empty());
}

// Numbers read from xlsx (always Float) must not diff against an identical
// integer from csv.
#[test]
fn test_xlsx_csv_numeric_parity() {
    let dir = tempdir().unwrap();
    let prev_path = dir.path().join("prev.xlsx");
    let cur_path = dir.path().join("cur.csv");

    let mut prev_table = Table::new();
    *prev_table.data_mut() = vec![
        vec!["Escola".into(), "inep".into(), "Total".into()],
        vec![
            "Escola A".into(),
            escolar_table::CellValue::Int(1001),
            escolar_table::CellValue::Int(250),
        ],
    ];
    prev_table.save_as_xlsx(&prev_path).unwrap();

    std::fs::write(&cur_path, "Escola,inep,Total\nEscola A,1001,250\n").unwrap();

    let options = SnapshotOptions::default();
    let prev = Snapshot::load(&prev_path, options.clone()).unwrap();
    let cur = Snapshot::load(&cur_path, options).unwrap();

    let report = compare_snapshots(&prev, &cur).unwrap();
    assert!(report.is_empty(), "unexpected entries: {:?}", report.entries());
}

// Duplicate keys are surfaced but do not abort the comparison.
#[test]
fn test_duplicate_keys_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.csv");
    std::fs::write(&path, "Escola,IEG\nEscola A,1\nEscola A,2\nEscola B,3\n").unwrap();

    let snapshot = Snapshot::load(&path, SnapshotOptions::default()).unwrap();
    assert_eq!(snapshot.duplicate_keys(), vec!["Escola A"]);
}
