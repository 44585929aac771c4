use std::collections::BTreeMap;
use std::fs;

use super::master::{KEY_COLUMN, revision_column_name};
use super::*;
use crate::model::DrawingRecord;

fn record(drawing: &str, c_revision: &str, p_revision: &str) -> DrawingRecord {
    DrawingRecord {
        drawing_number: drawing.to_string(),
        c_revision: c_revision.to_string(),
        p_revision: p_revision.to_string(),
        c_revision_date: String::new(),
        p_revision_date: String::new(),
        source_file: "fixture_ARC0.pdf".to_string(),
        source_page: 1,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn two_batches() -> BatchRecords {
    let mut batches = BTreeMap::new();
    batches.insert("2024/02/01".to_string(), vec![record("B", "C02", "P02")]);
    batches.insert("2024/01/01".to_string(), vec![record("A", "C01", "P01")]);
    batches
}

#[test]
fn build_master_table_unions_drawings_and_blanks_missing_batches() {
    let table = build_master_table(&two_batches()).expect("table should build");

    assert_eq!(
        table.columns,
        strings(&[
            "NUMBER",
            "2024/01/01 | C Revision",
            "2024/01/01 | P Revision",
            "2024/02/01 | C Revision",
            "2024/02/01 | P Revision",
        ])
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0], strings(&["A", "C01", "P01", "", ""]));
    assert_eq!(table.rows[1], strings(&["B", "", "", "C02", "P02"]));
}

#[test]
fn build_master_table_keeps_first_record_per_drawing() {
    let mut batches = BTreeMap::new();
    batches.insert(
        "2024/03/01".to_string(),
        vec![record("D1", "C01", "X"), record("D1", "C07", "P07")],
    );

    let table = build_master_table(&batches).expect("table should build");

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0], strings(&["D1", "C01", "X"]));
}

#[test]
fn build_master_table_rejects_unparseable_batch_dates() {
    let mut batches = BTreeMap::new();
    batches.insert("sometime".to_string(), vec![record("A", "C01", "P01")]);

    assert!(build_master_table(&batches).is_err());
}

#[test]
fn build_master_table_is_deterministic() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    write_table(&build_master_table(&two_batches()).expect("table should build"), &first)
        .expect("first table should be written");
    write_table(&build_master_table(&two_batches()).expect("table should build"), &second)
        .expect("second table should be written");

    assert_eq!(
        fs::read(&first).expect("first table should be readable"),
        fs::read(&second).expect("second table should be readable")
    );
}

#[test]
fn reconcile_fills_known_drawings_and_ignores_unknown_ones() {
    let c_column = revision_column_name("2024/01/01", "C Revision");
    let p_column = revision_column_name("2024/01/01", "P Revision");

    let mut master = Table::new(vec![
        KEY_COLUMN.to_string(),
        "TITLE".to_string(),
        c_column.clone(),
        p_column.clone(),
    ]);
    master.push_row(strings(&["A", "Ground floor plan"]));

    let mut summary = Table::new(vec![KEY_COLUMN.to_string(), c_column.clone()]);
    summary.push_row(strings(&["A", "C05"]));
    summary.push_row(strings(&["Z", "C09"]));

    let report = reconcile_into(&mut master, &summary, KEY_COLUMN).expect("reconcile should run");

    assert_eq!(master.len(), 1);
    assert_eq!(master.rows[0], strings(&["A", "Ground floor plan", "C05", ""]));
    assert_eq!(report.revision_columns, 1);
    assert_eq!(report.matched_keys, 1);
    assert_eq!(report.cells_written, 1);
    assert_eq!(report.ignored_keys, strings(&["Z"]));
}

#[test]
fn reconcile_overwrites_with_blank_summary_values() {
    let c_column = revision_column_name("2024/01/01", "C Revision");
    let mut master = Table::new(vec![KEY_COLUMN.to_string(), c_column.clone()]);
    master.push_row(strings(&["A", "C01"]));
    master.push_row(strings(&["A", "C01"]));

    let mut summary = Table::new(vec![KEY_COLUMN.to_string(), c_column]);
    summary.push_row(strings(&["A", ""]));

    let report = reconcile_into(&mut master, &summary, KEY_COLUMN).expect("reconcile should run");

    assert_eq!(report.rows_updated, 2);
    assert_eq!(master.rows[0], strings(&["A", ""]));
    assert_eq!(master.rows[1], strings(&["A", ""]));
}

#[test]
fn reconcile_requires_key_column_in_both_tables() {
    let mut master = Table::new(strings(&["NUMBER"]));
    let summary = Table::new(strings(&["Drawing Number"]));

    let error = reconcile_into(&mut master, &summary, KEY_COLUMN)
        .expect_err("missing summary key column should fail");
    assert!(error.to_string().contains("summary table"));
}

#[test]
fn csv_round_trip_preserves_blanks_and_column_order() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("nested").join("summary.csv");
    let table = build_master_table(&two_batches()).expect("table should build");

    write_table(&table, &path).expect("table should be written");
    let loaded = read_table(&path).expect("table should be read");

    assert_eq!(loaded, table);
}

#[test]
fn json_round_trip_preserves_table() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("summary.json");
    let table = build_master_table(&two_batches()).expect("table should build");

    write_table(&table, &path).expect("table should be written");
    assert_eq!(read_table(&path).expect("table should be read"), table);
}

#[test]
fn read_csv_pads_short_rows() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("master.csv");
    fs::write(&path, "\u{FEFF}NUMBER,2024/01/01 | C Revision\nA\nB,C02\n")
        .expect("csv should be written");

    let table = read_table(&path).expect("table should be read");

    assert_eq!(table.columns, strings(&["NUMBER", "2024/01/01 | C Revision"]));
    assert_eq!(table.rows[0], strings(&["A", ""]));
    assert_eq!(table.rows[1], strings(&["B", "C02"]));
}

#[test]
fn write_table_rejects_spreadsheet_and_unknown_formats() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let table = Table::new(strings(&["NUMBER"]));

    assert!(write_table(&table, &dir.path().join("out.xlsx")).is_err());
    assert!(write_table(&table, &dir.path().join("out.txt")).is_err());
}

#[test]
fn drawing_summary_table_lists_provenance_columns() {
    let table = drawing_summary_table(&[record("A", "C01", "X")]);

    assert_eq!(table.columns[0], "Drawing Number");
    assert_eq!(table.columns[6], "Page");
    assert_eq!(
        table.rows[0],
        strings(&["A", "C01", "X", "", "", "fixture_ARC0.pdf", "1"])
    );
}
