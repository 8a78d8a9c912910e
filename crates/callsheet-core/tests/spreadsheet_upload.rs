//! Workbook uploads, built in-process with rust_xlsxwriter.

use std::sync::Arc;

use callsheet_core::{decode, DistributionService, EngineConfig, EngineError, TabularFormat};
use callsheet_state::MemoryRoster;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;

fn workbook(header: &[&str], rows: &[(&str, f64, &str)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, (first, phone, notes)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *first).unwrap();
        sheet.write_number(row, 1, *phone).unwrap();
        if !notes.is_empty() {
            sheet.write_string(row, 2, *notes).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

#[test]
fn xlsx_numeric_phone_renders_without_fraction() {
    let bytes = workbook(
        &["FirstName", "Phone", "Notes"],
        &[("Ann", 5550101.0, "vip"), ("Bob", 5550102.0, "")],
    );
    let table = decode("Leads.XLSX", &bytes).unwrap();

    assert_eq!(table.format, TabularFormat::Spreadsheet);
    assert_eq!(table.headers, vec!["FirstName", "Phone", "Notes"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].get("Phone"), Some("5550101"));
    assert_eq!(table.rows[0].get("Notes"), Some("vip"));
    assert_eq!(table.rows[1].get("Notes").unwrap_or(""), "");
}

#[test]
fn xlsx_header_only_is_empty_document() {
    let bytes = workbook(&["FirstName", "Phone"], &[]);
    assert!(matches!(
        decode("leads.xlsx", &bytes),
        Err(EngineError::EmptyDocument)
    ));
}

#[test]
fn xlsx_blank_sheet_is_empty_document() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    let bytes = workbook.save_to_buffer().unwrap();
    assert!(matches!(
        decode("leads.xlsx", &bytes),
        Err(EngineError::EmptyDocument)
    ));
}

#[tokio::test]
async fn xlsx_bytes_under_csv_name_are_read_as_csv() {
    let store = Arc::new(MemoryRoster::new());
    let svc = DistributionService::new(store, EngineConfig::default());

    let bytes = workbook(&["FirstName", "Phone"], &[("Ann", 1.0, "")]);
    let err = svc.upload("leads.csv", &bytes).await.unwrap_err();
    assert_eq!(err.code(), "missing_columns");
}

#[tokio::test]
async fn xlsx_upload_is_distributed_like_csv() {
    let store = Arc::new(MemoryRoster::new());
    let svc = DistributionService::new(store, EngineConfig::default());

    let bytes = workbook(
        &["FirstName", "Phone"],
        &[
            ("Ann", 1.0, ""),
            ("Bob", 2.0, ""),
            ("Cid", 3.0, ""),
            ("Dee", 4.0, ""),
            ("Eve", 5.0, ""),
            ("Fay", 6.0, ""),
        ],
    );
    let outcome = svc.upload("leads.xlsx", &bytes).await.unwrap();

    assert_eq!(outcome.format, TabularFormat::Spreadsheet);
    let assigned: Vec<_> = outcome
        .contacts
        .iter()
        .map(|c| c.agent_name.clone().unwrap())
        .collect();
    assert_eq!(
        assigned,
        vec!["Agent 1", "Agent 2", "Agent 3", "Agent 4", "Agent 5", "Agent 1"]
    );
}

#[tokio::test]
async fn xlsx_missing_required_column() {
    let store = Arc::new(MemoryRoster::new());
    let svc = DistributionService::new(store, EngineConfig::default());

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Notes").unwrap();
    sheet.write_string(1, 0, "Ann").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    match svc.upload("leads.xlsx", &bytes).await.unwrap_err() {
        EngineError::MissingColumns { columns } => {
            assert_eq!(columns, vec!["FirstName", "Phone"])
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}
