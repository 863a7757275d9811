//! Integration tests for report merging and persistence

use chrono::NaiveDate;
use field_audit::error::StorageError;
use field_audit::record::DeleteCountRecord;
use field_audit::report::{current_counts, ExportData, LastCount, ReportStore};
use std::fs;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record_on(day: NaiveDate, qualified: &str, count: u64) -> DeleteCountRecord {
    DeleteCountRecord {
        developer_name: "FooBar_del".to_string(),
        table_enum_or_id: "01I000000000001".to_string(),
        qualified_api_name: qualified.to_string(),
        api_name: "FooBar".to_string(),
        count,
        timestamp: day.and_hms_opt(8, 30, 0).unwrap().and_utc().timestamp(),
    }
}

#[test]
fn test_empty_batch_on_empty_report_writes_zero_entry() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let today = date(2024, 3, 9);

    let outcome = ReportStore::new(&path).export_on(Vec::new(), today).unwrap();
    assert_eq!(outcome.total_results, 0);
    assert_eq!(outcome.current_counts, vec![LastCount::new(today, 0)]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["results"], serde_json::json!([]));
    assert_eq!(
        json["lastRunCount"],
        serde_json::json!([{ "date": "2024-03-09", "count": 0 }])
    );
}

#[test]
fn test_empty_batch_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = ReportStore::new(temp_dir.path().join("deleted_fields.json"));
    let day = date(2024, 3, 9);

    store
        .export_on(vec![record_on(day, "X", 5), record_on(day, "Y", 3)], day)
        .unwrap();
    let before = fs::read_to_string(store.path()).unwrap();
    let first = store.export_on(Vec::new(), date(2024, 3, 10)).unwrap();
    let after = fs::read_to_string(store.path()).unwrap();

    assert_eq!(before, after);
    assert_eq!(first.current_counts, vec![LastCount::new(day, 8)]);
}

#[test]
fn test_history_spans_dates_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let store = ReportStore::new(temp_dir.path().join("deleted_fields.json"));
    let monday = date(2024, 3, 4);
    let tuesday = date(2024, 3, 5);

    store
        .export_on(vec![record_on(tuesday, "X", 4)], tuesday)
        .unwrap();
    let outcome = store
        .export_on(vec![record_on(monday, "X", 9), record_on(monday, "Y", 1)], tuesday)
        .unwrap();

    assert_eq!(
        outcome.current_counts,
        vec![LastCount::new(monday, 10), LastCount::new(tuesday, 4)]
    );
    assert_eq!(outcome.total_results, 3);
}

#[test]
fn test_duplicate_name_on_same_date_counts_once() {
    let day = date(2024, 3, 9);
    let records = vec![
        record_on(day, "X", 5),
        record_on(day, "X", 50),
        record_on(day, "Y", 3),
    ];
    assert_eq!(current_counts(&records, day), vec![LastCount::new(day, 8)]);
}

#[test]
fn test_null_lists_load_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    fs::write(
        &path,
        r#"{"results": null, "lastRunCount": null}"#,
    )
    .unwrap();

    let store = ReportStore::new(&path);
    assert_eq!(store.load().unwrap(), ExportData::default());
}

#[test]
fn test_report_written_by_earlier_run_loads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    fs::write(
        &path,
        r#"{
  "results": [
    {
      "DeveloperName": "FooBar_del",
      "TableEnumOrId": "01I000000000001",
      "QualifiedApiName": "X",
      "ApiName": "FooBar",
      "Count": 5,
      "Timestamp": 1709973000
    }
  ],
  "lastRunCount": [
    {
      "date": "2024-03-09",
      "count": 5
    }
  ]
}"#,
    )
    .unwrap();

    let data = ReportStore::new(&path).load().unwrap();
    assert_eq!(data.results.len(), 1);
    assert_eq!(data.results[0].count, 5);
    assert_eq!(data.last_run_count, vec![LastCount::new(date(2024, 3, 9), 5)]);
}

#[test]
fn test_corrupt_report_is_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    fs::write(&path, "[1, 2").unwrap();

    let result = ReportStore::new(&path).export_on(vec![record_on(date(2024, 3, 9), "X", 5)], date(2024, 3, 9));
    assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2");
}

#[test]
fn test_checksum_matches_file_contents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let day = date(2024, 3, 9);

    let outcome = ReportStore::new(&path)
        .export_on(vec![record_on(day, "X", 5)], day)
        .unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(outcome.checksum, blake3::hash(&bytes).to_hex().to_string());
}
