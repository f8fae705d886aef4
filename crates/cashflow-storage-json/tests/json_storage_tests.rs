use std::fs;

use cashflow_domain::{
    Bill, CustomCashFlow, FlowType, Invoice, InvoiceMetadata, ProjectionSnapshot, RecurrenceRule,
};
use cashflow_storage_json::{
    load_snapshot_from_path, JsonSnapshotStorage, SnapshotStorage, StorageError,
};
use chrono::NaiveDate;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn sample_snapshot() -> ProjectionSnapshot {
    let mut snapshot = ProjectionSnapshot::new(12_500.0);
    snapshot.invoices = vec![
        Invoice::new("INV-1", date(2024, 3, 1), 5_000.0).with_terms("Net 30"),
        Invoice::new("INV-2", date(2024, 3, 9), 700.0).paid(),
    ];
    snapshot.metadata = vec![InvoiceMetadata::new("INV-1").with_override(date(2024, 3, 4))];
    snapshot.predictions.insert("INV-1".into(), date(2024, 3, 6));
    snapshot.bills = vec![Bill::new("BILL-1", date(2024, 3, 15), 900.0)];
    snapshot.custom_flows = vec![CustomCashFlow::recurring(
        FlowType::Outflow,
        1_800.0,
        RecurrenceRule::monthly(date(2024, 1, 31)),
    )
    .with_description("Rent")];
    snapshot
}

#[test]
fn json_storage_can_save_and_load_snapshot() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::new(dir.path().join("snapshots")).expect("storage");
    let snapshot = sample_snapshot();

    storage
        .save_snapshot("March Plan", &snapshot)
        .expect("save snapshot");
    let loaded = storage.load_snapshot("march plan").expect("load snapshot");

    assert_eq!(loaded, snapshot);
    let path = storage.snapshot_path("March Plan");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("march_plan.json"));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn listing_reports_snapshot_counts() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::new(dir.path().to_path_buf()).expect("storage");
    storage
        .save_snapshot("b-plan", &ProjectionSnapshot::new(1.0))
        .expect("save");
    storage
        .save_snapshot("a-plan", &sample_snapshot())
        .expect("save");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

    assert_eq!(
        storage.list_snapshots().expect("list"),
        vec!["a-plan".to_string(), "b-plan".to_string()]
    );
    let rows = storage.list_snapshot_metadata().expect("metadata");
    assert_eq!(rows[0].open_invoice_count, 1);
    assert_eq!(rows[0].bill_count, 1);
    assert_eq!(rows[0].custom_flow_count, 1);
    assert_eq!(rows[1].initial_balance, 1.0);
}

#[test]
fn missing_snapshot_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::new(dir.path().to_path_buf()).expect("storage");

    let err = storage.load_snapshot("nope").expect_err("missing");
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn delete_removes_snapshot_file() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::new(dir.path().to_path_buf()).expect("storage");
    storage
        .save_snapshot("temp", &ProjectionSnapshot::new(0.0))
        .expect("save");

    storage.delete_snapshot("temp").expect("delete");
    assert!(storage.list_snapshots().expect("list").is_empty());
    storage.delete_snapshot("temp").expect("second delete is a no-op");
}

#[test]
fn sparse_files_load_with_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sparse.json");
    fs::write(
        &path,
        r#"{
            "initial_balance": 250.5,
            "invoices": [
                {"id": "INV-9", "due_date": "2024-05-01", "balance_due": 75.0}
            ]
        }"#,
    )
    .expect("write");

    let snapshot = load_snapshot_from_path(&path).expect("load");
    assert_eq!(snapshot.initial_balance, 250.5);
    assert_eq!(snapshot.open_invoice_count(), 1);
    assert!(snapshot.bills.is_empty());
    assert!(snapshot.predictions.is_empty());
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "[1, 2").expect("write");

    match load_snapshot_from_path(&path) {
        Err(StorageError::Serde { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected serde error, got {other:?}"),
    }
}
