//! Integration tests of the data-source layer: polling, wholesale
//! replacement and last-good retention.

mod support;

use std::sync::Arc;
use std::time::Duration;

use treemap_rust::services::dataset::{
    fetch_config, fetch_records, spawn_poller, DataStore, Source,
};

use support::{sample_config_json, sample_records_json};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), contents).expect("write fixture");
    file
}

#[tokio::test]
async fn test_config_fixture_loads_from_file() {
    let file = write_temp(sample_config_json());
    let schema = fetch_config(&Source::File(file.path().to_path_buf()))
        .await
        .unwrap();
    assert_eq!(schema.len(), 7);
    assert_eq!(schema.first_groupable(), Some("client"));
    assert_eq!(schema.first_colorable(), Some("client"));
}

#[tokio::test]
async fn test_poller_replaces_records_wholesale() {
    let file = write_temp(r#"[{"id": "B-1"}]"#);
    let source = Source::File(file.path().to_path_buf());
    let store = Arc::new(DataStore::new());

    let poller = spawn_poller(source, Arc::clone(&store), Duration::from_millis(20));

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.len(), 1);
    let first_checksum = store.checksum();

    // A new document replaces the set; nothing is merged.
    std::fs::write(file.path(), r#"[{"id": "B-2"}, {"id": "B-3"}]"#).unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.len(), 2);
    assert_ne!(store.checksum(), first_checksum);
    assert!(store.last_error().is_none());

    poller.abort();
}

#[tokio::test]
async fn test_failed_refresh_retains_last_good_data() {
    let file = write_temp(sample_records_json());
    let source = Source::File(file.path().to_path_buf());
    let store = Arc::new(DataStore::new());

    let poller = spawn_poller(source, Arc::clone(&store), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.len(), 4);

    // Corrupt the document: the error is surfaced, the data is retained.
    std::fs::write(file.path(), "{broken").unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.len(), 4);
    assert!(store.last_error().is_some());

    // Recovery clears the error state.
    std::fs::write(file.path(), r#"[{"id": "B-9"}]"#).unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.len(), 1);
    assert!(store.last_error().is_none());

    poller.abort();
}

#[tokio::test]
async fn test_unchanged_document_keeps_snapshot_pointer() {
    let file = write_temp(sample_records_json());
    let source = Source::File(file.path().to_path_buf());
    let store = Arc::new(DataStore::new());

    let (records, checksum) = fetch_records(&source).await.unwrap();
    store.apply_fetch(records, checksum);
    let before = store.snapshot();

    let poller = spawn_poller(source, Arc::clone(&store), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(Arc::ptr_eq(&before, &store.snapshot()));

    poller.abort();
}
