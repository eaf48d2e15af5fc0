//! Integration tests for the encrypted identity table file

use emrdeid::config::secret_string;
use emrdeid::deid::{ClassifierOptions, IdentityTable, KdfParams, TableStore};
use emrdeid::domain::EmrError;
use std::fs;
use tempfile::TempDir;

fn s(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn fast_store() -> TableStore {
    TableStore::with_params(KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
}

fn table() -> IdentityTable {
    let mut table = IdentityTable::new(
        s(&["First Name", "PHN"]),
        ClassifierOptions {
            recognize_dates: true,
        },
    )
    .unwrap();
    table
        .insert(s(&["Alice", "9876543210"]), s(&["qwert", "1029384756"]))
        .unwrap();
    table
        .insert(s(&["Bernard", "1234567890"]), s(&["zmxncbv", "5647382910"]))
        .unwrap();
    table
}

#[test]
fn test_saved_table_reloads_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clinic.table");
    let password = secret_string("store-test".to_string());
    let store = fast_store();
    let original = table();

    store.save(&original, &path, &password, false).unwrap();
    let loaded = store.load(&path, &password).unwrap();

    assert_eq!(loaded, original);
    assert_eq!(loaded.fingerprint(), original.fingerprint());
    assert!(loaded.options().recognize_dates);
}

#[test]
fn test_table_file_does_not_contain_plaintext() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clinic.table");
    let store = fast_store();
    store
        .save(&table(), &path, &secret_string("pw".to_string()), false)
        .unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"EMRDEID1"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(!text.contains("Alice"));
    assert!(!text.contains("9876543210"));
}

#[test]
fn test_tampered_file_fails_authentication() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clinic.table");
    let password = secret_string("pw".to_string());
    let store = fast_store();
    store.save(&table(), &path, &password, false).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        store.load(&path, &password),
        Err(EmrError::Authentication(_))
    ));
}

#[test]
fn test_default_store_opens_fast_store_tables() {
    // Cost parameters travel in the header
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clinic.table");
    let password = secret_string("pw".to_string());
    fast_store().save(&table(), &path, &password, false).unwrap();

    assert!(TableStore::new().load(&path, &password).is_ok());
}

#[test]
fn test_missing_table_is_not_found() {
    let err = fast_store()
        .load("/nonexistent/clinic.table", &secret_string("pw".to_string()))
        .unwrap_err();
    assert!(matches!(err, EmrError::NotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_empty_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = fast_store()
        .save(
            &table(),
            dir.path().join("clinic.table"),
            &secret_string(String::new()),
            false,
        )
        .unwrap_err();
    assert!(matches!(err, EmrError::Configuration(_)));
}
