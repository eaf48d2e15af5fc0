//! Failure scenarios: every one aborts the run and leaves no output behind

use emrdeid::config::secret_string;
use emrdeid::deid::{
    ClassifierOptions, Deidentifier, IdentityTable, KdfParams, Reidentifier, TableStore,
};
use emrdeid::domain::{EmrError, EmrFormat};
use std::fs;
use std::path::PathBuf;
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

#[test]
fn test_missing_target_field_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("visits.csv");
    fs::write(&input, "first,last,dob\nAda,Lovelace,1815\n").unwrap();
    let output = dir.path().join("visits.deid.csv");

    let mut engine =
        Deidentifier::new(s(&["first", "phn"]), None, ClassifierOptions::default()).unwrap();
    let err = engine
        .deidentify_file(&input, &output, EmrFormat::Accuro)
        .unwrap_err();

    assert!(matches!(err, EmrError::Configuration(_)));
    assert!(err.to_string().contains("phn"));
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn test_missing_field_in_second_file_writes_no_outputs() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.csv");
    let bad = dir.path().join("bad.csv");
    fs::write(&good, "first,phn\nAda,12\n").unwrap();
    fs::write(&bad, "first,dob\nAda,1815\n").unwrap();
    let outputs = vec![dir.path().join("good.out.csv"), dir.path().join("bad.out.csv")];

    let mut engine =
        Deidentifier::new(s(&["first", "phn"]), None, ClassifierOptions::default()).unwrap();
    let err = engine
        .deidentify_files(&[good, bad], &outputs, EmrFormat::Accuro)
        .unwrap_err();

    assert!(matches!(err, EmrError::Configuration(_)));
    assert!(outputs.iter().all(|o| !o.exists()));
}

#[test]
fn test_wrong_password_is_authentication_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.table");
    let store = fast_store();

    let mut table = IdentityTable::new(s(&["first", "phn"]), ClassifierOptions::default()).unwrap();
    table.insert(s(&["Ada", "12"]), s(&["xq", "90"])).unwrap();
    store
        .save(&table, &path, &secret_string("right".to_string()), false)
        .unwrap();

    let err = store
        .load(&path, &secret_string("wrong".to_string()))
        .unwrap_err();
    assert!(matches!(err, EmrError::Authentication(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_duplicate_synthetic_tuple_is_ambiguous() {
    let mut table = IdentityTable::new(s(&["first", "phn"]), ClassifierOptions::default()).unwrap();
    table.insert(s(&["Ada", "12"]), s(&["a1", "b2"])).unwrap();
    table.insert(s(&["Bob", "34"]), s(&["a1", "b2"])).unwrap();

    let err = Reidentifier::new(&table).err().unwrap();
    assert!(matches!(err, EmrError::AmbiguousTable(_)));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_unknown_synthetic_tuple_names_row_and_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("visits.deid.csv");
    fs::write(&input, "first,phn,visit\na1,b2,V1\nx9,y8,V2\n").unwrap();
    let output = dir.path().join("visits.csv");

    let mut table = IdentityTable::new(s(&["first", "phn"]), ClassifierOptions::default()).unwrap();
    table.insert(s(&["Ada", "12"]), s(&["a1", "b2"])).unwrap();

    let err = Reidentifier::new(&table)
        .unwrap()
        .reidentify_file(&input, &output, EmrFormat::Accuro)
        .unwrap_err();

    match &err {
        EmrError::UnknownEntry {
            source_name,
            row,
            fields,
            tuple,
        } => {
            assert!(source_name.ends_with("visits.deid.csv"));
            assert_eq!(*row, 2);
            assert_eq!(fields, &s(&["first", "phn"]));
            assert_eq!(tuple, &s(&["x9", "y8"]));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("row 2"));
    assert!(!output.exists());
}

#[test]
fn test_reidentify_without_table_field_is_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("visits.deid.csv");
    fs::write(&input, "first,visit\na1,V1\n").unwrap();

    let table = IdentityTable::new(s(&["first", "phn"]), ClassifierOptions::default()).unwrap();
    let err = Reidentifier::new(&table)
        .unwrap()
        .reidentify_file(&input, dir.path().join("out.csv"), EmrFormat::Accuro)
        .unwrap_err();
    assert!(matches!(err, EmrError::SchemaMismatch(_)));
}

#[test]
fn test_save_refuses_overwrite_without_flag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.table");
    fs::write(&path, b"previous table").unwrap();

    let table = IdentityTable::new(s(&["phn"]), ClassifierOptions::default()).unwrap();
    let password = secret_string("pw".to_string());
    let store = fast_store();

    let err = store.save(&table, &path, &password, false).unwrap_err();
    assert!(matches!(err, EmrError::Configuration(_)));
    assert_eq!(fs::read(&path).unwrap(), b"previous table");

    store.save(&table, &path, &password, true).unwrap();
    assert!(store.load(&path, &password).is_ok());
}

#[test]
fn test_missing_input_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut engine = Deidentifier::new(s(&["phn"]), None, ClassifierOptions::default()).unwrap();
    let err = engine
        .deidentify_files(
            &[PathBuf::from("/nonexistent/visits.csv")],
            &[dir.path().join("out.csv")],
            EmrFormat::Accuro,
        )
        .unwrap_err();
    assert!(matches!(err, EmrError::NotFound(_)));
}
