//! End-to-end tests: deidentify files, save the table, reload it and
//! reidentify the outputs

use emrdeid::adapters::csv_io::RowSource;
use emrdeid::config::secret_string;
use emrdeid::deid::{ClassifierOptions, Deidentifier, KdfParams, Reidentifier, TableStore};
use emrdeid::domain::EmrFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const VISITS: &str = "\
Patient #,First Name,Last Name,PHN,Visit Date,Reason
1001,Alice,Nguyen,9876543210,01/02/2024,Follow-up
1002,Bernard,Okafor,1234567890,01/03/2024,Consult
1003,Alice,Nguyen,9876543210,02/14/2024,Foot care
";

const LABS: &str = "\
PHN,Test,First Name,Last Name,Result
1234567890,HbA1c,Bernard,Okafor,6.1
5555512345,LDL,Chiyo,Tanaka,2.4
";

fn fields() -> Vec<String> {
    ["First Name", "Last Name", "PHN"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

fn fast_store() -> TableStore {
    TableStore::with_params(KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn column(path: &Path, name: &str) -> Vec<String> {
    let source = RowSource::open(path, EmrFormat::Accuro).unwrap();
    let index = source.column_index(name).unwrap();
    source
        .rows()
        .iter()
        .map(|row| row.get(index).unwrap().to_string())
        .collect()
}

#[test]
fn test_roundtrip_restores_files_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![write(&dir, "visits.csv", VISITS), write(&dir, "labs.csv", LABS)];
    let outputs = vec![dir.path().join("visits.deid.csv"), dir.path().join("labs.deid.csv")];
    let restored = vec![dir.path().join("visits.reid.csv"), dir.path().join("labs.reid.csv")];
    let table_path = dir.path().join("clinic.table");
    let password = secret_string("roundtrip-password".to_string());

    let mut engine = Deidentifier::new(fields(), None, ClassifierOptions::default()).unwrap();
    let summary = engine
        .deidentify_files(&inputs, &outputs, EmrFormat::Accuro)
        .unwrap();
    assert_eq!(summary.total_rows(), 5);
    assert_eq!(summary.table_entries, 3);

    let store = fast_store();
    store
        .save(engine.table(), &table_path, &password, false)
        .unwrap();

    assert_ne!(fs::read_to_string(&outputs[0]).unwrap(), VISITS);

    let table = store.load(&table_path, &password).unwrap();
    Reidentifier::new(&table)
        .unwrap()
        .reidentify_files(&outputs, &restored, EmrFormat::Accuro)
        .unwrap();

    assert_eq!(fs::read_to_string(&restored[0]).unwrap(), VISITS);
    assert_eq!(fs::read_to_string(&restored[1]).unwrap(), LABS);
}

#[test]
fn test_same_identity_gets_same_synthetic_values_across_files() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![write(&dir, "visits.csv", VISITS), write(&dir, "labs.csv", LABS)];
    let outputs = vec![dir.path().join("visits.deid.csv"), dir.path().join("labs.deid.csv")];

    let mut engine = Deidentifier::new(fields(), None, ClassifierOptions::default()).unwrap();
    engine
        .deidentify_files(&inputs, &outputs, EmrFormat::Accuro)
        .unwrap();

    let visit_phns = column(&outputs[0], "PHN");
    let lab_phns = column(&outputs[1], "PHN");
    let visit_names = column(&outputs[0], "First Name");
    let lab_names = column(&outputs[1], "First Name");

    // Alice appears twice in visits, Bernard once in each file
    assert_eq!(visit_phns[0], visit_phns[2]);
    assert_eq!(visit_phns[1], lab_phns[0]);
    assert_eq!(visit_names[1], lab_names[0]);
    assert_ne!(visit_phns[1], "1234567890");
}

#[test]
fn test_type_and_length_preserved() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "visits.csv", VISITS);
    let output = dir.path().join("visits.deid.csv");

    let mut engine = Deidentifier::new(fields(), None, ClassifierOptions::default()).unwrap();
    engine
        .deidentify_file(&input, &output, EmrFormat::Accuro)
        .unwrap();

    for phn in column(&output, "PHN") {
        assert_eq!(phn.len(), 10);
        assert!(phn.chars().all(|c| c.is_ascii_digit()));
    }
    let names = column(&output, "First Name");
    assert_eq!(names[1].len(), "Bernard".len());
    assert!(names[1].chars().all(|c| c.is_ascii_lowercase()));

    // Untouched columns
    assert_eq!(column(&output, "Reason"), column(&input, "Reason"));
    assert_eq!(column(&output, "Patient #"), column(&input, "Patient #"));
}

#[test]
fn test_pss_leading_line_is_dropped() {
    let dir = TempDir::new().unwrap();
    let pss = format!("Report generated 2024-03-01 by PSS\n{LABS}");
    let input = write(&dir, "labs.csv", &pss);
    let output = dir.path().join("labs.deid.csv");
    let restored = dir.path().join("labs.reid.csv");

    let mut engine = Deidentifier::new(fields(), None, ClassifierOptions::default()).unwrap();
    engine.deidentify_file(&input, &output, EmrFormat::Pss).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("PHN,Test,First Name,Last Name,Result\n"));

    let table = engine.table().clone();
    Reidentifier::new(&table)
        .unwrap()
        .reidentify_file(&output, &restored, EmrFormat::Accuro)
        .unwrap();
    assert_eq!(fs::read_to_string(&restored).unwrap(), LABS);
}

#[test]
fn test_loaded_table_extends_previous_run() {
    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("clinic.table");
    let password = secret_string("extend".to_string());
    let store = fast_store();

    let first_out = dir.path().join("visits.deid.csv");
    let mut engine = Deidentifier::new(fields(), None, ClassifierOptions::default()).unwrap();
    engine
        .deidentify_file(write(&dir, "visits.csv", VISITS), &first_out, EmrFormat::Accuro)
        .unwrap();
    store.save(engine.table(), &table_path, &password, false).unwrap();

    let table = store.load(&table_path, &password).unwrap();
    let second_out = dir.path().join("labs.deid.csv");
    let mut engine = Deidentifier::new(fields(), Some(table), ClassifierOptions::default()).unwrap();
    let summary = engine
        .deidentify_file(write(&dir, "labs.csv", LABS), &second_out, EmrFormat::Accuro)
        .unwrap();

    // Bernard was mapped in the first run, Chiyo is new
    assert_eq!(summary.reused_entries, 1);
    assert_eq!(summary.new_entries, 1);
    assert_eq!(column(&first_out, "PHN")[1], column(&second_out, "PHN")[0]);
}

#[test]
fn test_recognized_dates_reduce_to_year() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "patients.csv",
        "PHN,Birth Date\n1234567890,3/15/1948\n",
    );
    let output = dir.path().join("patients.deid.csv");

    let fields = vec!["PHN".to_string(), "Birth Date".to_string()];
    let options = ClassifierOptions {
        recognize_dates: true,
    };
    let mut engine = Deidentifier::new(fields, None, options).unwrap();
    engine
        .deidentify_file(&input, &output, EmrFormat::Accuro)
        .unwrap();

    assert_eq!(column(&output, "Birth Date"), vec!["1948".to_string()]);
}
