use phenoql::model::{CodingTable, Dictionary, FieldReference};
use phenoql::resolver::resolve;
use phenoql::table::PhenotypeTable;

const DICT_CSV: &str = "\
entity,name,title,type,coding_name,units
participant,age,Age,integer,,years
participant,sex,Sex,integer,sex_coding,
";

const CODING_CSV: &str = "\
coding_name,code,meaning
sex_coding,0,Female
sex_coding,1,Male
";

fn field(entity: &str, name: &str) -> FieldReference {
    FieldReference::new(entity, name).unwrap()
}

fn build_table(fields: &[FieldReference]) -> PhenotypeTable {
    let dict = Dictionary::from_reader(DICT_CSV.as_bytes()).unwrap();
    let codings = CodingTable::from_reader(CODING_CSV.as_bytes()).unwrap();
    PhenotypeTable::build(resolve(fields, &dict, &codings))
}

#[test]
fn test_rows_preserve_input_order() {
    let table = build_table(&[field("participant", "sex"), field("participant", "age")]);

    assert_eq!(table.rows().len(), 2);
    assert_eq!(table.rows()[0].field.name, "sex");
    assert_eq!(table.rows()[1].field.name, "age");
    assert!(table.unresolved().is_empty());
}

#[test]
fn test_csv_output_columns() {
    let table = build_table(&[field("participant", "age")]);
    let csv = table.to_csv_string().unwrap();

    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "entity,name,title,type,units,coding_name,codings"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("participant,age,Age,integer,years,,"));
}

#[test]
fn test_coding_set_serializes_as_json_cell() {
    let table = build_table(&[field("participant", "sex")]);
    let csv = table.to_csv_string().unwrap();

    let row = csv.lines().nth(1).unwrap();
    assert!(row.contains("sex_coding"));
    // The quoted JSON cell holds meaning -> code pairs.
    assert!(row.contains("Female"));
    assert!(row.contains("Male"));

    let json_start = row.find('{').unwrap();
    let cell = row[json_start..].replace("\"\"", "\"");
    let cell = cell.trim_end_matches('"');
    let parsed: serde_json::Value = serde_json::from_str(cell).unwrap();
    assert_eq!(parsed["Female"], "0");
    assert_eq!(parsed["Male"], "1");
}

#[test]
fn test_unresolved_reported_not_dropped() {
    let table = build_table(&[
        field("participant", "age"),
        field("participant", "unknown_field"),
    ]);

    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.unresolved().len(), 1);
    assert_eq!(table.unresolved()[0].name, "unknown_field");

    let report = table.report().unwrap();
    assert!(report.contains("unresolved: participant.unknown_field"));
}

#[test]
fn test_clean_run_has_no_report() {
    let table = build_table(&[field("participant", "age")]);
    assert!(table.report().is_none());
}

#[test]
fn test_idempotence_byte_identical() {
    let fields = [field("participant", "sex"), field("participant", "age")];
    let first = build_table(&fields).to_csv_string().unwrap();
    let second = build_table(&fields).to_csv_string().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_duplicate_list_entries_keep_both_rows() {
    // The cleaned table mirrors the curated list row-for-row; only
    // query compilation deduplicates.
    let table = build_table(&[field("participant", "age"), field("participant", "age")]);
    assert_eq!(table.rows().len(), 2);
}
