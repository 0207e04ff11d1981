use phenoql::model::{CodingTable, Dictionary, FieldReference, ValueType};

const DICT_CSV: &str = "\
entity,name,title,type,coding_name,units,linkout
participant,age,Age at recruitment,integer,,years,
participant,sex,Sex,integer,sex_coding,,
participant,height,Standing height,float,,cm,https://example.org/height
";

const CODING_CSV: &str = "\
coding_name,code,meaning
sex_coding,0,Female
sex_coding,1,Male
icd10,I10,Essential hypertension
";

#[test]
fn test_dictionary_lookup_exact() {
    let dict = Dictionary::from_reader(DICT_CSV.as_bytes()).unwrap();
    assert_eq!(dict.len(), 3);

    let age = FieldReference::new("participant", "age").unwrap();
    let entry = dict.lookup(&age).unwrap();
    assert_eq!(entry.title, "Age at recruitment");
    assert_eq!(entry.value_type, ValueType::Integer);
    assert_eq!(entry.units.as_deref(), Some("years"));
    assert!(entry.coding_name.is_none());
}

#[test]
fn test_dictionary_lookup_is_case_sensitive() {
    let dict = Dictionary::from_reader(DICT_CSV.as_bytes()).unwrap();
    let wrong_case = FieldReference::new("Participant", "age").unwrap();
    assert!(dict.lookup(&wrong_case).is_none());
}

#[test]
fn test_dictionary_coding_reference() {
    let dict = Dictionary::from_reader(DICT_CSV.as_bytes()).unwrap();
    let sex = FieldReference::new("participant", "sex").unwrap();
    let entry = dict.lookup(&sex).unwrap();
    assert_eq!(entry.coding_name.as_deref(), Some("sex_coding"));
}

#[test]
fn test_dictionary_duplicate_keeps_first() {
    let csv = "\
entity,name,title,type
participant,age,First,integer
participant,age,Second,integer
";
    let dict = Dictionary::from_reader(csv.as_bytes()).unwrap();
    let age = FieldReference::new("participant", "age").unwrap();
    assert_eq!(dict.lookup(&age).unwrap().title, "First");
}

#[test]
fn test_coding_table_grouping() {
    let codings = CodingTable::from_reader(CODING_CSV.as_bytes()).unwrap();
    assert_eq!(codings.len(), 2);

    let sex = codings.lookup("sex_coding").unwrap();
    assert_eq!(sex.len(), 2);
    assert_eq!(sex[0].code, "0");
    assert_eq!(sex[0].meaning, "Female");
    assert_eq!(sex[1].code, "1");

    assert!(codings.lookup("missing_coding").is_none());
}

#[test]
fn test_unknown_type_passes_through() {
    let csv = "\
entity,name,title,type
participant,tree,Hierarchy,hierarchical
";
    let dict = Dictionary::from_reader(csv.as_bytes()).unwrap();
    let tree = FieldReference::new("participant", "tree").unwrap();
    let entry = dict.lookup(&tree).unwrap();
    assert_eq!(entry.value_type, ValueType::Other("hierarchical".into()));
}
