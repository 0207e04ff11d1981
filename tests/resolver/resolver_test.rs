use phenoql::model::{CodingTable, Dictionary, FieldReference};
use phenoql::resolver::{resolve, ResolveWarning};

const DICT_CSV: &str = "\
entity,name,title,type,coding_name
participant,age,Age,integer,
participant,sex,Sex,integer,sex_coding
participant,mood,Mood,integer,mood_coding
";

const CODING_CSV: &str = "\
coding_name,code,meaning
sex_coding,0,Female
sex_coding,1,Male
";

fn field(entity: &str, name: &str) -> FieldReference {
    FieldReference::new(entity, name).unwrap()
}

fn fixtures() -> (Dictionary, CodingTable) {
    (
        Dictionary::from_reader(DICT_CSV.as_bytes()).unwrap(),
        CodingTable::from_reader(CODING_CSV.as_bytes()).unwrap(),
    )
}

#[test]
fn test_partition_is_exact_and_ordered() {
    let (dict, codings) = fixtures();
    let fields = vec![
        field("participant", "age"),
        field("participant", "unknown_a"),
        field("participant", "sex"),
        field("participant", "unknown_b"),
    ];

    let resolution = resolve(&fields, &dict, &codings);

    // Exact partition: every input lands in exactly one side.
    assert_eq!(
        resolution.resolved.len() + resolution.unresolved.len(),
        fields.len()
    );

    // Input order preserved within each side.
    let resolved_names: Vec<&str> = resolution
        .resolved
        .iter()
        .map(|r| r.field.name.as_str())
        .collect();
    assert_eq!(resolved_names, ["age", "sex"]);

    let unresolved_names: Vec<&str> = resolution
        .unresolved
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(unresolved_names, ["unknown_a", "unknown_b"]);
}

#[test]
fn test_no_short_circuit_on_failure() {
    let (dict, codings) = fixtures();
    let fields = vec![
        field("participant", "nope"),
        field("participant", "age"),
    ];

    let resolution = resolve(&fields, &dict, &codings);
    assert_eq!(resolution.unresolved.len(), 1);
    assert_eq!(resolution.resolved.len(), 1);
    assert_eq!(resolution.resolved[0].field.name, "age");
}

#[test]
fn test_coded_field_gathers_all_rows() {
    let (dict, codings) = fixtures();
    let resolution = resolve(&[field("participant", "sex")], &dict, &codings);

    let sex = &resolution.resolved[0];
    assert_eq!(sex.codings.len(), 2);
    assert_eq!(sex.codings[0].meaning, "Female");
    assert_eq!(sex.codings[1].meaning, "Male");
    assert!(resolution.warnings.is_empty());
}

#[test]
fn test_uncoded_field_has_empty_coding_set() {
    let (dict, codings) = fixtures();
    let resolution = resolve(&[field("participant", "age")], &dict, &codings);
    assert!(resolution.resolved[0].codings.is_empty());
    assert!(resolution.warnings.is_empty());
}

#[test]
fn test_declared_coding_without_rows_warns_but_resolves() {
    let (dict, codings) = fixtures();
    let resolution = resolve(&[field("participant", "mood")], &dict, &codings);

    // The field still resolves, with an empty coding set.
    assert_eq!(resolution.resolved.len(), 1);
    assert!(resolution.resolved[0].codings.is_empty());
    assert!(resolution.unresolved.is_empty());

    assert_eq!(resolution.warnings.len(), 1);
    assert!(matches!(
        &resolution.warnings[0],
        ResolveWarning::CodingMissing { coding_name, .. } if coding_name == "mood_coding"
    ));
}

#[test]
fn test_resolution_is_pure() {
    let (dict, codings) = fixtures();
    let fields = vec![field("participant", "age"), field("participant", "sex")];

    let first = resolve(&fields, &dict, &codings);
    let second = resolve(&fields, &dict, &codings);

    assert_eq!(first.resolved, second.resolved);
    assert_eq!(first.unresolved, second.unresolved);
    assert_eq!(first.warnings, second.warnings);
}
