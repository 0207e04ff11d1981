use phenoql::model::{read_field_list, FieldReference, ModelError};

#[test]
fn test_new_valid() {
    let field = FieldReference::new("participant", "age").unwrap();
    assert_eq!(field.entity, "participant");
    assert_eq!(field.name, "age");
    assert_eq!(field.qualified_name(), "participant.age");
}

#[test]
fn test_new_strips_whitespace() {
    let field = FieldReference::new(" participant ", " age ").unwrap();
    assert_eq!(field.entity, "participant");
    assert_eq!(field.name, "age");
}

#[test]
fn test_empty_entity_is_malformed() {
    let result = FieldReference::new("", "age");
    assert!(matches!(result, Err(ModelError::MalformedRecord { .. })));
}

#[test]
fn test_whitespace_name_is_malformed() {
    let result = FieldReference::new("participant", "   ");
    assert!(matches!(result, Err(ModelError::MalformedRecord { .. })));
}

#[test]
fn test_parse_qualified() {
    let field = FieldReference::parse("participant.age").unwrap();
    assert_eq!(field.entity, "participant");
    assert_eq!(field.name, "age");
}

#[test]
fn test_parse_unqualified_is_malformed() {
    assert!(matches!(
        FieldReference::parse("age"),
        Err(ModelError::MalformedRecord { .. })
    ));
}

#[test]
fn test_read_field_list_preserves_order() {
    let csv = "\
entity,name
participant,sex
participant,age
questionnaire,housing_income_1_1
";
    let fields = read_field_list(csv.as_bytes()).unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].qualified_name(), "participant.sex");
    assert_eq!(fields[1].qualified_name(), "participant.age");
    assert_eq!(fields[2].qualified_name(), "questionnaire.housing_income_1_1");
}

#[test]
fn test_read_field_list_ignores_extra_columns() {
    let csv = "\
phenotype,coding_name,entity,name
Age at recruitment,,participant,age
";
    let fields = read_field_list(csv.as_bytes()).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].qualified_name(), "participant.age");
}

#[test]
fn test_read_field_list_keeps_duplicates() {
    let csv = "\
entity,name
participant,age
participant,age
";
    let fields = read_field_list(csv.as_bytes()).unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0], fields[1]);
}

#[test]
fn test_read_field_list_rejects_empty_entity() {
    let csv = "\
entity,name
,age
";
    assert!(matches!(
        read_field_list(csv.as_bytes()),
        Err(ModelError::MalformedRecord { .. })
    ));
}
