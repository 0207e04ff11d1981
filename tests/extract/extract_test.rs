use std::cell::RefCell;
use std::path::PathBuf;

use phenoql::compile::{compile, CohortSelector, CompileOptions};
use phenoql::config::{ArtifactRef, Settings};
use phenoql::extract::{extract, ExtractOutput};
use phenoql::metadata::{LocalStore, MetadataStore, RawTable, StoreError};
use phenoql::model::FieldReference;
use phenoql::schema::DatasetSchema;

/// In-memory store that counts execute calls and serves a canned result.
struct FixtureStore {
    result: Result<RawTable, String>,
    execute_calls: RefCell<usize>,
}

impl FixtureStore {
    fn returning(result: RawTable) -> Self {
        Self {
            result: Ok(result),
            execute_calls: RefCell::new(0),
        }
    }

    fn failing(detail: &str) -> Self {
        Self {
            result: Err(detail.to_string()),
            execute_calls: RefCell::new(0),
        }
    }
}

impl MetadataStore for FixtureStore {
    fn fetch(&self, artifact: &ArtifactRef) -> Result<PathBuf, StoreError> {
        Err(StoreError::ArtifactUnavailable {
            artifact: artifact.path.display().to_string(),
            detail: "fixture store has no artifacts".into(),
        })
    }

    fn schema(&self, dataset_id: &str) -> Result<DatasetSchema, StoreError> {
        Err(StoreError::DatasetNotFound(dataset_id.to_string()))
    }

    fn execute(&self, _sql: &str, _dataset_id: &str) -> Result<RawTable, StoreError> {
        *self.execute_calls.borrow_mut() += 1;
        self.result
            .clone()
            .map_err(StoreError::QueryExecutionError)
    }
}

fn schema() -> DatasetSchema {
    DatasetSchema::from_json(
        r#"{
            "database": "app_2024",
            "base_entity": "participant",
            "entities": [
                {"name": "participant", "fields": ["eid", "age", "sex"]}
            ]
        }"#,
    )
    .unwrap()
}

fn compiled() -> phenoql::compile::CompiledQuery {
    let fields = vec![
        FieldReference::new("participant", "age").unwrap(),
        FieldReference::new("participant", "sex").unwrap(),
    ];
    compile(
        &fields,
        &schema(),
        &CohortSelector::Dataset("record-0001".into()),
        &Settings::default(),
        CompileOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_sql_only_never_touches_the_store() {
    let store = FixtureStore::failing("should not run");
    let query = compiled();

    let output = extract(&query, &store, true).unwrap();

    assert_eq!(*store.execute_calls.borrow(), 0);
    match output {
        ExtractOutput::Sql(sql) => assert_eq!(sql, query.sql),
        ExtractOutput::Table(_) => panic!("expected SQL output"),
    }
}

#[test]
fn test_execute_returns_store_result() {
    let table = RawTable::new(
        vec!["participant.age".into(), "participant.sex".into()],
        vec![vec!["52".into(), "0".into()]],
    );
    let store = FixtureStore::returning(table.clone());

    let output = extract(&compiled(), &store, false).unwrap();

    assert_eq!(*store.execute_calls.borrow(), 1);
    assert_eq!(output, ExtractOutput::Table(table));
}

#[test]
fn test_store_error_propagates_verbatim() {
    let store = FixtureStore::failing("cluster on fire");

    let err = extract(&compiled(), &store, false).unwrap_err();

    // One execution attempt, no retry, detail intact.
    assert_eq!(*store.execute_calls.borrow(), 1);
    assert!(matches!(
        &err,
        StoreError::QueryExecutionError(detail) if detail == "cluster on fire"
    ));
}

// ============================================================================
// LocalStore cache-aside behavior
// ============================================================================

#[test]
fn test_fetch_hit_returns_local_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("helpers")).unwrap();
    std::fs::write(dir.path().join("helpers/codings.csv"), "coding_name,code,meaning\n").unwrap();

    let store = LocalStore::new(dir.path());
    let artifact = ArtifactRef {
        path: "helpers/codings.csv".into(),
        remote_id: Some("file-01".into()),
    };

    // Present locally: no remote source needed even though an ID exists.
    let path = store.fetch(&artifact).unwrap();
    assert_eq!(path, dir.path().join("helpers/codings.csv"));
}

#[test]
fn test_fetch_miss_without_remote_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    let artifact = ArtifactRef {
        path: "helpers/missing.csv".into(),
        remote_id: Some("file-02".into()),
    };

    let err = store.fetch(&artifact).unwrap_err();
    assert!(matches!(err, StoreError::ArtifactUnavailable { .. }));
}

#[test]
fn test_schema_miss_is_dataset_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let err = store.schema("record-ghost").unwrap_err();
    assert!(matches!(
        err,
        StoreError::DatasetNotFound(id) if id == "record-ghost"
    ));
}

#[test]
fn test_schema_reads_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("datasets")).unwrap();
    std::fs::write(
        dir.path().join("datasets/record-0001.json"),
        r#"{"database": "app_2024", "base_entity": "participant",
            "entities": [{"name": "participant", "fields": ["eid"]}]}"#,
    )
    .unwrap();

    let store = LocalStore::new(dir.path());
    let schema = store.schema("record-0001").unwrap();
    assert_eq!(schema.database, "app_2024");
    assert_eq!(schema.base_entity, "participant");
}

#[test]
fn test_execute_without_backend_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let err = store.execute("SELECT 1", "record-0001").unwrap_err();
    assert!(matches!(err, StoreError::QueryExecutionError(_)));
}
