//! Metadata store - access to reference artifacts, dataset schemas, and
//! query execution.
//!
//! The store is the single seam between the compilation core and the
//! remote dataset platform. Everything behind [`MetadataStore`] is
//! replaceable; the pipeline only sees local paths, parsed schemas, and
//! tabular results. One-shot batch runs need no async runtime, so the
//! trait is synchronous.

mod local;
mod table;

pub use local::{CommandSource, CommandTemplate, LocalStore, RemoteSource};
pub use table::RawTable;

use std::path::PathBuf;

use crate::config::ArtifactRef;
use crate::schema::{DatasetSchema, SchemaError};

/// Errors surfaced by a metadata store. Propagated to the caller
/// unmodified; the core never retries or swallows them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Artifact unavailable: {artifact}: {detail}")]
    ArtifactUnavailable { artifact: String, detail: String },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Query execution failed: {0}")]
    QueryExecutionError(String),

    #[error("Invalid dataset schema: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Access to reference artifacts, dataset schemas, and query execution.
pub trait MetadataStore {
    /// Return a local path to a named reference artifact, retrieving it
    /// from the remote store if not already present locally.
    fn fetch(&self, artifact: &ArtifactRef) -> Result<PathBuf, StoreError>;

    /// The set of known entities and fields for a dataset.
    fn schema(&self, dataset_id: &str) -> Result<DatasetSchema, StoreError>;

    /// Run a query against a dataset and return its rows.
    fn execute(&self, sql: &str, dataset_id: &str) -> Result<RawTable, StoreError>;
}
