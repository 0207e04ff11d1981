//! Local metadata store backed by a project directory, with on-demand
//! retrieval through an external command.
//!
//! Artifact access is cache-aside: check local presence, fetch on miss,
//! never re-fetch on hit within a run. Retrieval and query execution are
//! both delegated to configurable external programs, the way the
//! surrounding platform tooling expects.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{MetadataStore, RawTable, StoreError};
use crate::config::ArtifactRef;
use crate::schema::DatasetSchema;

/// Retrieves a remote object into a local destination path.
pub trait RemoteSource {
    fn download(&self, remote_id: &str, dest: &Path) -> Result<(), StoreError>;
}

/// An external command with `{placeholder}` substitution in its
/// arguments.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Substitute `{name}` placeholders in every argument.
    fn render_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                let mut rendered = arg.clone();
                for (name, value) in vars {
                    rendered = rendered.replace(&format!("{{{}}}", name), value);
                }
                rendered
            })
            .collect()
    }
}

/// Downloads artifacts by invoking an external command, substituting
/// `{id}` and `{dest}` in its arguments.
#[derive(Debug, Clone)]
pub struct CommandSource {
    template: CommandTemplate,
}

impl CommandSource {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl RemoteSource for CommandSource {
    fn download(&self, remote_id: &str, dest: &Path) -> Result<(), StoreError> {
        let dest_str = dest.to_string_lossy();
        let args = self
            .template
            .render_args(&[("id", remote_id), ("dest", &dest_str)]);

        tracing::info!(program = %self.template.program, remote_id, "downloading artifact");

        let output = Command::new(&self.template.program)
            .args(&args)
            .output()
            .map_err(|e| StoreError::ArtifactUnavailable {
                artifact: remote_id.to_string(),
                detail: format!("failed to run {}: {}", self.template.program, e),
            })?;

        if !output.status.success() {
            return Err(StoreError::ArtifactUnavailable {
                artifact: remote_id.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Metadata store rooted at a local project directory.
///
/// - Artifacts resolve against the root with cache-aside retrieval.
/// - Dataset schemas are JSON descriptors under `<root>/datasets/`.
/// - Query execution shells out to a configured extraction command with
///   `{dataset}` and `{sql}` substitution, parsing its stdout as CSV.
pub struct LocalStore {
    root: PathBuf,
    remote: Option<Box<dyn RemoteSource>>,
    extract_command: Option<CommandTemplate>,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            remote: None,
            extract_command: None,
        }
    }

    /// Attach a remote source for artifacts missing locally.
    pub fn with_remote(mut self, remote: Box<dyn RemoteSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Attach the external command that executes extraction queries.
    pub fn with_extract_command(mut self, template: CommandTemplate) -> Self {
        self.extract_command = Some(template);
        self
    }

    fn descriptor_path(&self, dataset_id: &str) -> PathBuf {
        self.root.join("datasets").join(format!("{}.json", dataset_id))
    }
}

impl MetadataStore for LocalStore {
    fn fetch(&self, artifact: &ArtifactRef) -> Result<PathBuf, StoreError> {
        let local = self.root.join(&artifact.path);

        if local.exists() {
            tracing::info!(path = %local.display(), "using existing artifact");
            return Ok(local);
        }

        let (remote_id, remote) = match (&artifact.remote_id, &self.remote) {
            (Some(id), Some(remote)) => (id, remote),
            _ => {
                return Err(StoreError::ArtifactUnavailable {
                    artifact: artifact.path.display().to_string(),
                    detail: "not present locally and no remote source configured".into(),
                })
            }
        };

        tracing::warn!(
            path = %local.display(),
            remote_id = %remote_id,
            "artifact not found locally, retrieving"
        );

        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }
        remote.download(remote_id, &local)?;

        if !local.exists() {
            return Err(StoreError::ArtifactUnavailable {
                artifact: artifact.path.display().to_string(),
                detail: format!("download of {} produced no file", remote_id),
            });
        }

        Ok(local)
    }

    fn schema(&self, dataset_id: &str) -> Result<DatasetSchema, StoreError> {
        let path = self.descriptor_path(dataset_id);
        if !path.exists() {
            return Err(StoreError::DatasetNotFound(dataset_id.to_string()));
        }

        let json = std::fs::read_to_string(&path)?;
        Ok(DatasetSchema::from_json(&json)?)
    }

    fn execute(&self, sql: &str, dataset_id: &str) -> Result<RawTable, StoreError> {
        let template = self.extract_command.as_ref().ok_or_else(|| {
            StoreError::QueryExecutionError("no extraction command configured".into())
        })?;

        let args = template.render_args(&[("dataset", dataset_id), ("sql", sql)]);

        tracing::info!(program = %template.program, dataset_id, "executing extraction query");

        let output = Command::new(&template.program)
            .args(&args)
            .output()
            .map_err(|e| {
                StoreError::QueryExecutionError(format!(
                    "failed to run {}: {}",
                    template.program, e
                ))
            })?;

        if !output.status.success() {
            return Err(StoreError::QueryExecutionError(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        RawTable::from_csv_reader(output.stdout.as_slice())
            .map_err(|e| StoreError::QueryExecutionError(format!("unreadable result: {}", e)))
    }
}
