//! TOML-based configuration for phenoql.
//!
//! Supports a config file (phenoql.toml) resolving cohort keys to dataset
//! IDs and naming the reference artifacts.
//!
//! Example configuration:
//! ```toml
//! project_dir = "/mnt/project"
//! default_phenotype = "pilot"
//!
//! [cohorts]
//! test = "record-0001"
//! full = "record-0002"
//!
//! [artifacts.codings]
//! path = "helpers/codings.csv"
//! remote_id = "file-codings-01"
//!
//! [artifacts.data_dictionary]
//! path = "helpers/data_dictionary.csv"
//! remote_id = "file-dict-01"
//!
//! [artifacts.phenotypes.pilot]
//! path = "phenotypes/pilot_phenotypes.csv"
//! remote_id = "file-pheno-01"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Phenotype list key not found: {key}. Available keys: {available}")]
    PhenotypeKeyNotFound { key: String, available: String },
}

/// A named reference artifact: where it lives under the project
/// directory and the remote object to pull when it is missing locally.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactRef {
    /// Path relative to the project directory.
    pub path: PathBuf,

    /// Remote object identifier for on-demand retrieval.
    #[serde(default)]
    pub remote_id: Option<String>,
}

/// An external command invocation with `{placeholder}` substitution in
/// its arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandSpec {
    pub program: String,

    /// Arguments; `{id}`/`{dest}` for downloads, `{dataset}`/`{sql}`
    /// for extraction.
    #[serde(default)]
    pub args: Vec<String>,
}

/// The external commands the store delegates to.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandSettings {
    /// Retrieves a missing artifact.
    pub download: Option<CommandSpec>,

    /// Executes an extraction query.
    pub extract: Option<CommandSpec>,
}

/// The reference artifacts a run needs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactSettings {
    pub codings: Option<ArtifactRef>,
    pub data_dictionary: Option<ArtifactRef>,

    /// Named phenotype lists.
    pub phenotypes: HashMap<String, ArtifactRef>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory the artifact paths are relative to.
    pub project_dir: PathBuf,

    /// Phenotype list key used when the caller passes none.
    pub default_phenotype: Option<String>,

    /// Cohort key -> dataset ID.
    pub cohorts: HashMap<String, String>,

    pub artifacts: ArtifactSettings,

    pub commands: CommandSettings,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `PHENOQL_CONFIG`
    /// 2. `./phenoql.toml`
    /// 3. `~/.config/phenoql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("PHENOQL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("phenoql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("phenoql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Look up a named phenotype list.
    pub fn phenotype_list(&self, key: &str) -> Result<&ArtifactRef, SettingsError> {
        self.artifacts.phenotypes.get(key).ok_or_else(|| {
            let mut available: Vec<&str> = self
                .artifacts
                .phenotypes
                .keys()
                .map(String::as_str)
                .collect();
            available.sort_unstable();
            SettingsError::PhenotypeKeyNotFound {
                key: key.to_string(),
                available: available.join(", "),
            }
        })
    }
}
