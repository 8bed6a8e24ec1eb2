//! Generation configuration.
//!
//! [`Config`] is built once per generation run and handed to the resolver and
//! the emission pipeline. [`ConfigFile`] is its on-disk form, loaded from
//! `.graphgen.json`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::{English, Naming};
use crate::types::IdType;

/// Name of the configuration file looked up by the CLI.
pub const CONFIG_FILE: &str = ".graphgen.json";

/// Header written at the top of every generated file.
pub const DEFAULT_HEADER: &str = "Code generated by graphgen, DO NOT EDIT.";

/// Storage backend the generated code must support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Storage {
    /// Relational backends (mysql, sqlite3, postgres).
    Sql {
        #[serde(default = "default_migrate")]
        migrate: bool,
    },
    /// Gremlin traversal backends. Schema migration is not supported.
    Gremlin,
}

fn default_migrate() -> bool {
    true
}

impl Storage {
    pub fn sql() -> Self {
        Storage::Sql { migrate: true }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Storage::Sql { .. } => "sql",
            Storage::Gremlin => "gremlin",
        }
    }

    /// Reports if the storage needs schema migration support.
    pub fn supports_migrate(&self) -> bool {
        matches!(self, Storage::Sql { migrate: true })
    }
}

/// Immutable configuration of one generation run.
#[derive(Clone)]
pub struct Config {
    /// Path of the schema file or directory.
    pub schema: PathBuf,
    /// Directory receiving the generated artifacts.
    pub target: PathBuf,
    /// Package name of the generated code.
    pub package: String,
    /// Header signature for generated files.
    pub header: String,
    pub storage: Vec<Storage>,
    pub id_type: IdType,
    pub naming: Arc<dyn Naming>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("schema"),
            target: PathBuf::from("gen"),
            package: "gen".to_string(),
            header: DEFAULT_HEADER.to_string(),
            storage: vec![Storage::sql()],
            id_type: IdType::Int,
            naming: Arc::new(English),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("schema", &self.schema)
            .field("target", &self.target)
            .field("package", &self.package)
            .field("header", &self.header)
            .field("storage", &self.storage)
            .field("id_type", &self.id_type)
            .field("naming", &self.naming)
            .finish()
    }
}

impl Config {
    pub fn with_naming(mut self, naming: Arc<dyn Naming>) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = target.into();
        self
    }

    /// Reports if any configured storage needs schema migration.
    pub fn migrate_support(&self) -> bool {
        self.storage.iter().any(Storage::supports_migrate)
    }
}

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<Storage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_type: Option<IdType>,
}

impl ConfigFile {
    /// Load the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigFileError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply the file on top of the default configuration.
    pub fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            schema: self.schema.unwrap_or(defaults.schema),
            target: self.target.unwrap_or(defaults.target),
            package: self.package.unwrap_or(defaults.package),
            header: self.header.unwrap_or(defaults.header),
            storage: if self.storage.is_empty() {
                defaults.storage
            } else {
                self.storage
            },
            id_type: self.id_type.unwrap_or(defaults.id_type),
            naming: defaults.naming,
        }
    }
}
