//! Raw schema descriptors and the JSON schema loader.
//!
//! These types mirror what a user declares. Nothing here is resolved: edges
//! reference their targets by name and inverse edges name their forward edge
//! through `ref`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::field::FieldType;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no schema files found in {0}")]
    Empty(PathBuf),
}

/// A single entity declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub edges: Vec<EdgeDescriptor>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Allowed values for enum fields.
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
}

/// An edge declaration.
///
/// * `inverse = false`: an association owned by the declaring schema.
/// * `inverse = true` with `ref`: a back-reference to the association named
///   `ref` on the target schema.
/// * `inverse = true` with `assoc`: a back-reference declared together with
///   its own association (the association's target must be the declaring
///   schema, and `ref` must be omitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub target: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub inverse: bool,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assoc: Option<Box<EdgeDescriptor>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub fields: Vec<String>,
    /// Edges whose relation columns are part of the index.
    #[serde(default)]
    pub edges: Vec<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            edges: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn edge(mut self, edge: EdgeDescriptor) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            nullable: false,
            unique: false,
            default: None,
            size: None,
            enum_values: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

impl EdgeDescriptor {
    /// An association edge (`To` side).
    pub fn to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            unique: false,
            required: false,
            inverse: false,
            ref_name: None,
            assoc: None,
        }
    }

    /// An inverse edge referencing the association `ref_name` on `target`.
    pub fn from(name: impl Into<String>, target: impl Into<String>, ref_name: impl Into<String>) -> Self {
        Self {
            inverse: true,
            ref_name: Some(ref_name.into()),
            ..Self::to(name, target)
        }
    }

    /// An inverse edge declared together with its association.
    pub fn inverse_of(name: impl Into<String>, assoc: EdgeDescriptor) -> Self {
        Self {
            inverse: true,
            assoc: Some(Box::new(assoc.clone())),
            ..Self::to(name, assoc.target)
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl IndexDescriptor {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn edges<I, S>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges = edges.into_iter().map(Into::into).collect();
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Parse schemas from a JSON document holding either one schema object or an
/// array of schemas.
pub fn parse_schemas(content: &str) -> Result<Vec<Schema>, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Document {
        Many(Vec<Schema>),
        One(Schema),
    }

    Ok(match serde_json::from_str(content)? {
        Document::Many(schemas) => schemas,
        Document::One(schema) => vec![schema],
    })
}

/// Load schemas from a JSON file, or from every `*.json` file in a directory
/// (sorted by file name so declaration order is reproducible).
pub fn load_schemas(path: &Path) -> Result<Vec<Schema>, LoadError> {
    let files = if path.is_dir() {
        let entries = fs::read_dir(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut schemas = Vec::new();
    for file in files {
        let content = fs::read_to_string(&file).map_err(|source| LoadError::Io {
            path: file.clone(),
            source,
        })?;
        let loaded = parse_schemas(&content).map_err(|source| LoadError::Json {
            path: file.clone(),
            source,
        })?;
        debug!(path = %file.display(), count = loaded.len(), "loaded schemas");
        schemas.extend(loaded);
    }
    Ok(schemas)
}
