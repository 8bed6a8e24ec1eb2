//! Configuration errors raised while building the graph.

use std::fmt;

use thiserror::Error;

/// A self-contradictory schema declaration.
///
/// Every variant names the type and edge (or field/index) at fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("duplicate type {name:?}")]
    DuplicateType { name: String },

    #[error("type {target:?} does not exist for edge {owner}.{edge}")]
    MissingType {
        owner: String,
        edge: String,
        target: String,
    },

    #[error("duplicate field {owner}.{field}")]
    DuplicateField { owner: String, field: String },

    #[error("duplicate edge {owner}.{edge}")]
    DuplicateEdge { owner: String, edge: String },

    #[error("missing reference name for inverse edge: {owner}.{edge}")]
    MissingRefName { owner: String, edge: String },

    #[error("reference name is derived from the assoc name: {owner}.{edge} <-> {owner}.{assoc}")]
    RefNameOnAssocInverse {
        owner: String,
        edge: String,
        assoc: String,
    },

    #[error("assoc-inverse edge allowed only as o2o relation of the same type: {owner}.{edge} -> {target}")]
    AssocInverseTypeMismatch {
        owner: String,
        edge: String,
        target: String,
    },

    #[error("edge is missing for inverse edge: {owner}.{edge} (no edge {target}.{ref_name})")]
    MissingBackRef {
        owner: String,
        edge: String,
        target: String,
        ref_name: String,
    },

    #[error("mismatch type for back-ref {ref_name:?} of {owner}.{edge} <-> {target}.{ref_name} (points to {actual})")]
    BackRefTypeMismatch {
        owner: String,
        edge: String,
        target: String,
        ref_name: String,
        actual: String,
    },

    #[error("edge {target}.{ref_name} is already referenced by inverse edge {other}, cannot pair it with {owner}.{edge}")]
    DuplicateBackRef {
        owner: String,
        edge: String,
        target: String,
        ref_name: String,
        other: String,
    },

    #[error("edges cannot be required in both directions: {owner}.{edge} <-> {target}.{ref_name}")]
    RequiredBothWays {
        owner: String,
        edge: String,
        target: String,
        ref_name: String,
    },

    #[error("column {column:?} of edge {owner}.{edge} collides with a field of table {table:?}")]
    ColumnConflict {
        owner: String,
        edge: String,
        table: String,
        column: String,
    },

    #[error("invalid index for schema {owner:?}: {reason}")]
    InvalidIndex { owner: String, reason: String },
}

/// All configuration errors found while resolving a set of schemas.
///
/// Resolution collects every error it can discover before giving up, so one
/// run reports every broken declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    pub errors: Vec<ConfigError>,
}

impl ResolveError {
    pub fn new(errors: Vec<ConfigError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.errors.iter()
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("graphgen: {}", e))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl From<ConfigError> for ResolveError {
    fn from(err: ConfigError) -> Self {
        Self::new(vec![err])
    }
}
