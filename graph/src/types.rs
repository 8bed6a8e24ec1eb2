//! Resolved graph nodes, edges and relations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Column holding the identifier of every node table.
pub const ID_COLUMN: &str = "id";

/// Type of the identifier field of all nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    #[default]
    Int,
    String,
}

impl IdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::Int => "int",
            IdType::String => "string",
        }
    }
}

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rel {
    #[default]
    Unknown,
    O2O,
    O2M,
    M2O,
    M2M,
}

impl Rel {
    /// Cardinality seen from the other end of the relation.
    pub fn mirror(self) -> Rel {
        match self {
            Rel::O2M => Rel::M2O,
            Rel::M2O => Rel::O2M,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rel::Unknown => "Unknown",
            Rel::O2O => "O2O",
            Rel::O2M => "O2M",
            Rel::M2O => "M2O",
            Rel::M2M => "M2M",
        }
    }
}

impl fmt::Display for Rel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage of a resolved edge.
///
/// Non-M2M relations carry one column; M2M relations carry the two join table
/// columns, forward owner side first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: Rel,
    pub table: String,
    pub columns: Vec<String>,
}

impl Relation {
    pub fn new(kind: Rel, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            columns,
        }
    }

    /// The relation column of a non-M2M relation (empty when unresolved).
    pub fn column(&self) -> &str {
        self.columns.first().map(String::as_str).unwrap_or_default()
    }
}

/// A resolved edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub name: String,
    /// Name of the target type.
    #[serde(rename = "type")]
    pub target: String,
    /// Table of the target type.
    pub target_table: String,
    /// Type that declares the association this edge belongs to. For inverse
    /// edges this is the target type.
    pub owner: String,
    pub unique: bool,
    pub optional: bool,
    /// Name of the association an inverse edge points back to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
    pub self_ref: bool,
    /// Self-referencing edge that is its own mirror (e.g. `friends`, `spouse`).
    pub bidi: bool,
    /// Edge label for traversal backends, shared by both ends of a relation.
    pub label: String,
    pub rel: Relation,
}

impl Edge {
    pub fn is_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    /// Whether the relation column is stored in the table of the type that
    /// holds this edge (rather than in the target or a join table).
    pub fn column_on_owner(&self) -> bool {
        match self.rel.kind {
            Rel::M2O => true,
            Rel::O2O => self.is_inverse(),
            _ => false,
        }
    }
}

/// A resolved index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// A node of the graph; one entity type mapped to one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    pub name: String,
    pub label: String,
    pub table: String,
    pub id_type: IdType,
    pub fields: Vec<Field>,
    pub edges: Vec<Edge>,
    pub indexes: Vec<Index>,
}

impl Type {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.name == name)
    }

    /// Association edge by name; inverse edges are not returned.
    pub fn assoc(&self, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.name == name && !e.is_inverse())
    }

    /// Columns selected when reading a node: the id then every field.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(ID_COLUMN)
            .chain(self.fields.iter().map(Field::column))
            .collect()
    }

    /// Directory/package name of the node in generated output.
    pub fn package(&self) -> String {
        self.label.replace('_', "")
    }
}
