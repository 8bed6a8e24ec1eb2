//! The resolved entity graph.

use std::collections::HashSet;

use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, ResolveError};
use crate::field::Field;
use crate::load::{EdgeDescriptor, Schema};
use crate::naming::snake;
use crate::resolve;
use crate::types::{Edge, ID_COLUMN, Index, Rel, Relation, Type};

/// Nodes of the loaded schema with every edge resolved.
///
/// Built once by [`Graph::new`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Graph {
    pub config: Config,
    /// Nodes in declaration order.
    pub nodes: Vec<Type>,
    /// The raw schemas the graph was built from.
    pub schemas: Vec<Schema>,
}

impl Graph {
    /// Build the graph from the given schema declarations.
    ///
    /// Nodes are created first, then edges are attached, then every relation
    /// is resolved, and indexes come last since they may reference relation
    /// columns. All configuration errors found along the way are returned
    /// together.
    pub fn new(config: Config, schemas: Vec<Schema>) -> Result<Self, ResolveError> {
        let mut errors = Vec::new();
        let mut g = Graph {
            config,
            nodes: Vec::with_capacity(schemas.len()),
            schemas: Vec::new(),
        };

        let accepted: Vec<bool> = schemas
            .iter()
            .map(|schema| g.add_node(schema, &mut errors))
            .collect();
        for (schema, _) in schemas.iter().zip(&accepted).filter(|(_, ok)| **ok) {
            g.add_edges(schema, &mut errors);
        }
        resolve::resolve(&mut g.nodes, g.config.naming.as_ref(), &mut errors);
        g.check_columns(&mut errors);
        for (schema, _) in schemas.iter().zip(&accepted).filter(|(_, ok)| **ok) {
            g.add_indexes(schema, &mut errors);
        }

        if !errors.is_empty() {
            return Err(ResolveError::new(errors));
        }
        debug!(nodes = g.nodes.len(), "graph resolved");
        g.schemas = schemas;
        Ok(g)
    }

    /// Node by type name.
    pub fn node(&self, name: &str) -> Option<&Type> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    fn add_node(&mut self, schema: &Schema, errors: &mut Vec<ConfigError>) -> bool {
        if self.node(&schema.name).is_some() {
            errors.push(ConfigError::DuplicateType {
                name: schema.name.clone(),
            });
            return false;
        }

        let mut fields: Vec<Field> = Vec::with_capacity(schema.fields.len());
        for d in &schema.fields {
            if d.name == ID_COLUMN || fields.iter().any(|f| f.name == d.name) {
                errors.push(ConfigError::DuplicateField {
                    owner: schema.name.clone(),
                    field: d.name.clone(),
                });
                continue;
            }
            fields.push(Field::from(d));
        }

        let label = snake(&schema.name);
        let table = self.config.naming.pluralize(&label);
        self.nodes.push(Type {
            name: schema.name.clone(),
            label,
            table,
            id_type: self.config.id_type,
            fields,
            edges: Vec::new(),
            indexes: Vec::new(),
        });
        true
    }

    fn add_edges(&mut self, schema: &Schema, errors: &mut Vec<ConfigError>) {
        let Some(ti) = self.index_of(&schema.name) else {
            return;
        };
        for d in &schema.edges {
            let Some(target) = self.node(&d.target) else {
                errors.push(ConfigError::MissingType {
                    owner: schema.name.clone(),
                    edge: d.name.clone(),
                    target: d.target.clone(),
                });
                continue;
            };
            let target_table = target.table.clone();

            let edges = match (d.inverse, &d.assoc) {
                // assoc only.
                (false, _) => vec![new_edge(d, &schema.name, &schema.name, target_table, None)],
                // inverse only; owned by the type declaring the association.
                (true, None) => {
                    let Some(ref_name) = &d.ref_name else {
                        errors.push(ConfigError::MissingRefName {
                            owner: schema.name.clone(),
                            edge: d.name.clone(),
                        });
                        continue;
                    };
                    vec![new_edge(d, &schema.name, &d.target, target_table, Some(ref_name.clone()))]
                }
                // inverse and assoc declared together.
                (true, Some(assoc)) => {
                    if d.ref_name.is_some() {
                        errors.push(ConfigError::RefNameOnAssocInverse {
                            owner: schema.name.clone(),
                            edge: d.name.clone(),
                            assoc: assoc.name.clone(),
                        });
                        continue;
                    }
                    if assoc.target != schema.name || d.target != schema.name {
                        errors.push(ConfigError::AssocInverseTypeMismatch {
                            owner: schema.name.clone(),
                            edge: d.name.clone(),
                            target: assoc.target.clone(),
                        });
                        continue;
                    }
                    vec![
                        new_edge(d, &schema.name, &schema.name, target_table.clone(), Some(assoc.name.clone())),
                        new_edge(assoc, &schema.name, &schema.name, target_table, None),
                    ]
                }
            };

            let node = &mut self.nodes[ti];
            for edge in edges {
                if node.edges.iter().any(|e| e.name == edge.name) {
                    errors.push(ConfigError::DuplicateEdge {
                        owner: schema.name.clone(),
                        edge: edge.name,
                    });
                    continue;
                }
                node.edges.push(edge);
            }
        }
    }

    /// Relation columns must not shadow a field, or each other, in the table
    /// that stores them.
    fn check_columns(&self, errors: &mut Vec<ConfigError>) {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for n in &self.nodes {
            for e in n.edges.iter().filter(|e| !e.is_inverse()) {
                if matches!(e.rel.kind, Rel::M2M | Rel::Unknown) {
                    continue;
                }
                let (table, column) = (e.rel.table.as_str(), e.rel.column());
                let shadows_field = self
                    .nodes
                    .iter()
                    .find(|t| t.table == table)
                    .is_some_and(|t| t.field(column).is_some());
                if shadows_field || !seen.insert((table, column)) {
                    errors.push(ConfigError::ColumnConflict {
                        owner: n.name.clone(),
                        edge: e.name.clone(),
                        table: table.to_string(),
                        column: column.to_string(),
                    });
                }
            }
        }
    }

    fn add_indexes(&mut self, schema: &Schema, errors: &mut Vec<ConfigError>) {
        let Some(ti) = self.index_of(&schema.name) else {
            return;
        };
        let mut indexes = Vec::with_capacity(schema.indexes.len());
        for d in &schema.indexes {
            let t = &self.nodes[ti];
            let invalid = |reason: String| ConfigError::InvalidIndex {
                owner: schema.name.clone(),
                reason,
            };
            if d.fields.is_empty() && d.edges.is_empty() {
                errors.push(invalid("index must contain at least one column".to_string()));
                continue;
            }

            let mut columns = Vec::with_capacity(d.fields.len() + d.edges.len());
            let mut ok = true;
            for f in &d.fields {
                if f != ID_COLUMN && t.field(f).is_none() {
                    errors.push(invalid(format!("unknown field {:?}", f)));
                    ok = false;
                    continue;
                }
                columns.push(f.clone());
            }
            for name in &d.edges {
                match t.edge(name) {
                    None => {
                        errors.push(invalid(format!("unknown edge {:?}", name)));
                        ok = false;
                    }
                    // already reported by the resolver.
                    Some(e) if e.rel.kind == Rel::Unknown => ok = false,
                    Some(e) if e.rel.kind == Rel::M2M || e.rel.table != t.table => {
                        errors.push(invalid(format!(
                            "edge {:?} has no column in table {:?}",
                            name, t.table
                        )));
                        ok = false;
                    }
                    Some(e) => columns.push(e.rel.column().to_string()),
                }
            }
            if ok {
                indexes.push(Index {
                    name: d.name.clone().unwrap_or_else(|| columns.join("_")),
                    unique: d.unique,
                    columns,
                });
            }
        }
        self.nodes[ti].indexes = indexes;
    }
}

/// An unresolved edge held by `holder`, belonging to the association declared
/// on `owner`.
fn new_edge(d: &EdgeDescriptor, holder: &str, owner: &str, target_table: String, inverse: Option<String>) -> Edge {
    Edge {
        name: d.name.clone(),
        target: d.target.clone(),
        target_table,
        owner: owner.to_string(),
        unique: d.unique,
        optional: !d.required,
        inverse,
        self_ref: d.target == holder,
        bidi: false,
        label: String::new(),
        rel: Relation::default(),
    }
}
