//! Artifact emission.
//!
//! A [`Generator`] holds the templates of one run. Node templates are rendered
//! once per node, graph templates once per graph unless their `skip` rule
//! holds. Rendered output is written under the configured target directory;
//! the first failure aborts the run.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::graph::Graph;
use crate::schema::Table;
use crate::types::{ID_COLUMN, Rel, Type};

pub type TemplateError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("create dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("execute template {name:?}: {source}")]
    Template {
        name: String,
        #[source]
        source: TemplateError,
    },
}

/// Template executed for every node.
pub trait NodeTemplate: Send + Sync {
    fn name(&self) -> &str;

    /// Output path relative to the target directory.
    fn path(&self, graph: &Graph, node: &Type) -> PathBuf;

    fn render(&self, graph: &Graph, node: &Type) -> Result<String, TemplateError>;
}

/// Template executed once on the whole graph.
pub trait GraphTemplate: Send + Sync {
    fn name(&self) -> &str;

    /// Output path relative to the target directory.
    fn path(&self) -> PathBuf;

    fn render(&self, graph: &Graph) -> Result<String, TemplateError>;

    fn skip(&self, _graph: &Graph) -> bool {
        false
    }
}

pub struct Generator {
    nodes: Vec<Box<dyn NodeTemplate>>,
    graphs: Vec<Box<dyn GraphTemplate>>,
}

impl Default for Generator {
    /// Generator with the built-in templates.
    fn default() -> Self {
        Self::empty()
            .node_template(MetaTemplate)
            .graph_template(DescribeTemplate)
            .graph_template(MigrateTemplate)
    }
}

impl Generator {
    /// Generator without any template.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            graphs: Vec::new(),
        }
    }

    pub fn node_template(mut self, template: impl NodeTemplate + 'static) -> Self {
        self.nodes.push(Box::new(template));
        self
    }

    pub fn graph_template(mut self, template: impl GraphTemplate + 'static) -> Self {
        self.graphs.push(Box::new(template));
        self
    }

    /// Render every template and write the results.
    ///
    /// Returns the written paths in the order they were written.
    pub fn generate(&self, graph: &Graph) -> Result<Vec<PathBuf>, GenError> {
        let target = &graph.config.target;
        info!(target = %target.display(), nodes = graph.nodes.len(), "generating");

        let mut written = Vec::new();
        for node in &graph.nodes {
            for tmpl in &self.nodes {
                let content = tmpl.render(graph, node).map_err(|source| GenError::Template {
                    name: tmpl.name().to_string(),
                    source,
                })?;
                written.push(write_file(&target.join(tmpl.path(graph, node)), &content)?);
            }
        }
        for tmpl in &self.graphs {
            if tmpl.skip(graph) {
                debug!(template = tmpl.name(), "skipped");
                continue;
            }
            let content = tmpl.render(graph).map_err(|source| GenError::Template {
                name: tmpl.name().to_string(),
                source,
            })?;
            written.push(write_file(&target.join(tmpl.path()), &content)?);
        }
        Ok(written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf, GenError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| GenError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| GenError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(path.to_path_buf())
}

/// Storage constants of one node, the data generated accessors are built on.
#[derive(Debug, Serialize)]
pub struct NodeMeta<'a> {
    pub header: &'a str,
    pub label: &'a str,
    pub table: &'a str,
    pub id: &'a str,
    pub columns: Vec<&'a str>,
    pub edges: IndexMap<&'a str, EdgeMeta<'a>>,
}

#[derive(Debug, Serialize)]
pub struct EdgeMeta<'a> {
    /// Table holding the relation.
    pub table: &'a str,
    /// Table of the target type.
    pub inverse_table: &'a str,
    pub columns: &'a [String],
    pub label: &'a str,
    pub relation: Rel,
    pub inverse: bool,
    pub unique: bool,
}

impl<'a> NodeMeta<'a> {
    pub fn new(graph: &'a Graph, node: &'a Type) -> Self {
        Self {
            header: &graph.config.header,
            label: &node.label,
            table: &node.table,
            id: ID_COLUMN,
            columns: node.columns(),
            edges: node
                .edges
                .iter()
                .map(|e| {
                    let meta = EdgeMeta {
                        table: &e.rel.table,
                        inverse_table: &e.target_table,
                        columns: &e.rel.columns,
                        label: &e.label,
                        relation: e.rel.kind,
                        inverse: e.is_inverse(),
                        unique: e.unique,
                    };
                    (e.name.as_str(), meta)
                })
                .collect(),
        }
    }
}

/// `<package>/<node>/meta.json`
pub struct MetaTemplate;

impl NodeTemplate for MetaTemplate {
    fn name(&self) -> &str {
        "meta"
    }

    fn path(&self, graph: &Graph, node: &Type) -> PathBuf {
        Path::new(&graph.config.package).join(node.package()).join("meta.json")
    }

    fn render(&self, graph: &Graph, node: &Type) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(&NodeMeta::new(graph, node))?)
    }
}

/// `describe.txt`
pub struct DescribeTemplate;

impl GraphTemplate for DescribeTemplate {
    fn name(&self) -> &str {
        "describe"
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("describe.txt")
    }

    fn render(&self, graph: &Graph) -> Result<String, TemplateError> {
        let mut out = format!("# {}\n\n", graph.config.header).into_bytes();
        graph.describe(&mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

/// `migrate/schema.json`, only when a storage supports migration.
pub struct MigrateTemplate;

#[derive(Serialize)]
struct MigrateSchema<'a> {
    header: &'a str,
    tables: Vec<Table>,
}

impl GraphTemplate for MigrateTemplate {
    fn name(&self) -> &str {
        "migrate/schema"
    }

    fn path(&self) -> PathBuf {
        Path::new("migrate").join("schema.json")
    }

    fn skip(&self, graph: &Graph) -> bool {
        !graph.config.migrate_support()
    }

    fn render(&self, graph: &Graph) -> Result<String, TemplateError> {
        let schema = MigrateSchema {
            header: &graph.config.header,
            tables: graph.tables(),
        };
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
