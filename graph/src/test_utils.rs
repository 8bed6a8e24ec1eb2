//! Shared test utilities for graph, query and CLI tests.

#[cfg(feature = "test-utils")]
use std::io::Write;

#[cfg(feature = "test-utils")]
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::graph::Graph;
use crate::load::parse_schemas;

/// Build a graph from a JSON schema document with the default configuration.
pub fn graph_from_json(json: &str) -> Graph {
    let schemas = parse_schemas(json).expect("fixture should parse");
    Graph::new(Config::default(), schemas).expect("fixture should resolve")
}

/// Create a temporary file containing the given schema document.
#[cfg(feature = "test-utils")]
pub fn create_temp_schema_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}
