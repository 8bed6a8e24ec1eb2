//! Schema graph for graphgen: loading, relation resolution, relational schema
//! derivation and artifact emission.

pub mod config;
pub mod describe;
pub mod emit;
pub mod error;
pub mod field;
pub mod graph;
pub mod load;
pub mod naming;
mod resolve;
pub mod schema;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items
pub use config::{Config, ConfigFile, ConfigFileError, Storage, CONFIG_FILE, DEFAULT_HEADER};
pub use emit::{GenError, Generator, GraphTemplate, NodeTemplate};
pub use error::{ConfigError, ResolveError};
pub use field::{Field, FieldType};
pub use graph::Graph;
pub use load::{load_schemas, EdgeDescriptor, FieldDescriptor, IndexDescriptor, LoadError, Schema};
pub use naming::{English, Naming};
pub use schema::{Column, ForeignKey, ReferenceOption, Table};
pub use types::{Edge, IdType, Index, Rel, Relation, Type, ID_COLUMN};
