//! Transport seam between the builder and a database.
//!
//! A [`Driver`] names its dialect and executes query text with positional
//! arguments. SQL drivers return one column per selected expression;
//! traversal drivers return one column per result, holding the traversal's
//! value (a map, a scalar or a list).

use indexmap::IndexMap;

use crate::error::BoxError;
use crate::value::Value;

#[cfg(any(test, feature = "test-utils"))]
mod recording;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingDriver;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;

pub const MYSQL: &str = "mysql";
pub const SQLITE: &str = "sqlite3";
pub const POSTGRES: &str = "postgres";
pub const GREMLIN: &str = "gremlin";

/// One decoded row, keyed by column or property name.
pub type Record = IndexMap<String, Value>;

pub trait Driver: Send + Sync {
    /// Dialect name, one of [`MYSQL`], [`SQLITE`], [`POSTGRES`] or [`GREMLIN`].
    fn dialect(&self) -> &str;

    /// Execute `query` with positional `args` and return its rows.
    fn query(&self, query: &str, args: &[Value]) -> Result<QueryResult, BoxError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    /// Result of a traversal: a single unnamed column per row.
    pub fn values(values: Vec<Value>) -> Self {
        Self {
            headers: Vec::new(),
            rows: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    /// Zip every row with the headers.
    pub fn into_records(self) -> Vec<Record> {
        let headers = self.headers;
        self.rows
            .into_iter()
            .map(|row| headers.iter().cloned().zip(row).collect())
            .collect()
    }

    /// First cell of the first row.
    pub fn into_scalar(self) -> Option<Value> {
        self.rows.into_iter().next().and_then(|row| row.into_iter().next())
    }

    /// First cell of every row.
    pub fn into_column(self) -> Vec<Value> {
        self.rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect()
    }
}
