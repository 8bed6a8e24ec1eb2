use serde::de::DeserializeOwned;

use crate::driver::Record;
use crate::error::QueryError;

/// A node type the builder can query.
///
/// Rows are decoded through serde from a map of column (or property) name
/// to value, so any `Deserialize` struct whose fields match `COLUMNS`
/// works.
pub trait Entity: DeserializeOwned {
    /// Vertex label.
    const LABEL: &'static str;
    /// SQL table.
    const TABLE: &'static str;
    /// Columns fetched by `all`, the id first.
    const COLUMNS: &'static [&'static str];
}

pub(crate) fn decode<T: DeserializeOwned>(label: &str, record: Record) -> Result<T, QueryError> {
    let json = serde_json::to_value(&record).map_err(|e| QueryError::decode(label, e))?;
    serde_json::from_value(json).map_err(|e| QueryError::decode(label, e))
}
