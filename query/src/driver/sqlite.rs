//! SQLite transport backed by rusqlite.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use super::{Driver, QueryResult, SQLITE};
use crate::error::BoxError;
use crate::value::Value;

pub struct SqliteDriver {
    conn: Mutex<Connection>,
}

impl SqliteDriver {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run statements that return no rows, such as DDL or seed data.
    pub fn execute_batch(&self, sql: &str) -> Result<(), BoxError> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

impl Driver for SqliteDriver {
    fn dialect(&self) -> &str {
        SQLITE
    }

    fn query(&self, query: &str, args: &[Value]) -> Result<QueryResult, BoxError> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        let mut stmt = conn.prepare(query)?;
        let headers: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let params = args.iter().map(to_sql).collect::<Result<Vec<_>, _>>()?;

        let mut rows = stmt.query(params_from_iter(params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(headers.len());
            for i in 0..headers.len() {
                values.push(from_sql(row.get_ref(i)?));
            }
            out.push(values);
        }
        debug!(rows = out.len(), "sqlite query done");
        Ok(QueryResult::new(headers, out))
    }
}

fn to_sql(value: &Value) -> Result<SqlValue, BoxError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
        other => return Err(format!("sqlite cannot bind a {} argument", other.kind()).into()),
    })
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}
