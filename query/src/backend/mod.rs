//! Backend dispatch: one executor per dialect family, chosen once when the
//! client is created.

mod gremlin;
mod sql;

use enum_dispatch::enum_dispatch;
use tracing::debug;

use crate::driver::{Driver, QueryResult, Record};
use crate::error::QueryError;
use crate::select::Aggregate;
use crate::state::QueryState;
use crate::value::Value;

pub use gremlin::GremlinBackend;
pub use sql::SqlBackend;

#[enum_dispatch]
pub trait Execute {
    /// Entity rows as records keyed by column name.
    fn all(&self, driver: &dyn Driver, state: &QueryState) -> Result<Vec<Record>, QueryError>;

    fn count(&self, driver: &dyn Driver, state: &QueryState) -> Result<u64, QueryError>;

    /// Records holding exactly the requested fields.
    fn select(&self, driver: &dyn Driver, state: &QueryState, fields: &[String]) -> Result<Vec<Record>, QueryError>;

    fn group_by(
        &self,
        driver: &dyn Driver,
        state: &QueryState,
        fields: &[String],
        aggregates: &[Aggregate],
    ) -> Result<Vec<Record>, QueryError>;
}

#[enum_dispatch(Execute)]
#[derive(Debug, Clone)]
pub enum Backend {
    Sql(SqlBackend),
    Gremlin(GremlinBackend),
}

impl Backend {
    pub fn for_dialect(dialect: &str) -> Result<Self, QueryError> {
        if let Some(d) = crate::sql::Dialect::from_name(dialect) {
            return Ok(Backend::Sql(SqlBackend::new(d)));
        }
        if dialect == crate::driver::GREMLIN {
            return Ok(Backend::Gremlin(GremlinBackend));
        }
        Err(QueryError::UnsupportedDialect {
            dialect: dialect.to_string(),
        })
    }
}

/// One round trip. Transport errors are wrapped with the operation name and
/// otherwise passed through.
fn run(driver: &dyn Driver, op: &'static str, compiled: (String, Vec<Value>)) -> Result<QueryResult, QueryError> {
    let (query, args) = compiled;
    debug!(op, dialect = driver.dialect(), query = %query, args = args.len(), "executing query");
    driver.query(&query, &args).map_err(QueryError::driver(op))
}

fn to_count(label: &str, value: Option<Value>) -> Result<u64, QueryError> {
    match value {
        None => Ok(0),
        Some(v) => v
            .as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| QueryError::decode(label, format!("count: unexpected {} value", v.kind()))),
    }
}
