use super::{run, to_count, Execute};
use crate::driver::{Driver, Record};
use crate::error::QueryError;
use crate::select::Aggregate;
use crate::sql::{self, Dialect};
use crate::state::QueryState;

#[derive(Debug, Clone)]
pub struct SqlBackend {
    dialect: Dialect,
}

impl SqlBackend {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

/// Key every row by the expected names, whatever the engine calls the
/// columns.
fn named(names: &[String], rows: Vec<Vec<crate::value::Value>>) -> Vec<Record> {
    rows.into_iter()
        .map(|row| names.iter().cloned().zip(row).collect())
        .collect()
}

impl Execute for SqlBackend {
    fn all(&self, driver: &dyn Driver, state: &QueryState) -> Result<Vec<Record>, QueryError> {
        let result = run(driver, "all", sql::all(self.dialect, state))?;
        Ok(named(&state.columns, result.rows))
    }

    fn count(&self, driver: &dyn Driver, state: &QueryState) -> Result<u64, QueryError> {
        let result = run(driver, "count", sql::count(self.dialect, state))?;
        to_count(&state.label, result.into_scalar())
    }

    fn select(&self, driver: &dyn Driver, state: &QueryState, fields: &[String]) -> Result<Vec<Record>, QueryError> {
        let result = run(driver, "select", sql::select(self.dialect, state, fields))?;
        Ok(named(fields, result.rows))
    }

    fn group_by(
        &self,
        driver: &dyn Driver,
        state: &QueryState,
        fields: &[String],
        aggregates: &[Aggregate],
    ) -> Result<Vec<Record>, QueryError> {
        let result = run(driver, "group_by", sql::group_by(self.dialect, state, fields, aggregates))?;
        let names: Vec<String> = fields
            .iter()
            .cloned()
            .chain(aggregates.iter().map(|a| a.name.clone()))
            .collect();
        Ok(named(&names, result.rows))
    }
}
