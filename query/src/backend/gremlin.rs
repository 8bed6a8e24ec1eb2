use indexmap::IndexMap;

use super::{run, to_count, Execute};
use crate::driver::{Driver, Record};
use crate::error::QueryError;
use crate::gremlin;
use crate::select::Aggregate;
use crate::state::QueryState;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct GremlinBackend;

/// Flatten a `valueMap(true)` result: single-element property lists become
/// scalars and the label token is dropped.
fn flatten(label: &str, value: Value) -> Result<Record, QueryError> {
    let map = match value {
        Value::Map(map) => map,
        other => {
            return Err(QueryError::decode(
                label,
                format!("expected a property map, got {}", other.kind()),
            ));
        }
    };
    Ok(map
        .into_iter()
        .filter(|(k, _)| k != "label")
        .map(|(k, v)| match v {
            Value::List(mut items) if items.len() == 1 => (k, items.remove(0)),
            v => (k, v),
        })
        .collect())
}

/// A scalar result becomes a one-entry record under `name`.
fn keyed(label: &str, names: &[String], value: Value) -> Result<Record, QueryError> {
    match (names, value) {
        ([name], value @ (Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_))) => {
            let mut record = IndexMap::new();
            record.insert(name.clone(), value);
            Ok(record)
        }
        (_, value) => flatten(label, value),
    }
}

/// Keep `names`, in that order.
fn project(names: &[String], mut record: Record) -> Record {
    names
        .iter()
        .map(|n| (n.clone(), record.shift_remove(n).unwrap_or(Value::Null)))
        .collect()
}

impl Execute for GremlinBackend {
    fn all(&self, driver: &dyn Driver, state: &QueryState) -> Result<Vec<Record>, QueryError> {
        let result = run(driver, "all", gremlin::all(state))?;
        result
            .into_column()
            .into_iter()
            .map(|v| flatten(&state.label, v))
            .collect()
    }

    fn count(&self, driver: &dyn Driver, state: &QueryState) -> Result<u64, QueryError> {
        let result = run(driver, "count", gremlin::count(state))?;
        to_count(&state.label, result.into_scalar())
    }

    fn select(&self, driver: &dyn Driver, state: &QueryState, fields: &[String]) -> Result<Vec<Record>, QueryError> {
        let result = run(driver, "select", gremlin::select(state, fields))?;
        result
            .into_column()
            .into_iter()
            .map(|v| keyed(&state.label, fields, v).map(|r| project(fields, r)))
            .collect()
    }

    fn group_by(
        &self,
        driver: &dyn Driver,
        state: &QueryState,
        fields: &[String],
        aggregates: &[Aggregate],
    ) -> Result<Vec<Record>, QueryError> {
        let result = run(driver, "group_by", gremlin::group_by(state, fields, aggregates))?;
        let names = gremlin::group_names(fields, aggregates);
        result
            .into_column()
            .into_iter()
            .map(|v| keyed(&state.label, &names, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: Vec<(&str, Value)>) -> Value {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_flatten_value_map() {
        let value = props(vec![
            ("id", Value::Int(1)),
            ("label", Value::from("user")),
            ("name", Value::List(vec![Value::from("a8m")])),
            ("tags", Value::List(vec![Value::from("a"), Value::from("b")])),
        ]);
        let record = flatten("user", value).unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "tags"]);
        assert_eq!(record["name"], Value::from("a8m"));
        assert_eq!(record["tags"], Value::List(vec![Value::from("a"), Value::from("b")]));
    }

    #[test]
    fn test_flatten_rejects_scalars() {
        assert!(flatten("user", Value::Int(1)).is_err());
    }

    #[test]
    fn test_keyed_scalar_and_project() {
        let names = vec!["name".to_string()];
        let record = keyed("user", &names, Value::from("a8m")).unwrap();
        assert_eq!(record["name"], Value::from("a8m"));

        let names = vec!["id".to_string(), "name".to_string()];
        let map = props(vec![("name", Value::List(vec![Value::from("a8m")])), ("id", Value::Int(1))]);
        let record = project(&names, keyed("user", &names, map).unwrap());
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name"]);
    }
}
