//! Field selection and grouping on top of a query.

use serde::de::DeserializeOwned;

use crate::builder::Query;
use crate::driver::Record;
use crate::entity::{decode, Entity};
use crate::error::QueryError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Max,
    Mean,
    Min,
    Sum,
}

impl AggregateFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Max => "max",
            AggregateFn::Mean => "mean",
            AggregateFn::Min => "min",
            AggregateFn::Sum => "sum",
        }
    }
}

/// An aggregation over each group. The result is named after the function
/// unless renamed with [`Aggregate::as_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub func: AggregateFn,
    pub column: Option<String>,
    pub name: String,
}

impl Aggregate {
    fn new(func: AggregateFn, column: Option<&str>) -> Self {
        Self {
            func,
            column: column.map(String::from),
            name: func.as_str().to_string(),
        }
    }

    pub fn count() -> Self {
        Self::new(AggregateFn::Count, None)
    }

    pub fn max(column: &str) -> Self {
        Self::new(AggregateFn::Max, Some(column))
    }

    pub fn mean(column: &str) -> Self {
        Self::new(AggregateFn::Mean, Some(column))
    }

    pub fn min(column: &str) -> Self {
        Self::new(AggregateFn::Min, Some(column))
    }

    pub fn sum(column: &str) -> Self {
        Self::new(AggregateFn::Sum, Some(column))
    }

    pub fn as_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

/// Selected fields of the query's rows.
pub struct Select<E> {
    query: Query<E>,
    fields: Vec<String>,
}

impl<E: Entity> Select<E> {
    pub(crate) fn new(query: Query<E>, fields: Vec<String>) -> Self {
        Self { query, fields }
    }

    fn records(&self) -> Result<Vec<Record>, QueryError> {
        self.query.select_records(&self.fields)
    }

    /// Decode every row into `T`, keyed by field name.
    pub fn scan<T: DeserializeOwned>(&self) -> Result<Vec<T>, QueryError> {
        self.records()?
            .into_iter()
            .map(|r| decode(E::LABEL, r))
            .collect()
    }

    pub fn strings(&self) -> Result<Vec<String>, QueryError> {
        let values = single_column("strings", self.fields.len(), || self.records())?;
        convert::<E, _>("strings", values, |v| v.as_str().map(String::from))
    }

    pub fn ints(&self) -> Result<Vec<i64>, QueryError> {
        let values = single_column("ints", self.fields.len(), || self.records())?;
        convert::<E, _>("ints", values, Value::as_i64)
    }

    pub fn floats(&self) -> Result<Vec<f64>, QueryError> {
        let values = single_column("floats", self.fields.len(), || self.records())?;
        convert::<E, _>("floats", values, Value::as_f64)
    }

    pub fn bools(&self) -> Result<Vec<bool>, QueryError> {
        let values = single_column("bools", self.fields.len(), || self.records())?;
        convert::<E, _>("bools", values, Value::as_bool)
    }
}

/// Rows grouped by fields, with one value per aggregate.
pub struct GroupBy<E> {
    query: Query<E>,
    fields: Vec<String>,
    aggregates: Vec<Aggregate>,
}

impl<E: Entity> GroupBy<E> {
    pub(crate) fn new(query: Query<E>, fields: Vec<String>) -> Self {
        Self {
            query,
            fields,
            aggregates: Vec::new(),
        }
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    fn width(&self) -> usize {
        self.fields.len() + self.aggregates.len()
    }

    fn records(&self) -> Result<Vec<Record>, QueryError> {
        self.query.group_records(&self.fields, &self.aggregates)
    }

    pub fn scan<T: DeserializeOwned>(&self) -> Result<Vec<T>, QueryError> {
        self.records()?
            .into_iter()
            .map(|r| decode(E::LABEL, r))
            .collect()
    }

    pub fn strings(&self) -> Result<Vec<String>, QueryError> {
        let values = single_column("strings", self.width(), || self.records())?;
        convert::<E, _>("strings", values, |v| v.as_str().map(String::from))
    }

    pub fn ints(&self) -> Result<Vec<i64>, QueryError> {
        let values = single_column("ints", self.width(), || self.records())?;
        convert::<E, _>("ints", values, Value::as_i64)
    }

    pub fn floats(&self) -> Result<Vec<f64>, QueryError> {
        let values = single_column("floats", self.width(), || self.records())?;
        convert::<E, _>("floats", values, Value::as_f64)
    }

    pub fn bools(&self) -> Result<Vec<bool>, QueryError> {
        let values = single_column("bools", self.width(), || self.records())?;
        convert::<E, _>("bools", values, Value::as_bool)
    }
}

/// Typed readers only make sense over exactly one result column.
fn single_column(
    op: &'static str,
    width: usize,
    records: impl FnOnce() -> Result<Vec<Record>, QueryError>,
) -> Result<Vec<Value>, QueryError> {
    if width != 1 {
        return Err(QueryError::MultipleFields { op, count: width });
    }
    Ok(records()?
        .into_iter()
        .filter_map(|r| r.into_iter().next().map(|(_, v)| v))
        .collect())
}

fn convert<E: Entity, T>(
    op: &str,
    values: Vec<Value>,
    f: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, QueryError> {
    values
        .iter()
        .map(|v| {
            f(v).ok_or_else(|| QueryError::decode(E::LABEL, format!("{}: unexpected {} value", op, v.kind())))
        })
        .collect()
}
