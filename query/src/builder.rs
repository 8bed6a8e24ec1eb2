//! The query accumulator and its terminals.

use std::marker::PhantomData;

use crate::backend::Execute;
use crate::client::Client;
use crate::driver::Record;
use crate::entity::{decode, Entity};
use crate::error::QueryError;
use crate::predicate::{EdgeStep, Order, Predicate, ID};
use crate::select::{Aggregate, GroupBy, Select};
use crate::state::QueryState;
use crate::value::Value;

/// Builder for queries over `E`.
///
/// Configuration methods consume and return the builder; terminals borrow
/// it, so a query can be executed more than once. `clone` copies the whole
/// state, including the chain of edge hops.
pub struct Query<E> {
    client: Client,
    state: QueryState,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: self.state.clone(),
            entity: PhantomData,
        }
    }
}

impl<E: Entity> Query<E> {
    pub(crate) fn new(client: Client) -> Self {
        Self::with_state(client, QueryState::new(E::LABEL, E::TABLE, E::COLUMNS))
    }

    fn with_state(client: Client, state: QueryState) -> Self {
        Self {
            client,
            state,
            entity: PhantomData,
        }
    }

    /// Accumulated state, as the backends will see it.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Add a predicate. Predicates are ANDed in insertion order.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.state.predicates.push(predicate);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.state.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.state.offset = Some(offset);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.state.order.push(order);
        self
    }

    /// Count distinct values of `columns` instead of ids, and stop
    /// deduplicating fetched rows.
    pub fn unique<S: ToString>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.state.unique = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }

    /// Query the neighbors of this query's results over `step`.
    pub fn query_edge<T: Entity>(self, step: EdgeStep) -> Query<T> {
        let state = QueryState::new(T::LABEL, T::TABLE, T::COLUMNS).from_edge(self.state, step);
        Query::with_state(self.client, state)
    }

    pub fn select<S: ToString>(self, fields: impl IntoIterator<Item = S>) -> Select<E> {
        Select::new(self, fields.into_iter().map(|f| f.to_string()).collect())
    }

    pub fn group_by<S: ToString>(self, fields: impl IntoIterator<Item = S>) -> GroupBy<E> {
        GroupBy::new(self, fields.into_iter().map(|f| f.to_string()).collect())
    }

    pub fn all(&self) -> Result<Vec<E>, QueryError> {
        fetch(&self.client, &self.state)
    }

    /// The first entity, or `NotFound`.
    pub fn first(&self) -> Result<E, QueryError> {
        fetch(&self.client, &self.state.with_limit(1))?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found())
    }

    /// The only entity: `NotFound` when there is none, `NotSingular` when
    /// there is more than one.
    pub fn only(&self) -> Result<E, QueryError> {
        let mut entities = fetch::<E>(&self.client, &self.state.with_limit(2))?;
        match entities.len() {
            1 => Ok(entities.remove(0)),
            0 => Err(self.not_found()),
            _ => Err(self.not_singular()),
        }
    }

    pub fn ids(&self) -> Result<Vec<Value>, QueryError> {
        ids(&self.client, &self.state)
    }

    pub fn first_id(&self) -> Result<Value, QueryError> {
        ids(&self.client, &self.state.with_limit(1))?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found())
    }

    pub fn only_id(&self) -> Result<Value, QueryError> {
        let mut ids = ids(&self.client, &self.state.with_limit(2))?;
        match ids.len() {
            1 => Ok(ids.remove(0)),
            0 => Err(self.not_found()),
            _ => Err(self.not_singular()),
        }
    }

    pub fn count(&self) -> Result<u64, QueryError> {
        self.client
            .backend()
            .count(self.client.driver(), &self.state)
    }

    pub fn exist(&self) -> Result<bool, QueryError> {
        Ok(self.count()? > 0)
    }

    pub(crate) fn select_records(&self, fields: &[String]) -> Result<Vec<Record>, QueryError> {
        self.client
            .backend()
            .select(self.client.driver(), &self.state, fields)
    }

    pub(crate) fn group_records(
        &self,
        fields: &[String],
        aggregates: &[Aggregate],
    ) -> Result<Vec<Record>, QueryError> {
        self.client
            .backend()
            .group_by(self.client.driver(), &self.state, fields, aggregates)
    }

    fn not_found(&self) -> QueryError {
        QueryError::NotFound {
            label: self.state.label.clone(),
        }
    }

    fn not_singular(&self) -> QueryError {
        QueryError::NotSingular {
            label: self.state.label.clone(),
        }
    }
}

fn fetch<E: Entity>(client: &Client, state: &QueryState) -> Result<Vec<E>, QueryError> {
    client
        .backend()
        .all(client.driver(), state)?
        .into_iter()
        .map(|r| decode(&state.label, r))
        .collect()
}

fn ids(client: &Client, state: &QueryState) -> Result<Vec<Value>, QueryError> {
    let fields = [ID.to_string()];
    Ok(client
        .backend()
        .select(client.driver(), state, &fields)?
        .into_iter()
        .filter_map(|mut r| r.shift_remove(ID))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;
    use crate::driver::{QueryResult, RecordingDriver, GREMLIN, SQLITE};
    use crate::predicate::Rel;
    use crate::select::Aggregate;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    impl Entity for User {
        const LABEL: &'static str = "user";
        const TABLE: &'static str = "users";
        const COLUMNS: &'static [&'static str] = &["id", "name"];
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pet {
        id: i64,
        name: String,
    }

    impl Entity for Pet {
        const LABEL: &'static str = "pet";
        const TABLE: &'static str = "pets";
        const COLUMNS: &'static [&'static str] = &["id", "name"];
    }

    fn rows(rows: Vec<(i64, &str)>) -> QueryResult {
        QueryResult::new(
            vec!["id".into(), "name".into()],
            rows.into_iter()
                .map(|(id, name)| vec![Value::Int(id), Value::from(name)])
                .collect(),
        )
    }

    fn client(driver: RecordingDriver) -> (Client, Arc<RecordingDriver>) {
        let driver = Arc::new(driver);
        let client = Client::new(driver.clone()).unwrap();
        (client, driver)
    }

    #[test]
    fn test_all_decodes_rows() {
        let (client, driver) = client(RecordingDriver::new(SQLITE).respond(rows(vec![(1, "a8m"), (2, "nati")])));
        let users = client.query::<User>().filter(Predicate::gt("id", 0)).all().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1], User { id: 2, name: "nati".into() });

        let queries = driver.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0].0,
            "SELECT DISTINCT `users`.`id`, `users`.`name` FROM `users` WHERE `users`.`id` > ?"
        );
        assert_eq!(queries[0].1, vec![Value::Int(0)]);
    }

    #[test]
    fn test_first_not_found() {
        let (client, driver) = client(RecordingDriver::new(SQLITE));
        let err = client.query::<User>().first().unwrap_err();
        assert!(err.is_not_found());
        assert!(driver.last().unwrap().ends_with("LIMIT 1"));
    }

    #[test]
    fn test_first_does_not_touch_builder() {
        let (client, _) = client(RecordingDriver::new(SQLITE).respond(rows(vec![(1, "a8m")])));
        let query = client.query::<User>().limit(10);
        assert_eq!(query.first().unwrap().id, 1);
        assert_eq!(query.state().limit, Some(10));
    }

    #[test]
    fn test_only() {
        let (client, driver) = client(
            RecordingDriver::new(SQLITE)
                .respond(rows(vec![(1, "a8m")]))
                .respond(rows(vec![(1, "a8m"), (2, "nati")]))
                .respond(rows(vec![])),
        );
        let query = client.query::<User>();
        assert_eq!(query.only().unwrap().name, "a8m");
        assert!(query.only().unwrap_err().is_not_singular());
        assert!(query.only().unwrap_err().is_not_found());
        assert!(driver.last().unwrap().ends_with("LIMIT 2"));
    }

    #[test]
    fn test_ids() {
        let ids = QueryResult::new(vec!["id".into()], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        let (client, driver) = client(RecordingDriver::new(SQLITE).respond(ids).respond(QueryResult::default()));
        let query = client.query::<User>();
        assert_eq!(query.ids().unwrap(), vec![Value::Int(1), Value::Int(2)]);
        assert!(driver.last().unwrap().starts_with("SELECT `t0`.`id` FROM ("));
        assert!(query.first_id().unwrap_err().is_not_found());
    }

    #[test]
    fn test_count_and_exist() {
        let count = QueryResult::new(vec!["COUNT".into()], vec![vec![Value::Int(3)]]);
        let zero = QueryResult::new(vec!["COUNT".into()], vec![vec![Value::Int(0)]]);
        let (client, driver) = client(RecordingDriver::new(SQLITE).respond(count).respond(zero));
        let query = client.query::<User>();
        assert_eq!(query.count().unwrap(), 3);
        assert!(!query.exist().unwrap());

        let queries = driver.queries();
        assert_eq!(queries[0].0, queries[1].0);
    }

    #[test]
    fn test_driver_error_carries_operation() {
        let (client, _) = client(RecordingDriver::new(SQLITE).fail("database is locked"));
        let err = client.query::<User>().count().unwrap_err();
        assert_eq!(err.to_string(), "count: database is locked");
        assert!(matches!(err, QueryError::Driver { op: "count", .. }));
    }

    #[test]
    fn test_unsupported_dialect() {
        let err = Client::new(Arc::new(RecordingDriver::new("cassandra"))).unwrap_err();
        assert_eq!(err.to_string(), "unsupported dialect: \"cassandra\"");
    }

    #[test]
    fn test_clone_is_independent() {
        let (client, _) = client(RecordingDriver::new(SQLITE));
        let base = client.query::<User>().filter(Predicate::eq("name", "a8m"));
        let narrowed = base.clone().filter(Predicate::gt("id", 1)).order(Order::asc("name"));
        assert_eq!(base.state().predicates.len(), 1);
        assert!(base.state().order.is_empty());
        assert_eq!(narrowed.state().predicates.len(), 2);
    }

    #[test]
    fn test_query_edge_on_gremlin() {
        let pets = QueryResult::values(vec![Value::Map(
            [
                ("id".to_string(), Value::Int(7)),
                ("label".to_string(), Value::from("pet")),
                ("name".to_string(), Value::List(vec![Value::from("pedro")])),
            ]
            .into_iter()
            .collect(),
        )]);
        let (client, driver) = client(RecordingDriver::new(GREMLIN).respond(pets));
        let step = EdgeStep::new(Rel::O2M, "users", "pets").label("user_pets");
        let pets = client
            .query::<User>()
            .filter(Predicate::id_eq(1))
            .query_edge::<Pet>(step)
            .all()
            .unwrap();
        assert_eq!(pets, vec![Pet { id: 7, name: "pedro".into() }]);
        assert_eq!(
            driver.last().unwrap(),
            "g.V().hasLabel('user').hasId(eq($0)).dedup().out('user_pets').dedup().valueMap(true)"
        );
    }

    #[test]
    fn test_select_strings() {
        let names = QueryResult::new(vec!["name".into()], vec![vec![Value::from("a8m")], vec![Value::from("nati")]]);
        let (client, _) = client(RecordingDriver::new(SQLITE).respond(names));
        let names = client.query::<User>().select(["name"]).strings().unwrap();
        assert_eq!(names, vec!["a8m", "nati"]);
    }

    #[test]
    fn test_select_multiple_fields_rejects_scalar_reader() {
        let (client, driver) = client(RecordingDriver::new(SQLITE));
        let err = client.query::<User>().select(["id", "name"]).ints().unwrap_err();
        assert!(matches!(err, QueryError::MultipleFields { op: "ints", count: 2 }));
        assert!(driver.queries().is_empty());
    }

    #[test]
    fn test_group_by_scan_on_gremlin() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct NameCount {
            name: String,
            count: i64,
        }

        let groups = QueryResult::values(vec![Value::Map(
            [
                ("count".to_string(), Value::Int(2)),
                ("name".to_string(), Value::from("a8m")),
            ]
            .into_iter()
            .collect(),
        )]);
        let (client, _) = client(RecordingDriver::new(GREMLIN).respond(groups));
        let rows: Vec<NameCount> = client
            .query::<User>()
            .group_by(["name"])
            .aggregate(Aggregate::count())
            .scan()
            .unwrap();
        assert_eq!(rows, vec![NameCount { name: "a8m".into(), count: 2 }]);
    }

    #[test]
    fn test_group_by_single_aggregate_ints_on_sql() {
        let sums = QueryResult::new(vec!["sum".into()], vec![vec![Value::Int(10)]]);
        let (client, driver) = client(RecordingDriver::new(SQLITE).respond(sums));
        let sums = client.query::<User>().group_by(Vec::<String>::new()).aggregate(Aggregate::sum("id")).ints().unwrap();
        assert_eq!(sums, vec![10]);
        assert!(driver.last().unwrap().starts_with("SELECT SUM(`t0`.`id`) AS `sum` FROM ("));
    }
}
