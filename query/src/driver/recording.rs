//! In-memory driver that records every query and replays canned results.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Driver, QueryResult};
use crate::error::BoxError;
use crate::value::Value;

#[derive(Debug)]
pub struct RecordingDriver {
    dialect: String,
    responses: Mutex<VecDeque<Result<QueryResult, String>>>,
    queries: Mutex<Vec<(String, Vec<Value>)>>,
}

impl RecordingDriver {
    pub fn new(dialect: &str) -> Self {
        Self {
            dialect: dialect.to_string(),
            responses: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queue a result for the next query. Queries without a queued result
    /// get an empty one.
    pub fn respond(self, result: QueryResult) -> Self {
        self.responses.lock().unwrap().push_back(Ok(result));
        self
    }

    /// Queue a transport failure for the next query.
    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Every query executed so far, with its arguments.
    pub fn queries(&self) -> Vec<(String, Vec<Value>)> {
        self.queries.lock().unwrap().clone()
    }

    /// Text of the most recent query.
    pub fn last(&self) -> Option<String> {
        self.queries.lock().unwrap().last().map(|(q, _)| q.clone())
    }
}

impl Driver for RecordingDriver {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn query(&self, query: &str, args: &[Value]) -> Result<QueryResult, BoxError> {
        self.queries
            .lock()
            .map_err(|e| e.to_string())?
            .push((query.to_string(), args.to_vec()));
        let next = self.responses.lock().map_err(|e| e.to_string())?.pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(message.into()),
            None => Ok(QueryResult::default()),
        }
    }
}
