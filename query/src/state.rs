//! Accumulated state of a query: what the builder has collected so far and
//! what the backends compile.

use crate::predicate::{EdgeStep, Order, Predicate, ID};

/// Largest row count either backend accepts; stands in for "no limit" when
/// only an offset is set.
pub const MAX_LIMIT: u64 = i32::MAX as u64;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub label: String,
    pub table: String,
    pub id: String,
    pub columns: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub order: Vec<Order>,
    pub unique: Vec<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub from: Option<Box<Hop>>,
}

/// A query that starts from the neighbors of another query's results.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub base: QueryState,
    pub step: EdgeStep,
}

impl QueryState {
    pub fn new(label: &str, table: &str, columns: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            table: table.to_string(),
            id: ID.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            predicates: Vec::new(),
            order: Vec::new(),
            unique: Vec::new(),
            limit: None,
            offset: None,
            from: None,
        }
    }

    /// Continue from `base` over `step` into this state's node.
    pub fn from_edge(mut self, base: QueryState, step: EdgeStep) -> Self {
        self.from = Some(Box::new(Hop { base, step }));
        self
    }

    pub fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// Columns a count deduplicates on: the unique override or the id.
    pub fn distinct_columns(&self) -> Vec<String> {
        if self.unique.is_empty() {
            vec![self.id.clone()]
        } else {
            self.unique.clone()
        }
    }

    /// Limit and offset, each clamped to `MAX_LIMIT`.
    pub fn window(&self) -> (Option<u64>, Option<u64>) {
        (self.limit.map(|l| l.min(MAX_LIMIT)), self.offset.map(|o| o.min(MAX_LIMIT)))
    }

    /// Same state with the limit replaced, used by `first`/`only`.
    pub fn with_limit(&self, limit: u64) -> Self {
        let mut state = self.clone();
        state.limit = Some(limit);
        state
    }
}
