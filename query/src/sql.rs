//! SQL compilation.
//!
//! Relations are always walked through `IN` subqueries rather than joins, so
//! a row of the queried table is never multiplied by its neighbors.

use crate::predicate::{EdgeStep, Op, Pattern, Predicate, Rel, ID};
use crate::select::{Aggregate, AggregateFn};
use crate::state::{Hop, QueryState, MAX_LIMIT};
use crate::value::Value;

/// Alias of derived tables.
const VIEW: &str = "t0";
/// Alias of the windowed rows a unique-override count deduplicates.
const ROWS: &str = "t1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            crate::driver::MYSQL => Some(Dialect::MySql),
            crate::driver::SQLITE => Some(Dialect::Sqlite),
            crate::driver::POSTGRES => Some(Dialect::Postgres),
            _ => None,
        }
    }

    fn quote(self, ident: &str) -> String {
        match self {
            Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
            Dialect::MySql | Dialect::Sqlite => format!("`{}`", ident.replace('`', "``")),
        }
    }
}

/// Statement text plus its positional arguments.
#[derive(Debug)]
pub struct Builder {
    dialect: Dialect,
    buf: String,
    args: Vec<Value>,
}

impl Builder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            buf: String::new(),
            args: Vec::new(),
        }
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.buf, self.args)
    }

    fn push(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self
    }

    fn quote(&mut self, ident: &str) -> &mut Self {
        let quoted = self.dialect.quote(ident);
        self.push(&quoted)
    }

    fn column(&mut self, table: &str, column: &str) -> &mut Self {
        self.quote(table).push(".").quote(column)
    }

    fn arg(&mut self, value: Value) -> &mut Self {
        self.args.push(value);
        match self.dialect {
            Dialect::Postgres => {
                let placeholder = format!("${}", self.args.len());
                self.push(&placeholder)
            }
            Dialect::MySql | Dialect::Sqlite => self.push("?"),
        }
    }

    fn columns(&mut self, table: &str, columns: &[String]) -> &mut Self {
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.column(table, column);
        }
        self
    }
}

/// Entity rows: every column, deduplicated unless a unique override is set.
pub fn all(dialect: Dialect, state: &QueryState) -> (String, Vec<Value>) {
    let mut b = Builder::new(dialect);
    write_all(&mut b, state);
    b.finish()
}

/// Distinct count over the id or the unique override. A window is applied
/// to the rows before counting.
pub fn count(dialect: Dialect, state: &QueryState) -> (String, Vec<Value>) {
    let mut b = Builder::new(dialect);
    let columns = state.distinct_columns();
    if !state.is_paginated() && columns.len() == 1 {
        b.push("SELECT COUNT(DISTINCT ").column(&state.table, &columns[0]).push(")");
        b.push(" FROM ").quote(&state.table);
        write_where(&mut b, state);
    } else if state.unique.is_empty() {
        b.push("SELECT COUNT(*) FROM (");
        write_select(&mut b, state, &columns, false, true);
        b.push(") AS ").quote(VIEW);
    } else {
        // DISTINCT goes outside the window: Postgres and MySQL reject
        // DISTINCT rows ordered by columns they do not select.
        b.push("SELECT COUNT(*) FROM (SELECT DISTINCT ").columns(ROWS, &columns).push(" FROM (");
        write_select(&mut b, state, &columns, false, true);
        b.push(") AS ").quote(ROWS).push(") AS ").quote(VIEW);
    }
    b.finish()
}

/// Selected fields of the entity rows, in the rows' order.
pub fn select(dialect: Dialect, state: &QueryState, fields: &[String]) -> (String, Vec<Value>) {
    let mut b = Builder::new(dialect);
    b.push("SELECT ").columns(VIEW, fields).push(" FROM (");
    write_all(&mut b, state);
    b.push(") AS ").quote(VIEW);
    if !state.order.is_empty() {
        b.push(" ORDER BY ");
        write_order_terms(&mut b, VIEW, state);
    }
    b.finish()
}

/// Grouped fields followed by one column per aggregate.
pub fn group_by(
    dialect: Dialect,
    state: &QueryState,
    fields: &[String],
    aggregates: &[Aggregate],
) -> (String, Vec<Value>) {
    let mut b = Builder::new(dialect);
    b.push("SELECT ").columns(VIEW, fields);
    for (i, agg) in aggregates.iter().enumerate() {
        if i > 0 || !fields.is_empty() {
            b.push(", ");
        }
        match (&agg.func, &agg.column) {
            (AggregateFn::Count, _) => b.push("COUNT(*)"),
            (func, Some(column)) => b.push(sql_function(*func)).push("(").column(VIEW, column).push(")"),
            (func, None) => b.push(sql_function(*func)).push("(*)"),
        };
        b.push(" AS ").quote(&agg.name);
    }
    b.push(" FROM (");
    write_all(&mut b, state);
    b.push(") AS ").quote(VIEW);
    if !fields.is_empty() {
        b.push(" GROUP BY ").columns(VIEW, fields);
    }
    b.finish()
}

fn sql_function(func: AggregateFn) -> &'static str {
    match func {
        AggregateFn::Count => "COUNT",
        AggregateFn::Max => "MAX",
        AggregateFn::Mean => "AVG",
        AggregateFn::Min => "MIN",
        AggregateFn::Sum => "SUM",
    }
}

fn write_all(b: &mut Builder, state: &QueryState) {
    write_select(b, state, &state.columns, state.unique.is_empty(), true);
}

fn write_select(b: &mut Builder, state: &QueryState, columns: &[String], distinct: bool, window: bool) {
    b.push("SELECT ");
    if distinct {
        b.push("DISTINCT ");
    }
    b.columns(&state.table, columns).push(" FROM ").quote(&state.table);
    write_where(b, state);
    if window {
        if !state.order.is_empty() {
            b.push(" ORDER BY ");
            write_order_terms(b, &state.table, state);
        }
        write_window(b, state);
    }
}

fn write_order_terms(b: &mut Builder, table: &str, state: &QueryState) {
    for (i, order) in state.order.iter().enumerate() {
        if i > 0 {
            b.push(", ");
        }
        b.column(table, &order.column);
        b.push(if order.desc { " DESC" } else { " ASC" });
    }
}

fn write_window(b: &mut Builder, state: &QueryState) {
    let clause = match state.window() {
        (Some(limit), Some(offset)) => format!(" LIMIT {} OFFSET {}", limit, offset),
        (Some(limit), None) => format!(" LIMIT {}", limit),
        (None, Some(offset)) => format!(" LIMIT {} OFFSET {}", MAX_LIMIT, offset),
        (None, None) => return,
    };
    b.push(&clause);
}

fn write_where(b: &mut Builder, state: &QueryState) {
    let mut first = true;
    let mut keyword = |b: &mut Builder| {
        b.push(if first { " WHERE " } else { " AND " });
        first = false;
    };
    if let Some(hop) = &state.from {
        keyword(b);
        write_hop(b, &state.table, hop);
    }
    for predicate in &state.predicates {
        keyword(b);
        write_predicate(b, &state.table, predicate);
    }
}

/// Restrict `table` (the hop target) to the neighbors of the base rows.
fn write_hop(b: &mut Builder, table: &str, hop: &Hop) {
    let step = &hop.step;
    match step.rel {
        Rel::M2M => {
            let (from_column, to_column) = step.join_columns();
            b.column(table, ID).push(" IN (SELECT ");
            b.column(&step.table, to_column).push(" FROM ").quote(&step.table);
            b.push(" WHERE ").column(&step.table, from_column).push(" IN (");
            write_subquery(b, &hop.base, &hop.base.id);
            b.push("))");
        }
        _ if step.column_on_from() => {
            b.column(table, ID).push(" IN (");
            write_subquery(b, &hop.base, step.column());
            b.push(")");
        }
        _ => {
            b.column(table, step.column()).push(" IN (");
            write_subquery(b, &hop.base, &hop.base.id);
            b.push(")");
        }
    }
}

/// A single-column projection of `state`'s rows. A windowed state is
/// evaluated in a derived table first: MySQL rejects LIMIT directly inside
/// an IN subquery, and the window must apply to rows, not to projected
/// values.
fn write_subquery(b: &mut Builder, state: &QueryState, column: &str) {
    if state.is_paginated() {
        let mut columns = vec![state.id.clone()];
        if column != state.id {
            columns.push(column.to_string());
        }
        b.push("SELECT ").column(VIEW, column).push(" FROM (");
        write_select(b, state, &columns, false, true);
        b.push(") AS ").quote(VIEW);
    } else {
        write_select(b, state, &[column.to_string()], false, false);
    }
}

fn write_predicate(b: &mut Builder, table: &str, predicate: &Predicate) {
    match predicate {
        Predicate::Compare { column, op, value } => {
            b.column(table, column).push(match op {
                Op::Eq => " = ",
                Op::Neq => " <> ",
                Op::Gt => " > ",
                Op::Gte => " >= ",
                Op::Lt => " < ",
                Op::Lte => " <= ",
            });
            b.arg(value.clone());
        }
        Predicate::In { values, negate, .. } if values.is_empty() => {
            b.push(if *negate { "1 = 1" } else { "1 = 0" });
        }
        Predicate::In { column, values, negate } => {
            b.column(table, column).push(if *negate { " NOT IN (" } else { " IN (" });
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    b.push(", ");
                }
                b.arg(value.clone());
            }
            b.push(")");
        }
        Predicate::Like { column, pattern, value } => {
            let escaped = escape_like(value);
            let pattern = match pattern {
                Pattern::Contains => format!("%{}%", escaped),
                Pattern::HasPrefix => format!("{}%", escaped),
                Pattern::HasSuffix => format!("%{}", escaped),
            };
            b.column(table, column).push(" LIKE ").arg(Value::String(pattern));
            // Backslash is the default LIKE escape everywhere but SQLite.
            if b.dialect == Dialect::Sqlite {
                b.push(" ESCAPE '\\'");
            }
        }
        Predicate::Null { column, negate } => {
            b.column(table, column).push(if *negate { " IS NOT NULL" } else { " IS NULL" });
        }
        Predicate::And(predicates) => write_group(b, table, predicates, " AND ", "1 = 1"),
        Predicate::Or(predicates) => write_group(b, table, predicates, " OR ", "1 = 0"),
        Predicate::Not(inner) => {
            b.push("NOT (");
            write_predicate(b, table, inner);
            b.push(")");
        }
        Predicate::HasEdge { step, with } => write_has_edge(b, table, step, with),
    }
}

fn write_group(b: &mut Builder, table: &str, predicates: &[Predicate], sep: &str, empty: &str) {
    if predicates.is_empty() {
        b.push(empty);
        return;
    }
    b.push("(");
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            b.push(sep);
        }
        write_predicate(b, table, predicate);
    }
    b.push(")");
}

/// Rows of `table` with at least one neighbor over `step` (matching `with`).
fn write_has_edge(b: &mut Builder, table: &str, step: &EdgeStep, with: &[Predicate]) {
    let id = ID;
    match step.rel {
        Rel::M2M => {
            let (from_column, to_column) = step.join_columns();
            b.column(table, id).push(" IN (SELECT ");
            b.column(&step.table, from_column).push(" FROM ").quote(&step.table);
            if !with.is_empty() {
                b.push(" WHERE ").column(&step.table, to_column).push(" IN (SELECT ");
                b.column(&step.to, id).push(" FROM ").quote(&step.to);
                write_conjunction(b, &step.to, with, " WHERE ");
                b.push(")");
            }
            b.push(")");
        }
        _ if step.column_on_from() => {
            if with.is_empty() {
                b.column(table, step.column()).push(" IS NOT NULL");
            } else {
                b.column(table, step.column()).push(" IN (SELECT ");
                b.column(&step.to, id).push(" FROM ").quote(&step.to);
                write_conjunction(b, &step.to, with, " WHERE ");
                b.push(")");
            }
        }
        _ => {
            b.column(table, id).push(" IN (SELECT ");
            b.column(&step.to, step.column()).push(" FROM ").quote(&step.to);
            b.push(" WHERE ").column(&step.to, step.column()).push(" IS NOT NULL");
            write_conjunction(b, &step.to, with, " AND ");
            b.push(")");
        }
    }
}

fn write_conjunction(b: &mut Builder, table: &str, predicates: &[Predicate], lead: &str) {
    for (i, predicate) in predicates.iter().enumerate() {
        b.push(if i == 0 { lead } else { " AND " });
        write_predicate(b, table, predicate);
    }
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
