//! Backend-neutral filters, orderings and edge steps.
//!
//! Predicates are plain data. Each backend compiles them into its own
//! syntax, so the same [`Predicate`] filters a SQL table or a vertex set.

use crate::value::Value;

pub const ID: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Contains,
    HasPrefix,
    HasSuffix,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare { column: String, op: Op, value: Value },
    In { column: String, values: Vec<Value>, negate: bool },
    Like { column: String, pattern: Pattern, value: String },
    Null { column: String, negate: bool },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// The row has at least one neighbor over `step`, matching `with` when
    /// it is non-empty.
    HasEdge { step: EdgeStep, with: Vec<Predicate> },
}

impl Predicate {
    fn compare(column: &str, op: Op, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, Op::Eq, value)
    }

    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, Op::Neq, value)
    }

    pub fn gt(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, Op::Gt, value)
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, Op::Gte, value)
    }

    pub fn lt(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, Op::Lt, value)
    }

    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, Op::Lte, value)
    }

    pub fn id_eq(value: impl Into<Value>) -> Self {
        Self::eq(ID, value)
    }

    pub fn is_in<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negate: false,
        }
    }

    pub fn not_in<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negate: true,
        }
    }

    fn like(column: &str, pattern: Pattern, value: &str) -> Self {
        Predicate::Like {
            column: column.to_string(),
            pattern,
            value: value.to_string(),
        }
    }

    pub fn contains(column: &str, value: &str) -> Self {
        Self::like(column, Pattern::Contains, value)
    }

    pub fn has_prefix(column: &str, value: &str) -> Self {
        Self::like(column, Pattern::HasPrefix, value)
    }

    pub fn has_suffix(column: &str, value: &str) -> Self {
        Self::like(column, Pattern::HasSuffix, value)
    }

    pub fn is_null(column: &str) -> Self {
        Predicate::Null {
            column: column.to_string(),
            negate: false,
        }
    }

    pub fn not_null(column: &str) -> Self {
        Predicate::Null {
            column: column.to_string(),
            negate: true,
        }
    }

    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(predicates.into_iter().collect())
    }

    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(predicates.into_iter().collect())
    }

    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    pub fn has_edge(step: EdgeStep) -> Self {
        Predicate::HasEdge {
            step,
            with: Vec::new(),
        }
    }

    pub fn has_edge_with(step: EdgeStep, with: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::HasEdge {
            step,
            with: with.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub desc: bool,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            desc: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            desc: true,
        }
    }
}

/// Cardinality of an edge, seen from the node it is declared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rel {
    O2O,
    O2M,
    M2O,
    M2M,
}

/// How to walk one edge from the nodes of `from` to the nodes of `to`.
///
/// `table` and `columns` are the edge's storage: the table holding the
/// foreign key (or the join table), and its column(s). For M2M edges
/// `columns` is `[owner, target]` of the declaring (non-inverse) edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStep {
    pub rel: Rel,
    pub from: String,
    pub to: String,
    pub table: String,
    pub columns: Vec<String>,
    pub label: String,
    pub inverse: bool,
    pub bidi: bool,
}

impl EdgeStep {
    pub fn new(rel: Rel, from: &str, to: &str) -> Self {
        Self {
            rel,
            from: from.to_string(),
            to: to.to_string(),
            table: String::new(),
            columns: Vec::new(),
            label: String::new(),
            inverse: false,
            bidi: false,
        }
    }

    pub fn relation<S: ToString>(mut self, table: &str, columns: impl IntoIterator<Item = S>) -> Self {
        self.table = table.to_string();
        self.columns = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }

    pub fn bidi(mut self) -> Self {
        self.bidi = true;
        self
    }

    /// The foreign key lives on the `from` side.
    pub fn column_on_from(&self) -> bool {
        self.rel == Rel::M2O || (self.rel == Rel::O2O && self.inverse)
    }

    /// Foreign-key column for O2O/O2M/M2O edges.
    pub fn column(&self) -> &str {
        self.columns.first().map(String::as_str).unwrap_or_default()
    }

    /// Join-table columns as `(from side, to side)`.
    pub fn join_columns(&self) -> (&str, &str) {
        let owner = self.columns.first().map(String::as_str).unwrap_or_default();
        let target = self.columns.get(1).map(String::as_str).unwrap_or_default();
        if self.inverse {
            (target, owner)
        } else {
            (owner, target)
        }
    }
}
