//! Gremlin compilation.
//!
//! Traversals are Groovy text with every user value bound as `$0`, `$1`...
//! Labels and property keys come from the schema and are inlined as quoted
//! literals.

use crate::predicate::{EdgeStep, Op, Pattern, Predicate, ID};
use crate::select::{Aggregate, AggregateFn};
use crate::state::{QueryState, MAX_LIMIT};
use crate::value::Value;

#[derive(Debug, Default)]
pub struct Traversal {
    buf: String,
    args: Vec<Value>,
}

impl Traversal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.buf, self.args)
    }

    fn push(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self
    }

    fn bind(&mut self, value: Value) -> &mut Self {
        let name = format!("${}", self.args.len());
        self.args.push(value);
        self.push(&name)
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Property key, or the id token.
fn key(column: &str) -> String {
    if column == ID {
        "T.id".to_string()
    } else {
        quote(column)
    }
}

fn quoted_list(columns: &[String]) -> String {
    columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ")
}

/// Entity vertices as property maps including the id.
pub fn all(state: &QueryState) -> (String, Vec<Value>) {
    let mut t = Traversal::new();
    write_windowed(&mut t, state);
    t.push(".valueMap(true)");
    t.finish()
}

/// Windowed count, deduplicated by id before the window or by the unique
/// override after it.
pub fn count(state: &QueryState) -> (String, Vec<Value>) {
    let mut t = Traversal::new();
    write_windowed(&mut t, state);
    write_dedup_by(&mut t, &state.unique);
    t.push(".count()");
    t.finish()
}

/// A single field yields its values, several fields yield maps.
pub fn select(state: &QueryState, fields: &[String]) -> (String, Vec<Value>) {
    let mut t = Traversal::new();
    write_windowed(&mut t, state);
    match fields {
        [field] if field == ID => t.push(".id()"),
        [field] => t.push(&format!(".values({})", quote(field))),
        _ => {
            let named: Vec<String> = fields.iter().filter(|f| *f != ID).cloned().collect();
            t.push(&format!(".valueMap(true, {})", quoted_list(&named)))
        }
    };
    t.finish()
}

/// Names produced per group: aggregates first, then the grouped fields.
pub fn group_names(fields: &[String], aggregates: &[Aggregate]) -> Vec<String> {
    aggregates
        .iter()
        .map(|a| a.name.clone())
        .chain(fields.iter().cloned())
        .collect()
}

pub fn group_by(state: &QueryState, fields: &[String], aggregates: &[Aggregate]) -> (String, Vec<Value>) {
    let mut t = Traversal::new();
    write_windowed(&mut t, state);

    let mut matches = Vec::new();
    for agg in aggregates {
        let step = match (&agg.func, &agg.column) {
            (AggregateFn::Count, _) | (_, None) => "__.as('p').count(local)".to_string(),
            (func, Some(column)) => format!(
                "__.as('p').unfold().values({}).{}()",
                quote(column),
                gremlin_function(*func)
            ),
        };
        matches.push(format!("{}.as({})", step, quote(&agg.name)));
    }
    for field in fields {
        matches.push(format!(
            "__.as('p').unfold().values({}).as({})",
            quote(field),
            quote(field)
        ));
    }
    let names = group_names(fields, aggregates);

    t.push(&format!(".group().by(__.values({}).fold())", quoted_list(fields)));
    t.push(&format!(
        ".by(__.fold().match({}).select({}))",
        matches.join(", "),
        quoted_list(&names)
    ));
    t.push(".select(values).unfold()");
    t.finish()
}

fn gremlin_function(func: AggregateFn) -> &'static str {
    match func {
        AggregateFn::Count => "count",
        AggregateFn::Max => "max",
        AggregateFn::Mean => "mean",
        AggregateFn::Min => "min",
        AggregateFn::Sum => "sum",
    }
}

/// Source vertices plus predicates, without any window.
fn write_filtered(t: &mut Traversal, state: &QueryState) {
    match &state.from {
        None => {
            t.push(&format!("g.V().hasLabel({})", quote(&state.label)));
        }
        Some(hop) => {
            write_windowed(t, &hop.base);
            t.push(&format!(".{}({})", direction(&hop.step), quote(&hop.step.label)));
        }
    }
    for predicate in &state.predicates {
        t.push(".");
        write_predicate(t, predicate);
    }
}

/// Filtered vertices, deduplicated (unless overridden), ordered and ranged.
fn write_windowed(t: &mut Traversal, state: &QueryState) {
    write_filtered(t, state);
    if state.unique.is_empty() {
        t.push(".dedup()");
    }
    write_order(t, state);
    write_range(t, state);
}

fn write_dedup_by(t: &mut Traversal, unique: &[String]) {
    match unique {
        [] => {}
        [column] => {
            t.push(&format!(".dedup().by({})", key(column)));
        }
        columns => {
            t.push(&format!(".dedup().by(__.values({}).fold())", quoted_list(columns)));
        }
    }
}

fn write_order(t: &mut Traversal, state: &QueryState) {
    if state.order.is_empty() {
        return;
    }
    t.push(".order()");
    for order in &state.order {
        let dir = if order.desc { "desc" } else { "asc" };
        t.push(&format!(".by({}, {})", key(&order.column), dir));
    }
}

fn write_range(t: &mut Traversal, state: &QueryState) {
    let step = match state.window() {
        (Some(limit), Some(offset)) => format!(".range({}, {})", offset, offset.saturating_add(limit).min(MAX_LIMIT)),
        (Some(limit), None) => format!(".limit({})", limit),
        (None, Some(offset)) => format!(".range({}, {})", offset, MAX_LIMIT),
        (None, None) => return,
    };
    t.push(&step);
}

fn direction(step: &EdgeStep) -> &'static str {
    if step.bidi {
        "both"
    } else if step.inverse {
        "in"
    } else {
        "out"
    }
}

fn write_predicate(t: &mut Traversal, predicate: &Predicate) {
    match predicate {
        Predicate::Compare { column, op, value } => {
            let op = match op {
                Op::Eq => "eq",
                Op::Neq => "neq",
                Op::Gt => "gt",
                Op::Gte => "gte",
                Op::Lt => "lt",
                Op::Lte => "lte",
            };
            write_has(t, column);
            t.push(op).push("(").bind(value.clone()).push("))");
        }
        Predicate::In { column, values, negate } => {
            write_has(t, column);
            t.push(if *negate { "without(" } else { "within(" });
            t.bind(Value::List(values.clone())).push("))");
        }
        Predicate::Like { column, pattern, value } => {
            write_has(t, column);
            t.push(match pattern {
                Pattern::Contains => "containing(",
                Pattern::HasPrefix => "startingWith(",
                Pattern::HasSuffix => "endingWith(",
            });
            t.bind(Value::String(value.clone())).push("))");
        }
        Predicate::Null { column, negate } => {
            let step = if *negate { "has" } else { "hasNot" };
            t.push(&format!("{}({})", step, quote(column)));
        }
        Predicate::And(predicates) if predicates.is_empty() => {
            t.push("identity()");
        }
        Predicate::Or(predicates) if predicates.is_empty() => {
            t.push("not(identity())");
        }
        Predicate::And(predicates) => write_group(t, "and", predicates),
        Predicate::Or(predicates) => write_group(t, "or", predicates),
        Predicate::Not(inner) => {
            t.push("not(__.");
            write_predicate(t, inner);
            t.push(")");
        }
        Predicate::HasEdge { step, with } if with.is_empty() => {
            t.push(&format!("where(__.{}E({}))", direction(step), quote(&step.label)));
        }
        Predicate::HasEdge { step, with } => {
            t.push(&format!("where(__.{}({})", direction(step), quote(&step.label)));
            for predicate in with {
                t.push(".");
                write_predicate(t, predicate);
            }
            t.push(")");
        }
    }
}

/// Opens `has('column', ` or `hasId(`; the caller closes it.
fn write_has(t: &mut Traversal, column: &str) {
    if column == ID {
        t.push("hasId(");
    } else {
        t.push(&format!("has({}, ", quote(column)));
    }
}

fn write_group(t: &mut Traversal, step: &str, predicates: &[Predicate]) {
    t.push(step).push("(");
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            t.push(", ");
        }
        t.push("__.");
        write_predicate(t, predicate);
    }
    t.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Order, Rel};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn users() -> QueryState {
        QueryState::new("user", "users", &["id", "age", "name"])
    }

    #[test]
    fn test_all_plain() {
        let (query, args) = all(&users());
        assert_eq!(query, "g.V().hasLabel('user').dedup().valueMap(true)");
        assert!(args.is_empty());
    }

    #[test]
    fn test_predicates_are_bound() {
        let mut state = users();
        state.predicates.push(Predicate::id_eq(1));
        state.predicates.push(Predicate::gt("age", 30));
        state.predicates.push(Predicate::has_prefix("name", "a"));
        state.predicates.push(Predicate::is_null("nickname"));
        let (query, args) = all(&state);
        assert_eq!(
            query,
            "g.V().hasLabel('user').hasId(eq($0)).has('age', gt($1)).has('name', startingWith($2))\
             .hasNot('nickname').dedup().valueMap(true)"
        );
        assert_eq!(args, vec![Value::Int(1), Value::Int(30), Value::from("a")]);
    }

    #[rstest]
    #[case(Some(10), Some(5), ".range(5, 15)")]
    #[case(Some(10), None, ".limit(10)")]
    #[case(None, Some(5), ".range(5, 2147483647)")]
    #[case(Some(u64::MAX), Some(1), ".range(1, 2147483647)")]
    #[case(Some(u64::MAX), None, ".limit(2147483647)")]
    #[case(None, Some(u64::MAX), ".range(2147483647, 2147483647)")]
    fn test_window(#[case] limit: Option<u64>, #[case] offset: Option<u64>, #[case] expected: &str) {
        let mut state = users();
        state.limit = limit;
        state.offset = offset;
        state.order.push(Order::desc("name"));
        let (query, _) = all(&state);
        assert_eq!(
            query,
            format!("g.V().hasLabel('user').dedup().order().by('name', desc){}.valueMap(true)", expected)
        );
    }

    #[rstest]
    #[case(vec![], "g.V().hasLabel('user').dedup().count()")]
    #[case(vec!["name"], "g.V().hasLabel('user').dedup().by('name').count()")]
    #[case(vec!["name", "age"], "g.V().hasLabel('user').dedup().by(__.values('name', 'age').fold()).count()")]
    fn test_count(#[case] unique: Vec<&str>, #[case] expected: &str) {
        let mut state = users();
        state.unique = unique.into_iter().map(String::from).collect();
        assert_eq!(count(&state).0, expected);
    }

    #[test]
    fn test_count_applies_window() {
        let mut state = users();
        state.limit = Some(2);
        assert_eq!(count(&state).0, "g.V().hasLabel('user').dedup().limit(2).count()");
    }

    #[test]
    fn test_count_unique_override_dedups_after_window() {
        let mut state = users();
        state.unique = vec!["name".into()];
        state.order.push(Order::asc("age"));
        state.limit = Some(5);
        assert_eq!(
            count(&state).0,
            "g.V().hasLabel('user').order().by('age', asc).limit(5).dedup().by('name').count()"
        );
    }

    #[test]
    fn test_hop() {
        let mut base = users();
        base.predicates.push(Predicate::id_eq(1));
        let step = EdgeStep::new(Rel::O2M, "users", "pets").label("user_pets");
        let state = QueryState::new("pet", "pets", &["id", "name"]).from_edge(base, step);
        assert_eq!(
            all(&state).0,
            "g.V().hasLabel('user').hasId(eq($0)).dedup().out('user_pets').dedup().valueMap(true)"
        );

        let back = EdgeStep::new(Rel::M2O, "pets", "users").label("user_pets").inverse();
        let owners = users().from_edge(QueryState::new("pet", "pets", &["id"]), back);
        assert_eq!(all(&owners).0, "g.V().hasLabel('pet').dedup().in('user_pets').dedup().valueMap(true)");
    }

    #[test]
    fn test_has_edge() {
        let spouse = EdgeStep::new(Rel::O2O, "users", "users").label("user_spouse").bidi();
        let mut state = users();
        state.predicates.push(Predicate::has_edge(spouse.clone()));
        state.predicates.push(Predicate::has_edge_with(spouse, [Predicate::eq("name", "nati")]));
        assert_eq!(
            all(&state).0,
            "g.V().hasLabel('user').where(__.bothE('user_spouse')).where(__.both('user_spouse').has('name', eq($0)))\
             .dedup().valueMap(true)"
        );
    }

    #[test]
    fn test_boolean_groups() {
        let mut state = users();
        state.predicates.push(Predicate::or([
            Predicate::eq("name", "a8m"),
            Predicate::not(Predicate::is_in("age", [1, 2])),
        ]));
        state.predicates.push(Predicate::or([]));
        let (query, args) = all(&state);
        assert_eq!(
            query,
            "g.V().hasLabel('user').or(__.has('name', eq($0)), __.not(__.has('age', within($1))))\
             .not(identity()).dedup().valueMap(true)"
        );
        assert_eq!(args[1], Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_select() {
        assert_eq!(select(&users(), &["id".to_string()]).0, "g.V().hasLabel('user').dedup().id()");
        assert_eq!(
            select(&users(), &["name".to_string()]).0,
            "g.V().hasLabel('user').dedup().values('name')"
        );
        assert_eq!(
            select(&users(), &["id".to_string(), "name".to_string()]).0,
            "g.V().hasLabel('user').dedup().valueMap(true, 'name')"
        );
    }

    #[test]
    fn test_group_by() {
        let aggregates = vec![Aggregate::count(), Aggregate::max("age")];
        let (query, _) = group_by(&users(), &["name".to_string()], &aggregates);
        assert_eq!(
            query,
            "g.V().hasLabel('user').dedup().group().by(__.values('name').fold())\
             .by(__.fold().match(__.as('p').count(local).as('count'), \
             __.as('p').unfold().values('age').max().as('max'), \
             __.as('p').unfold().values('name').as('name')).select('count', 'max', 'name'))\
             .select(values).unfold()"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), "'it\\'s'");
    }
}
