//! Relation resolution.
//!
//! Runs in two phases so the outcome never depends on declaration order:
//! every inverse edge is first paired with its association, then the
//! associations left unpaired are resolved on their own. Assignments are
//! computed against the unmodified nodes and written back at the end.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ConfigError;
use crate::naming::{Naming, snake};
use crate::types::{Edge, Rel, Relation, Type};

/// (node index, edge index)
type EdgeRef = (usize, usize);

#[derive(Debug)]
struct Resolution {
    rel: Relation,
    label: String,
    bidi: bool,
}

pub(crate) fn resolve(nodes: &mut [Type], naming: &dyn Naming, errors: &mut Vec<ConfigError>) {
    let mut resolved: Vec<(EdgeRef, Resolution)> = Vec::new();
    // association -> the inverse edge it was paired with.
    let mut paired: HashMap<EdgeRef, EdgeRef> = HashMap::new();

    for (ti, t) in nodes.iter().enumerate() {
        for (ei, e) in t.edges.iter().enumerate() {
            let Some(ref_name) = &e.inverse else {
                continue;
            };
            match pair(nodes, (ti, ei), ref_name, &paired, naming) {
                Ok((assoc, inverse_res, assoc_res)) => {
                    paired.insert(assoc, (ti, ei));
                    resolved.push(((ti, ei), inverse_res));
                    resolved.push((assoc, assoc_res));
                }
                Err(err) => errors.push(err),
            }
        }
    }

    for (ti, t) in nodes.iter().enumerate() {
        for (ei, e) in t.edges.iter().enumerate() {
            if e.is_inverse() || paired.contains_key(&(ti, ei)) {
                continue;
            }
            resolved.push(((ti, ei), standalone(t, e, naming)));
        }
    }

    for ((ti, ei), res) in resolved {
        let t = &mut nodes[ti];
        debug!(
            node = %t.name,
            edge = %t.edges[ei].name,
            rel = %res.rel.kind,
            table = %res.rel.table,
            columns = ?res.rel.columns,
            "resolved relation"
        );
        let e = &mut t.edges[ei];
        e.rel = res.rel;
        e.label = res.label;
        e.bidi = res.bidi;
    }
}

/// Resolve the inverse edge `at` together with the association it names.
///
/// With `a` the uniqueness of the association and `b` the uniqueness of the
/// inverse edge:
///
/// | a | b | inverse | assoc | storage |
/// |---|---|---------|-------|---------|
/// | 1 | 1 | O2O | O2O | `<inverse>_id` in the inverse holder's table |
/// | 0 | 1 | M2O | O2M | `<inverse>_id` in the inverse holder's table |
/// | 1 | 0 | O2M | M2O | `<assoc>_id` in the assoc owner's table |
/// | 0 | 0 | M2M | M2M | join table `<assoc owner label>_<assoc>` |
fn pair(
    nodes: &[Type],
    at: EdgeRef,
    ref_name: &str,
    paired: &HashMap<EdgeRef, EdgeRef>,
    naming: &dyn Naming,
) -> Result<(EdgeRef, Resolution, Resolution), ConfigError> {
    let t = &nodes[at.0];
    let e = &t.edges[at.1];
    let missing = || ConfigError::MissingBackRef {
        owner: t.name.clone(),
        edge: e.name.clone(),
        target: e.target.clone(),
        ref_name: ref_name.to_string(),
    };

    let ri = nodes.iter().position(|n| n.name == e.target).ok_or_else(missing)?;
    let owner = &nodes[ri];
    let rei = owner
        .edges
        .iter()
        .position(|x| x.name == ref_name && !x.is_inverse())
        .ok_or_else(missing)?;
    let assoc = &owner.edges[rei];

    if assoc.target != t.name {
        return Err(ConfigError::BackRefTypeMismatch {
            owner: t.name.clone(),
            edge: e.name.clone(),
            target: owner.name.clone(),
            ref_name: ref_name.to_string(),
            actual: assoc.target.clone(),
        });
    }
    if let Some(&(oti, oei)) = paired.get(&(ri, rei)) {
        return Err(ConfigError::DuplicateBackRef {
            owner: t.name.clone(),
            edge: e.name.clone(),
            target: owner.name.clone(),
            ref_name: ref_name.to_string(),
            other: format!("{}.{}", nodes[oti].name, nodes[oti].edges[oei].name),
        });
    }
    if !e.optional && !assoc.optional {
        return Err(ConfigError::RequiredBothWays {
            owner: t.name.clone(),
            edge: e.name.clone(),
            target: owner.name.clone(),
            ref_name: ref_name.to_string(),
        });
    }

    let column = format!("{}_id", snake(&e.name));
    let (kind, table, columns) = match (assoc.unique, e.unique) {
        (true, true) => (Rel::O2O, t.table.clone(), vec![column]),
        (false, true) => (Rel::M2O, t.table.clone(), vec![column]),
        (true, false) => (Rel::O2M, owner.table.clone(), vec![format!("{}_id", snake(&assoc.name))]),
        (false, false) => {
            let c1 = format!("{}_id", owner.label);
            let mut c2 = format!("{}_id", t.label);
            if c1 == c2 {
                c2 = format!("{}_id", snake(&naming.singularize(&e.name)));
            }
            let c2 = distinct_column(&c1, c2, &e.name);
            (
                Rel::M2M,
                format!("{}_{}", owner.label, snake(&assoc.name)),
                vec![c1, c2],
            )
        }
    };

    let label = format!("{}_{}", owner.label, assoc.name);
    let inverse = Resolution {
        rel: Relation::new(kind, table.clone(), columns.clone()),
        label: label.clone(),
        bidi: false,
    };
    let forward = Resolution {
        rel: Relation::new(kind.mirror(), table, columns),
        label,
        bidi: false,
    };
    Ok(((ri, rei), inverse, forward))
}

/// Resolve an association that no inverse edge points to.
fn standalone(t: &Type, e: &Edge, naming: &dyn Naming) -> Resolution {
    let singular = snake(&naming.singularize(&e.name));
    let column = format!("{}_{}_id", t.label, singular);
    let label = format!("{}_{}", t.label, e.name);

    let (rel, bidi) = match (e.unique, e.self_ref) {
        (false, true) => {
            let c1 = format!("{}_id", t.label);
            let c2 = distinct_column(&c1, format!("{}_id", singular), &e.name);
            let table = format!("{}_{}", t.label, snake(&e.name));
            (Relation::new(Rel::M2M, table, vec![c1, c2]), true)
        }
        (true, true) => (Relation::new(Rel::O2O, t.table.clone(), vec![column]), true),
        (true, false) => (Relation::new(Rel::M2O, t.table.clone(), vec![column]), false),
        (false, false) => (Relation::new(Rel::O2M, e.target_table.clone(), vec![column]), false),
    };
    Resolution { rel, label, bidi }
}

/// Second join table column, prefixed with the edge name if the naming
/// strategy left it equal to the first one.
fn distinct_column(c1: &str, c2: String, edge: &str) -> String {
    if c1 != c2 {
        c2
    } else {
        format!("{}_{}", snake(edge), c2)
    }
}
