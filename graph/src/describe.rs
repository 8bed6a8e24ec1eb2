//! Human-readable description of a resolved graph.

use std::io::{self, Write};

use crate::graph::Graph;
use crate::types::{ID_COLUMN, Type};

impl Graph {
    /// Write a description of every node to `w`.
    pub fn describe<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for n in &self.nodes {
            n.describe(w)?;
        }
        Ok(())
    }
}

impl Type {
    /// Write the node name followed by its field and edge tables.
    pub fn describe<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}:", self.name)?;

        let mut fields = vec![vec![
            ID_COLUMN.to_string(),
            self.id_type.as_str().to_string(),
            "false".to_string(),
            "false".to_string(),
            "false".to_string(),
            String::new(),
        ]];
        fields.extend(self.fields.iter().map(|f| {
            vec![
                f.name.clone(),
                f.kind.to_string(),
                f.unique.to_string(),
                f.optional.to_string(),
                f.nullable.to_string(),
                f.default.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            ]
        }));
        write_table(
            w,
            &["Field", "Type", "Unique", "Optional", "Nullable", "Default"],
            &fields,
        )?;

        if !self.edges.is_empty() {
            let edges: Vec<Vec<String>> = self
                .edges
                .iter()
                .map(|e| {
                    vec![
                        e.name.clone(),
                        e.target.clone(),
                        e.is_inverse().to_string(),
                        e.inverse.clone().unwrap_or_default(),
                        e.rel.kind.to_string(),
                        e.unique.to_string(),
                        e.optional.to_string(),
                    ]
                })
                .collect();
            write_table(
                w,
                &["Edge", "Type", "Inverse", "BackRef", "Relation", "Unique", "Optional"],
                &edges,
            )?;
        }
        writeln!(w)
    }
}

/// Write a bordered table, each line indented with a tab.
pub fn write_table<W: Write>(w: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    w.write_all(render_table(headers, rows).as_bytes())
}

/// The bordered table [`write_table`] writes.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let border: String = widths
        .iter()
        .map(|width| format!("+{}", "-".repeat(width + 2)))
        .collect::<String>()
        + "+";
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("| {:<width$} ", cell, width = width))
            .collect::<String>()
            + "|"
    };

    let mut out = format!("\t{}\n\t{}\n\t{}\n", border, line(headers.to_vec()), border);
    for row in rows {
        out.push_str(&format!("\t{}\n", line(row.iter().map(String::as_str).collect())));
    }
    out.push_str(&format!("\t{}\n", border));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::field::FieldType;
    use crate::load::{EdgeDescriptor, FieldDescriptor, Schema};
    use pretty_assertions::assert_eq;

    const EXPECTED: &str = "\
User:
\t+-------+--------+--------+----------+----------+---------+
\t| Field | Type   | Unique | Optional | Nullable | Default |
\t+-------+--------+--------+----------+----------+---------+
\t| id    | int    | false  | false    | false    |         |
\t| name  | string | true   | false    | false    |         |
\t+-------+--------+--------+----------+----------+---------+
\t+------+------+---------+---------+----------+--------+----------+
\t| Edge | Type | Inverse | BackRef | Relation | Unique | Optional |
\t+------+------+---------+---------+----------+--------+----------+
\t| pets | Pet  | false   |         | O2M      | false  | true     |
\t+------+------+---------+---------+----------+--------+----------+

Pet:
\t+-------+------+--------+----------+----------+---------+
\t| Field | Type | Unique | Optional | Nullable | Default |
\t+-------+------+--------+----------+----------+---------+
\t| id    | int  | false  | false    | false    |         |
\t| age   | int  | false  | false    | false    | 1       |
\t+-------+------+--------+----------+----------+---------+
\t+-------+------+---------+---------+----------+--------+----------+
\t| Edge  | Type | Inverse | BackRef | Relation | Unique | Optional |
\t+-------+------+---------+---------+----------+--------+----------+
\t| owner | User | true    | pets    | M2O      | true   | true     |
\t+-------+------+---------+---------+----------+--------+----------+

";

    #[test]
    fn test_describe_graph() {
        let g = Graph::new(
            Config::default(),
            vec![
                Schema::new("User")
                    .field(FieldDescriptor::new("name", FieldType::String).unique())
                    .edge(EdgeDescriptor::to("pets", "Pet")),
                Schema::new("Pet")
                    .field(FieldDescriptor::new("age", FieldType::Int).default_value(serde_json::json!(1)))
                    .edge(EdgeDescriptor::from("owner", "User", "pets").unique()),
            ],
        )
        .unwrap();

        let mut out = Vec::new();
        g.describe(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), EXPECTED);
    }

    #[test]
    fn test_write_table_widens_to_content() {
        let mut out = Vec::new();
        write_table(&mut out, &["A"], &[vec!["wide".to_string()]]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\t+------+\n\t| A    |\n\t+------+\n\t| wide |\n\t+------+\n"
        );
    }
}
