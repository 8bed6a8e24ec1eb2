//! Output formatting for tables command results.

use std::fmt::Write;

use graph::Table;

use super::execute::TablesResult;
use crate::output::{render_table, Outputable};

const HEADERS: [&str; 5] = ["Column", "Type", "Nullable", "Unique", "Default"];

impl Outputable for TablesResult {
    fn to_table(&self) -> String {
        if self.tables.is_empty() {
            return "No tables derived.\n".to_string();
        }
        self.tables.iter().map(format_table).collect::<Vec<_>>().join("\n")
    }
}

fn format_table(table: &Table) -> String {
    let rows: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.kind.to_string(),
                c.nullable.to_string(),
                c.unique.to_string(),
                c.default.as_ref().map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();

    let mut out = format!("{}:\n", table.name);
    out.push_str(&render_table(&HEADERS, &rows));
    let _ = writeln!(out, "\tprimary key: ({})", table.primary_key.join(", "));
    for fk in &table.foreign_keys {
        let _ = writeln!(
            out,
            "\tforeign key {}: ({}) -> {} ({}) ON DELETE {}",
            fk.symbol,
            fk.columns.join(", "),
            fk.ref_table,
            fk.ref_columns.join(", "),
            fk.on_delete
        );
    }
    for idx in &table.indexes {
        let kind = if idx.unique { "unique index" } else { "index" };
        let _ = writeln!(out, "\t{} {}: ({})", kind, idx.name, idx.columns.join(", "));
    }
    out
}
