//! Relational schema derived from the graph.
//!
//! The tables are a portable, DDL-agnostic description consumed by external
//! migration tooling.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::field::FieldType;
use crate::graph::Graph;
use crate::types::{ID_COLUMN, IdType, Index, Rel};

/// Action taken on referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceOption {
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "CASCADE")]
    Cascade,
}

impl fmt::Display for ReferenceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceOption::SetNull => f.write_str("SET NULL"),
            ReferenceOption::Cascade => f.write_str("CASCADE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub nullable: bool,
    pub unique: bool,
    pub increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<String>,
}

impl Column {
    fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            unique: false,
            increment: false,
            default: None,
            size: None,
            enums: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub symbol: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_delete: ReferenceOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl Table {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_key(&self, symbol: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.symbol == symbol)
    }
}

fn id_kind(id_type: IdType) -> FieldType {
    match id_type {
        IdType::Int => FieldType::Int,
        IdType::String => FieldType::String,
    }
}

impl Graph {
    /// Derive the relational tables of the graph.
    ///
    /// One table per node in node order, followed by one join table per M2M
    /// association in the order they are found. Relation columns are added
    /// after every field column, and indexes after every relation column.
    pub fn tables(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = Vec::with_capacity(self.nodes.len());
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for n in &self.nodes {
            let mut table = Table::new(&n.table);
            let mut id = Column::new(ID_COLUMN, id_kind(n.id_type));
            id.increment = n.id_type == IdType::Int;
            table.columns.push(id);
            table.primary_key.push(ID_COLUMN.to_string());
            for f in &n.fields {
                table.columns.push(Column {
                    name: f.column().to_string(),
                    kind: f.kind,
                    nullable: f.optional || f.nullable,
                    unique: f.unique,
                    increment: false,
                    default: f.default.clone(),
                    size: f.size,
                    enums: f.enum_values.clone(),
                });
            }
            by_name.insert(n.table.clone(), tables.len());
            tables.push(table);
        }

        let mut joins = Vec::new();
        for n in &self.nodes {
            let fk_kind = id_kind(n.id_type);
            for e in n.edges.iter().filter(|e| !e.is_inverse()) {
                // (table holding the column, referenced table)
                let (owner, referenced) = match e.rel.kind {
                    Rel::O2O | Rel::O2M => (e.rel.table.as_str(), n.table.as_str()),
                    Rel::M2O => (e.rel.table.as_str(), e.target_table.as_str()),
                    Rel::M2M => {
                        joins.push(join_table(&e.rel.table, &e.rel.columns, &n.table, &e.target_table, fk_kind));
                        continue;
                    }
                    Rel::Unknown => continue,
                };
                let Some(&i) = by_name.get(owner) else {
                    continue;
                };
                let table = &mut tables[i];
                let mut column = Column::new(e.rel.column(), fk_kind);
                column.unique = e.rel.kind == Rel::O2O;
                column.nullable = true;
                table.columns.push(column);
                table.foreign_keys.push(ForeignKey {
                    symbol: format!("{}_{}_{}", owner, referenced, e.name),
                    columns: vec![e.rel.column().to_string()],
                    ref_table: referenced.to_string(),
                    ref_columns: vec![ID_COLUMN.to_string()],
                    on_delete: ReferenceOption::SetNull,
                });
            }
        }
        tables.extend(joins);

        for n in &self.nodes {
            if let Some(&i) = by_name.get(&n.table) {
                tables[i].indexes.extend(n.indexes.iter().cloned());
            }
        }
        tables
    }
}

fn join_table(name: &str, columns: &[String], owner: &str, target: &str, kind: FieldType) -> Table {
    let mut table = Table::new(name);
    for (column, referenced) in columns.iter().zip([owner, target]) {
        table.columns.push(Column::new(column, kind));
        table.primary_key.push(column.clone());
        table.foreign_keys.push(ForeignKey {
            symbol: format!("{}_{}", name, column),
            columns: vec![column.clone()],
            ref_table: referenced.to_string(),
            ref_columns: vec![ID_COLUMN.to_string()],
            on_delete: ReferenceOption::Cascade,
        });
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::load::{EdgeDescriptor, FieldDescriptor, IndexDescriptor, Schema};
    use pretty_assertions::assert_eq;

    fn tables(schemas: Vec<Schema>) -> Vec<Table> {
        Graph::new(Config::default(), schemas).unwrap().tables()
    }

    fn names(table: &Table) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_node_table_columns() {
        let mut name = FieldDescriptor::new("name", FieldType::String).unique();
        name.size = Some(64);
        let tables = tables(vec![Schema::new("User")
            .field(FieldDescriptor::new("age", FieldType::Int))
            .field(name)
            .field(FieldDescriptor::new("nickname", FieldType::String).optional())]);

        assert_eq!(tables.len(), 1);
        let users = &tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(names(users), vec!["id", "age", "name", "nickname"]);
        assert_eq!(users.primary_key, vec!["id"]);
        assert!(users.column("id").unwrap().increment);
        assert!(users.column("name").unwrap().unique);
        assert_eq!(users.column("name").unwrap().size, Some(64));
        assert!(users.column("nickname").unwrap().nullable);
        assert!(!users.column("age").unwrap().nullable);
    }

    #[test]
    fn test_string_ids() {
        let config = Config {
            id_type: IdType::String,
            ..Config::default()
        };
        let g = Graph::new(
            config,
            vec![
                Schema::new("User").edge(EdgeDescriptor::to("pets", "Pet")),
                Schema::new("Pet"),
            ],
        )
        .unwrap();
        let tables = g.tables();
        let id = tables[0].column("id").unwrap();
        assert_eq!(id.kind, FieldType::String);
        assert!(!id.increment);
        assert_eq!(tables[1].column("user_pet_id").unwrap().kind, FieldType::String);
    }

    #[test]
    fn test_o2o_column_and_foreign_key() {
        let tables = tables(vec![
            Schema::new("User").edge(EdgeDescriptor::to("card", "Card").unique()),
            Schema::new("Card").edge(EdgeDescriptor::from("owner", "User", "card").unique()),
        ]);

        let cards = &tables[1];
        assert_eq!(names(cards), vec!["id", "owner_id"]);
        let owner_id = cards.column("owner_id").unwrap();
        assert!(owner_id.unique);
        assert!(owner_id.nullable);
        assert_eq!(
            cards.foreign_keys,
            vec![ForeignKey {
                symbol: "cards_users_card".into(),
                columns: vec!["owner_id".into()],
                ref_table: "users".into(),
                ref_columns: vec!["id".into()],
                on_delete: ReferenceOption::SetNull,
            }]
        );
        assert!(tables[0].foreign_keys.is_empty());
    }

    #[test]
    fn test_m2o_column_on_owner_table() {
        let tables = tables(vec![
            Schema::new("User"),
            Schema::new("Pet").edge(EdgeDescriptor::to("owner", "User").unique()),
        ]);

        let pets = &tables[1];
        assert_eq!(names(pets), vec!["id", "pet_owner_id"]);
        assert!(!pets.column("pet_owner_id").unwrap().unique);
        let fk = pets.foreign_key("pets_users_owner").unwrap();
        assert_eq!(fk.ref_table, "users");
        assert_eq!(fk.on_delete, ReferenceOption::SetNull);
    }

    #[test]
    fn test_m2m_join_table() {
        let tables = tables(vec![
            Schema::new("User").edge(EdgeDescriptor::from("groups", "Group", "users")),
            Schema::new("Group").edge(EdgeDescriptor::to("users", "User")),
        ]);

        assert_eq!(tables.len(), 3);
        let join = &tables[2];
        assert_eq!(join.name, "group_users");
        assert_eq!(names(join), vec!["group_id", "user_id"]);
        assert_eq!(join.primary_key, vec!["group_id", "user_id"]);
        assert_eq!(
            join.foreign_keys,
            vec![
                ForeignKey {
                    symbol: "group_users_group_id".into(),
                    columns: vec!["group_id".into()],
                    ref_table: "groups".into(),
                    ref_columns: vec!["id".into()],
                    on_delete: ReferenceOption::Cascade,
                },
                ForeignKey {
                    symbol: "group_users_user_id".into(),
                    columns: vec!["user_id".into()],
                    ref_table: "users".into(),
                    ref_columns: vec!["id".into()],
                    on_delete: ReferenceOption::Cascade,
                },
            ]
        );
    }

    #[test]
    fn test_indexes_follow_relation_columns() {
        let tables = tables(vec![
            Schema::new("User").edge(EdgeDescriptor::to("files", "File")),
            Schema::new("File")
                .field(FieldDescriptor::new("name", FieldType::String))
                .edge(EdgeDescriptor::from("owner", "User", "files").unique())
                .index(IndexDescriptor::fields(["name"]).edges(["owner"]).unique()),
        ]);

        let files = &tables[1];
        assert_eq!(names(files), vec!["id", "name", "owner_id"]);
        assert_eq!(files.indexes.len(), 1);
        assert_eq!(files.indexes[0].name, "name_owner_id");
        assert_eq!(files.indexes[0].columns, vec!["name", "owner_id"]);
        assert!(files.indexes[0].unique);
    }

    #[test]
    fn test_reference_option_serialization() {
        assert_eq!(serde_json::to_string(&ReferenceOption::SetNull).unwrap(), "\"SET NULL\"");
        assert_eq!(ReferenceOption::Cascade.to_string(), "CASCADE");
    }
}
