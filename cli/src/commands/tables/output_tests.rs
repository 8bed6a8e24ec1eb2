//! Output formatting tests for tables command.

#[cfg(test)]
mod tests {
    use super::super::execute::TablesResult;
    use graph::{Column, FieldType, ForeignKey, Index, ReferenceOption, Table};
    use rstest::{fixture, rstest};

    const EMPTY_TABLE_OUTPUT: &str = "No tables derived.\n";

    const PETS_TABLE_OUTPUT: &str = "\
pets:
\t+----------+--------+----------+--------+---------+
\t| Column   | Type   | Nullable | Unique | Default |
\t+----------+--------+----------+--------+---------+
\t| id       | int    | false    | false  |         |
\t| name     | string | false    | false  |         |
\t| owner_id | int    | true     | false  |         |
\t+----------+--------+----------+--------+---------+
\tprimary key: (id)
\tforeign key pets_users_pets: (owner_id) -> users (id) ON DELETE SET NULL
\tunique index pet_name_owner: (name, owner_id)
";

    fn column(name: &str, kind: FieldType, nullable: bool) -> Column {
        Column {
            name: name.to_string(),
            kind,
            nullable,
            unique: false,
            increment: name == "id",
            default: None,
            size: None,
            enums: vec![],
        }
    }

    #[fixture]
    fn empty_result() -> TablesResult {
        TablesResult { tables: vec![] }
    }

    #[fixture]
    fn pets_result() -> TablesResult {
        TablesResult {
            tables: vec![Table {
                name: "pets".to_string(),
                columns: vec![
                    column("id", FieldType::Int, false),
                    column("name", FieldType::String, false),
                    column("owner_id", FieldType::Int, true),
                ],
                primary_key: vec!["id".to_string()],
                foreign_keys: vec![ForeignKey {
                    symbol: "pets_users_pets".to_string(),
                    columns: vec!["owner_id".to_string()],
                    ref_table: "users".to_string(),
                    ref_columns: vec!["id".to_string()],
                    on_delete: ReferenceOption::SetNull,
                }],
                indexes: vec![Index {
                    name: "pet_name_owner".to_string(),
                    unique: true,
                    columns: vec!["name".to_string(), "owner_id".to_string()],
                }],
            }],
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: TablesResult,
        expected: EMPTY_TABLE_OUTPUT,
    }

    #[rstest]
    fn test_to_table_pets(pets_result: TablesResult) {
        use crate::output::Outputable;
        pretty_assertions::assert_eq!(pets_result.to_table(), PETS_TABLE_OUTPUT);
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: pets_result,
        fixture_type: TablesResult,
        assertions: {
            "tables": serde_json::json!([{
                "name": "pets",
                "columns": [
                    {"name": "id", "type": "int", "nullable": false, "unique": false, "increment": true},
                    {"name": "name", "type": "string", "nullable": false, "unique": false, "increment": false},
                    {"name": "owner_id", "type": "int", "nullable": true, "unique": false, "increment": false}
                ],
                "primary_key": ["id"],
                "foreign_keys": [{
                    "symbol": "pets_users_pets",
                    "columns": ["owner_id"],
                    "ref_table": "users",
                    "ref_columns": ["id"],
                    "on_delete": "SET NULL"
                }],
                "indexes": [{"name": "pet_name_owner", "unique": true, "columns": ["name", "owner_id"]}]
            }]),
        },
    }

    #[rstest]
    fn test_tables_are_separated_by_blank_line(pets_result: TablesResult) {
        use crate::output::Outputable;
        let mut result = pets_result;
        let mut users = result.tables[0].clone();
        users.name = "users".to_string();
        result.tables.push(users);
        let output = result.to_table();
        assert!(output.contains("\n\nusers:\n"), "{}", output);
    }
}
