use std::error::Error;

use graph::{Config, Table};
use serde::Serialize;

use super::TablesCmd;
use crate::commands::{load_graph, Execute};

/// Result of the tables command
#[derive(Debug, Serialize)]
pub struct TablesResult {
    pub tables: Vec<Table>,
}

impl Execute for TablesCmd {
    type Output = TablesResult;

    fn execute(self, config: &Config) -> Result<Self::Output, Box<dyn Error>> {
        let graph = load_graph(&self.schema, config)?;
        Ok(TablesResult {
            tables: graph.tables(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::fixtures::{GROUPS, PETS};
    use graph::test_utils::create_temp_schema_file;
    use rstest::rstest;

    fn run(schema: &str) -> TablesResult {
        let file = create_temp_schema_file(schema);
        let cmd = TablesCmd {
            schema: file.path().to_path_buf(),
        };
        cmd.execute(&Config::default()).expect("tables should succeed")
    }

    #[rstest]
    fn test_pets_tables() {
        let result = run(PETS);
        let names: Vec<&str> = result.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "pets"]);

        let pets = &result.tables[1];
        let owner = pets.columns.iter().find(|c| c.name == "owner_id").unwrap();
        assert!(owner.nullable);
        assert_eq!(pets.foreign_keys.len(), 1);
        assert_eq!(pets.foreign_keys[0].ref_table, "users");
    }

    #[rstest]
    fn test_m2m_join_table() {
        let result = run(GROUPS);
        let join = result.tables.iter().find(|t| t.name == "group_users").unwrap();
        assert_eq!(join.primary_key, vec!["group_id", "user_id"]);
        assert_eq!(join.foreign_keys.len(), 2);
    }
}
