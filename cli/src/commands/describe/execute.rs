use std::error::Error;

use graph::{Config, Type, ID_COLUMN};
use serde::Serialize;

use super::DescribeCmd;
use crate::commands::{load_graph, Execute};

#[derive(Debug, Clone, Serialize)]
pub struct FieldDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub unique: bool,
    pub optional: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub target: String,
    pub inverse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_ref: Option<String>,
    pub relation: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDescription {
    pub name: String,
    pub label: String,
    pub table: String,
    pub fields: Vec<FieldDescription>,
    pub edges: Vec<EdgeDescription>,
}

/// Result of the describe command
#[derive(Debug, Serialize)]
pub struct DescribeResult {
    pub nodes: Vec<NodeDescription>,
    /// Rendered description, shared with the `describe.txt` artifact.
    #[serde(skip)]
    pub text: String,
}

impl From<&Type> for NodeDescription {
    fn from(node: &Type) -> Self {
        let id = FieldDescription {
            name: ID_COLUMN.to_string(),
            kind: node.id_type.as_str().to_string(),
            unique: false,
            optional: false,
            nullable: false,
            default: None,
        };
        let fields = std::iter::once(id)
            .chain(node.fields.iter().map(|f| FieldDescription {
                name: f.name.clone(),
                kind: f.kind.to_string(),
                unique: f.unique,
                optional: f.optional,
                nullable: f.nullable,
                default: f.default.clone(),
            }))
            .collect();
        let edges = node
            .edges
            .iter()
            .map(|e| EdgeDescription {
                name: e.name.clone(),
                target: e.target.clone(),
                inverse: e.is_inverse(),
                back_ref: e.inverse.clone(),
                relation: e.rel.kind.to_string(),
                table: e.rel.table.clone(),
                columns: e.rel.columns.clone(),
                unique: e.unique,
                optional: e.optional,
            })
            .collect();
        NodeDescription {
            name: node.name.clone(),
            label: node.label.clone(),
            table: node.table.clone(),
            fields,
            edges,
        }
    }
}

impl Execute for DescribeCmd {
    type Output = DescribeResult;

    fn execute(self, config: &Config) -> Result<Self::Output, Box<dyn Error>> {
        let graph = load_graph(&self.schema, config)?;
        let mut buf = Vec::new();
        graph.describe(&mut buf)?;
        Ok(DescribeResult {
            nodes: graph.nodes.iter().map(NodeDescription::from).collect(),
            text: String::from_utf8(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::fixtures::{GROUPS, PETS};
    use graph::test_utils::create_temp_schema_file;
    use rstest::rstest;

    #[rstest]
    fn test_describe_pets() {
        let file = create_temp_schema_file(PETS);
        let cmd = DescribeCmd {
            schema: file.path().to_path_buf(),
        };
        let result = cmd.execute(&Config::default()).expect("describe should succeed");

        let names: Vec<&str> = result.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Pet"]);

        let user = &result.nodes[0];
        assert_eq!(user.fields[0].name, "id");
        let spouse = user.edges.iter().find(|e| e.name == "spouse").unwrap();
        assert_eq!(spouse.relation, "O2O");
        assert_eq!(spouse.columns, vec!["user_spouse_id"]);

        assert!(result.text.starts_with("User:\n"));
        assert!(result.text.contains("Pet:\n"));
    }

    #[rstest]
    fn test_describe_inverse_edges_name_back_ref() {
        let file = create_temp_schema_file(GROUPS);
        let cmd = DescribeCmd {
            schema: file.path().to_path_buf(),
        };
        let result = cmd.execute(&Config::default()).unwrap();
        let groups = result.nodes[0].edges.iter().find(|e| e.name == "groups").unwrap();
        assert!(groups.inverse);
        assert_eq!(groups.back_ref.as_deref(), Some("users"));
        assert_eq!(groups.table, "group_users");
    }

    #[rstest]
    fn test_describe_fails_on_invalid_graph() {
        let file = create_temp_schema_file(r#"{"name": "User", "edges": [{"name": "pets", "type": "Pet"}]}"#);
        let cmd = DescribeCmd {
            schema: file.path().to_path_buf(),
        };
        let err = cmd.execute(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("Pet"), "{}", err);
    }
}
