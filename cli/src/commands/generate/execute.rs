use std::error::Error;
use std::path::PathBuf;

use graph::{Config, Generator};
use serde::Serialize;

use super::GenerateCmd;
use crate::commands::{load_graph, Execute};

/// Result of the generate command
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub target: PathBuf,
    pub files: Vec<PathBuf>,
}

impl Execute for GenerateCmd {
    type Output = GenerateResult;

    fn execute(self, config: &Config) -> Result<Self::Output, Box<dyn Error>> {
        let config = match self.target {
            Some(target) => config.clone().with_target(target),
            None => config.clone(),
        };
        let graph = load_graph(&self.schema, &config)?;
        let files = Generator::default().generate(&graph)?;
        Ok(GenerateResult {
            target: graph.config.target.clone(),
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::fixtures::PETS;
    use graph::test_utils::create_temp_schema_file;
    use graph::Storage;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_generate_into_target() {
        let file = create_temp_schema_file(PETS);
        let out = tempdir().unwrap();
        let cmd = GenerateCmd {
            schema: file.path().to_path_buf(),
            target: Some(out.path().to_path_buf()),
        };
        let result = cmd.execute(&Config::default()).expect("generate should succeed");

        assert_eq!(result.target, out.path());
        assert_eq!(
            result.files,
            vec![
                out.path().join("gen/user/meta.json"),
                out.path().join("gen/pet/meta.json"),
                out.path().join("describe.txt"),
                out.path().join("migrate/schema.json"),
            ]
        );
        for path in &result.files {
            assert!(path.is_file(), "{} was not written", path.display());
        }
    }

    #[rstest]
    fn test_generate_without_sql_storage_skips_migration() {
        let file = create_temp_schema_file(PETS);
        let out = tempdir().unwrap();
        let config = Config {
            storage: vec![Storage::Gremlin],
            ..Config::default()
        };
        let cmd = GenerateCmd {
            schema: file.path().to_path_buf(),
            target: Some(out.path().to_path_buf()),
        };
        let result = cmd.execute(&config).unwrap();
        assert!(!result.files.iter().any(|p| p.ends_with("migrate/schema.json")));
        assert!(!out.path().join("migrate").exists());
    }

    #[rstest]
    fn test_generate_invalid_graph_writes_nothing() {
        let file = create_temp_schema_file(r#"{"name": "User", "edges": [{"name": "pets", "type": "Pet"}]}"#);
        let out = tempdir().unwrap();
        let cmd = GenerateCmd {
            schema: file.path().to_path_buf(),
            target: Some(out.path().join("gen")),
        };
        assert!(cmd.execute(&Config::default()).is_err());
        assert!(!out.path().join("gen").exists());
    }
}
