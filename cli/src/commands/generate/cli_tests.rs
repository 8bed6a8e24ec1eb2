//! CLI parsing tests for generate command.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;
    use std::path::PathBuf;

    crate::cli_required_arg_test! {
        command: "generate",
        test_name: test_requires_schema,
        required_arg: "<SCHEMA>",
    }

    crate::cli_defaults_test! {
        command: "generate",
        variant: Generate,
        required_args: ["."],
        defaults: {
            schema: PathBuf::from("."),
            target: None,
        },
    }

    crate::cli_option_test_with_required! {
        command: "generate",
        variant: Generate,
        required_args: ["."],
        test_name: test_target_flag,
        args: ["--target", "out"],
        field: target,
        expected: Some(PathBuf::from("out")),
    }

    #[rstest]
    fn test_schema_must_exist() {
        let result = Args::try_parse_from(["graphgen", "generate", "missing.json"]);
        assert!(result.unwrap_err().to_string().contains("Schema not found"));
    }
}
