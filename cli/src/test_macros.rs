//! Test generators shared by the command modules.
//!
//! Parsing macros expect `Args`, `Parser` and `rstest` in scope; output
//! macros expect an rstest fixture producing the command result.

/// `graphgen <command> <args..>` parses into `Command::<variant>` whose fields
/// hold the listed values.
#[macro_export]
macro_rules! cli_defaults_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($arg:literal),*],
        defaults: { $($field:ident : $value:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn test_defaults() {
            let parsed = Args::try_parse_from(["graphgen", $cmd, $($arg),*]).unwrap();
            let crate::commands::Command::$variant(cmd) = parsed.command else {
                panic!("{} did not parse as {}", $cmd, stringify!($variant));
            };
            $(assert_eq!(cmd.$field, $value, "default of {}", stringify!($field));)*
        }
    };
}

/// One option on top of the positional arguments sets one field.
#[macro_export]
macro_rules! cli_option_test_with_required {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req:literal),+],
        test_name: $test_name:ident,
        args: [$($opt:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let parsed = Args::try_parse_from(["graphgen", $cmd, $($req,)+ $($opt),+]).unwrap();
            let crate::commands::Command::$variant(cmd) = parsed.command else {
                panic!("{} did not parse as {}", $cmd, stringify!($variant));
            };
            assert_eq!(cmd.$field, $expected, "value of {}", stringify!($field));
        }
    };
}

/// The bare command is rejected and the usage error names `$arg`.
#[macro_export]
macro_rules! cli_required_arg_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        required_arg: $arg:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let message = match Args::try_parse_from(["graphgen", $cmd]) {
                Ok(_) => panic!("{} parsed without {}", $cmd, $arg),
                Err(err) => err.to_string(),
            };
            assert!(message.contains($arg), "{}", message);
        }
    };
}

/// The table rendering of the fixture equals `expected`.
#[macro_export]
macro_rules! output_table_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            assert_eq!($fixture.to_table(), $expected);
        }
    };
}

/// Selected top-level keys of the JSON rendering hold the given values.
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($key:literal : $value:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{OutputFormat, Outputable};
            let json: serde_json::Value = serde_json::from_str(&$fixture.format(OutputFormat::Json)).unwrap();
            $(assert_eq!(json[$key], $value, "key {}", $key);)*
        }
    };
}
