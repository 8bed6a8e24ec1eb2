//! Naming strategy for derived table, column and label names.
//!
//! Snake casing is fixed. Pluralization is pluggable through [`Naming`] so that
//! projects with non-English entity names can supply their own rules; the
//! resolver only relies on it to produce readable names, never for uniqueness.

use std::fmt::Debug;
use std::sync::LazyLock;

use heck::ToSnakeCase;
use regex::Regex;

/// Word inflection used when deriving names from the schema.
pub trait Naming: Debug + Send + Sync {
    /// Plural form of a word, e.g. `user` -> `users`.
    fn pluralize(&self, word: &str) -> String;

    /// Singular form of a word, e.g. `friends` -> `friend`.
    fn singularize(&self, word: &str) -> String;
}

/// Snake case form of a schema name (`FileType` -> `file_type`).
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Default English inflector.
///
/// Rules are checked in order and the first match wins. Only the last
/// `_`-separated segment of a word is inflected, so `file_type` becomes
/// `file_types` and `group_person` becomes `group_people`.
#[derive(Debug, Default, Clone, Copy)]
pub struct English;

type Rules = Vec<(Regex, &'static str)>;

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
    "metadata",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
];

static PLURAL: LazyLock<Rules> = LazyLock::new(|| {
    compile(&[
        (r"(quiz)$", "${1}zes"),
        (r"^(oxen)$", "${1}"),
        (r"^(ox)$", "${1}en"),
        (r"([ml])ice$", "${1}ice"),
        (r"([ml])ouse$", "${1}ice"),
        (r"(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(x|ch|ss|sh)$", "${1}es"),
        (r"([^aeiouy]|qu)y$", "${1}ies"),
        (r"(hive)$", "${1}s"),
        (r"([^f])fe$", "${1}ves"),
        (r"([lr])f$", "${1}ves"),
        (r"sis$", "ses"),
        (r"([ti])um$", "${1}a"),
        (r"(buffal|tomat)o$", "${1}oes"),
        (r"(bu)s$", "${1}ses"),
        (r"(alias|status)$", "${1}es"),
        (r"(octop|vir)(?:us|i)$", "${1}i"),
        (r"^(ax|test)is$", "${1}es"),
        (r"s$", "s"),
        (r"$", "s"),
    ])
});

static SINGULAR: LazyLock<Rules> = LazyLock::new(|| {
    compile(&[
        (r"(database)s$", "${1}"),
        (r"(quiz)zes$", "${1}"),
        (r"(matr)ices$", "${1}ix"),
        (r"(vert|ind)ices$", "${1}ex"),
        (r"^(ox)en$", "${1}"),
        (r"(alias|status)(?:es)?$", "${1}"),
        (r"(octop|vir)(?:us|i)$", "${1}us"),
        (r"^(a)x[ie]s$", "${1}xis"),
        (r"(cris|test)(?:is|es)$", "${1}is"),
        (r"(shoe)s$", "${1}"),
        (r"(o)es$", "${1}"),
        (r"(bus)(?:es)?$", "${1}"),
        (r"([ml])ice$", "${1}ouse"),
        (r"(x|ch|ss|sh)es$", "${1}"),
        (r"(m)ovies$", "${1}ovie"),
        (r"([^aeiouy]|qu)ies$", "${1}y"),
        (r"([lr])ves$", "${1}f"),
        (r"(tive|hive)s$", "${1}"),
        (r"([^f])ves$", "${1}fe"),
        (r"(analy|ba|diagno|parenthe|progno|synop|the)(?:sis|ses)$", "${1}sis"),
        (r"([ti])a$", "${1}um"),
        (r"(ss)$", "${1}"),
        (r"s$", ""),
    ])
});

fn compile(rules: &[(&str, &'static str)]) -> Rules {
    rules
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(&format!("(?i){}", pattern)).expect("inflection rules are valid patterns");
            (re, *replacement)
        })
        .collect()
}

impl English {
    fn inflect(word: &str, rules: &Rules, irregular: impl Fn(&str) -> Option<&'static str>) -> String {
        let (prefix, last) = match word.rfind('_') {
            Some(i) => word.split_at(i + 1),
            None => ("", word),
        };
        if last.is_empty() || UNCOUNTABLE.iter().any(|w| w.eq_ignore_ascii_case(last)) {
            return word.to_string();
        }
        if let Some(replacement) = irregular(&last.to_ascii_lowercase()) {
            return format!("{}{}", prefix, keep_case(last, replacement));
        }
        for (re, replacement) in rules.iter() {
            if re.is_match(last) {
                return format!("{}{}", prefix, re.replace(last, *replacement));
            }
        }
        word.to_string()
    }
}

/// Carries the capitalization of the first letter over to the replacement.
fn keep_case(original: &str, replacement: &str) -> String {
    match original.chars().next() {
        Some(c) if c.is_uppercase() => {
            let mut chars = replacement.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => replacement.to_string(),
    }
}

impl Naming for English {
    fn pluralize(&self, word: &str) -> String {
        Self::inflect(word, &PLURAL, |w| {
            IRREGULAR.iter().find(|(s, p)| *s == w || *p == w).map(|(_, p)| *p)
        })
    }

    fn singularize(&self, word: &str) -> String {
        Self::inflect(word, &SINGULAR, |w| {
            IRREGULAR.iter().find(|(s, p)| *p == w || *s == w).map(|(s, _)| *s)
        })
    }
}
