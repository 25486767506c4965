//! Table-name derivation from entity type names

use regex::Regex;
use std::sync::OnceLock;

/// Ordered pluralization rules; the first matching pattern wins.
const PLURAL_RULES: &[(&str, &str)] = &[
    (r"(?i)(s)tatus$", "${1}tatuses"),
    (r"(?i)(quiz)$", "${1}zes"),
    (r"(?i)^(ox)$", "${1}en"),
    (r"(?i)([m|l])ouse$", "${1}ice"),
    (r"(?i)(matr|vert|ind)(ix|ex)$", "${1}ices"),
    (r"(?i)(x|ch|ss|sh)$", "${1}es"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(hive)$", "${1}s"),
    (r"(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"(?i)(shea|lea|loa|thie)f$", "${1}ves"),
    (r"(?i)sis$", "ses"),
    (r"(?i)([ti])um$", "${1}a"),
    (r"(?i)(tomato)$", "${1}es"),
    (r"(?i)(bu)s$", "${1}ses"),
    (r"(?i)(alias|status)$", "${1}es"),
    (r"(?i)(octop|vir)us$", "${1}i"),
    (r"(?i)(ax|test)is$", "${1}es"),
    (r"(?i)s$", "s"),
    (r"(?i)$", "s"),
];

fn rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        PLURAL_RULES
            .iter()
            .map(|(pattern, replacement)| {
                let regex = Regex::new(pattern).expect("invalid built-in pluralization rule");
                (regex, *replacement)
            })
            .collect()
    })
}

/// Derives plural, lower-cased table names from entity type names
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingResolver;

impl NamingResolver {
    pub fn new() -> Self {
        Self
    }

    /// Pluralize a word and lower-case the result
    ///
    /// # Examples
    /// ```
    /// use quarry_core::NamingResolver;
    ///
    /// let naming = NamingResolver::new();
    /// assert_eq!(naming.pluralize("Category"), "categories");
    /// assert_eq!(naming.pluralize("Bus"), "buses");
    /// ```
    pub fn pluralize(&self, word: &str) -> String {
        for (regex, replacement) in rules() {
            if regex.is_match(word) {
                return regex.replace(word, *replacement).to_lowercase();
            }
        }

        format!("{}s", word.to_lowercase())
    }

    /// Default table name for a Rust type path such as `app::models::User`
    pub fn table_name(&self, type_path: &str) -> String {
        let path = type_path.split('<').next().unwrap_or(type_path);
        let name = path.rsplit("::").next().unwrap_or(path);
        self.pluralize(name)
    }
}
