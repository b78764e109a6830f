/// Identifiers: the (name, kind) pairs every lookup is keyed on.
///
/// PHP resolves names with different case rules per kind. Classes and
/// functions are case-insensitive; constants are case-sensitive in their
/// short name but their namespace part is not; a configurable list of
/// constants (`true`, `false`, `null`, the magic constants) is matched
/// case-insensitively as a whole.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::util::split_namespace;

/// The kind of symbol an [`Identifier`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    Class,
    Function,
    Constant,
}

impl IdentifierType {
    pub fn is_class(self) -> bool {
        self == IdentifierType::Class
    }

    pub fn is_function(self) -> bool {
        self == IdentifierType::Function
    }

    pub fn is_constant(self) -> bool {
        self == IdentifierType::Constant
    }

    /// Stable key used when indexing caches by kind.
    pub fn cache_key(self) -> &'static str {
        match self {
            IdentifierType::Class => "class",
            IdentifierType::Function => "function",
            IdentifierType::Constant => "constant",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_key())
    }
}

/// Constants that default to case-insensitive matching.
pub const DEFAULT_CASE_INSENSITIVE_CONSTANTS: &[&str] = &[
    "true",
    "false",
    "null",
    "__LINE__",
    "__FILE__",
    "__DIR__",
    "__FUNCTION__",
    "__CLASS__",
    "__TRAIT__",
    "__METHOD__",
    "__NAMESPACE__",
];

/// Name-comparison rules applied when building identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRules {
    /// Lowercased short names of constants matched case-insensitively.
    case_insensitive_constants: Vec<String>,
}

impl Default for NameRules {
    fn default() -> Self {
        Self::new(DEFAULT_CASE_INSENSITIVE_CONSTANTS.iter().copied())
    }
}

static DEFAULT_RULES: LazyLock<Arc<NameRules>> = LazyLock::new(|| Arc::new(NameRules::default()));

impl NameRules {
    pub fn new<I, S>(case_insensitive_constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = case_insensitive_constants
            .into_iter()
            .map(|name| name.as_ref().trim_start_matches('\\').to_ascii_lowercase())
            .collect();
        list.sort();
        list.dedup();
        NameRules {
            case_insensitive_constants: list,
        }
    }

    /// Shared instance holding the default exception list.
    pub fn shared_default() -> Arc<NameRules> {
        Arc::clone(&DEFAULT_RULES)
    }

    pub fn case_insensitive_constants(&self) -> &[String] {
        &self.case_insensitive_constants
    }

    fn fold_for(&self, name: &str, kind: IdentifierType) -> NameFold {
        match kind {
            IdentifierType::Class | IdentifierType::Function => NameFold::Insensitive,
            IdentifierType::Constant => {
                let lower = name.to_ascii_lowercase();
                if self
                    .case_insensitive_constants
                    .binary_search(&lower)
                    .is_ok()
                {
                    NameFold::Insensitive
                } else {
                    NameFold::NamespaceOnly
                }
            }
        }
    }
}

/// How a name is folded into its comparison key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameFold {
    Insensitive,
    NamespaceOnly,
}

impl NameFold {
    fn apply(self, name: &str) -> String {
        let name = name.trim_start_matches('\\');
        match self {
            NameFold::Insensitive => name.to_ascii_lowercase(),
            NameFold::NamespaceOnly => match split_namespace(name) {
                (Some(namespace), short) => {
                    format!("{}\\{}", namespace.to_ascii_lowercase(), short)
                }
                (None, short) => short.to_string(),
            },
        }
    }
}

/// An immutable (name, kind) pair.
///
/// Equality and hashing use the kind and the folded name, so
/// `Identifier::new("Foo", Class) == Identifier::new("\\FOO", Class)`.
#[derive(Debug, Clone)]
pub struct Identifier {
    name: String,
    kind: IdentifierType,
    key: String,
    fold: NameFold,
}

impl Identifier {
    /// Build an identifier using the default name rules.
    pub fn new(name: &str, kind: IdentifierType) -> Self {
        Self::with_rules(name, kind, &DEFAULT_RULES)
    }

    pub fn with_rules(name: &str, kind: IdentifierType, rules: &NameRules) -> Self {
        let name = name.strip_prefix('\\').unwrap_or(name).to_string();
        let fold = rules.fold_for(&name, kind);
        let key = fold.apply(&name);
        Identifier {
            name,
            kind,
            key,
            fold,
        }
    }

    /// The name as given, without a leading `\`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> IdentifierType {
        self.kind
    }

    /// The folded name used for equality and cache keys.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_class(&self) -> bool {
        self.kind.is_class()
    }

    pub fn is_function(&self) -> bool {
        self.kind.is_function()
    }

    pub fn is_constant(&self) -> bool {
        self.kind.is_constant()
    }

    /// Whether a declared, namespace-qualified name refers to this
    /// identifier under its kind's case rules.
    pub fn matches(&self, declared_name: &str) -> bool {
        self.fold.apply(declared_name) == self.key
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key == other.key
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.key.hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_backslash_is_stripped() {
        let id = Identifier::new("\\Foo\\Bar", IdentifierType::Class);
        assert_eq!(id.name(), "Foo\\Bar");
    }

    #[test]
    fn test_class_names_compare_case_insensitively() {
        let a = Identifier::new("Foo\\Bar", IdentifierType::Class);
        let b = Identifier::new("\\foo\\BAR", IdentifierType::Class);
        assert_eq!(a, b);
        assert!(a.matches("FOO\\bar"));
    }

    #[test]
    fn test_kind_participates_in_equality() {
        let class = Identifier::new("foo", IdentifierType::Class);
        let function = Identifier::new("foo", IdentifierType::Function);
        assert_ne!(class, function);
    }

    #[test]
    fn test_constant_short_name_is_case_sensitive() {
        let id = Identifier::new("Foo\\BAR", IdentifierType::Constant);
        assert!(id.matches("foo\\BAR"));
        assert!(!id.matches("Foo\\bar"));
        assert_ne!(id, Identifier::new("Foo\\bar", IdentifierType::Constant));
    }

    #[test]
    fn test_exception_constants_are_case_insensitive() {
        let id = Identifier::new("TRUE", IdentifierType::Constant);
        assert!(id.matches("true"));
        assert_eq!(id, Identifier::new("True", IdentifierType::Constant));
    }

    #[test]
    fn test_custom_exception_list() {
        let rules = NameRules::new(["MY_FLAG"]);
        let id = Identifier::with_rules("my_flag", IdentifierType::Constant, &rules);
        assert!(id.matches("MY_FLAG"));

        let strict = Identifier::with_rules("true", IdentifierType::Constant, &rules);
        assert!(!strict.matches("TRUE"));
    }

    #[test]
    fn test_identifier_type_predicates() {
        assert!(IdentifierType::Class.is_class());
        assert!(IdentifierType::Function.is_function());
        assert!(IdentifierType::Constant.is_constant());
        assert!(!IdentifierType::Constant.is_class());
        assert_eq!(IdentifierType::Function.cache_key(), "function");
    }
}
