use std::path::PathBuf;
use std::sync::Arc;

use super::{DirectoriesSourceLocator, SourceLocator};
use crate::ast::AstLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;
use crate::util::read_source;

/// PSR-4 namespace prefixes and the directories they map to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Psr4Mapping {
    /// Prefix without surrounding `\` → directories without a trailing `/`.
    mappings: Vec<(String, Vec<String>)>,
}

impl Psr4Mapping {
    /// Build from `prefix => [dir, ...]` pairs as found in `composer.json`.
    ///
    /// Prefixes lose their leading and trailing `\`, directories their
    /// trailing `/`, and duplicate directories under one prefix collapse.
    pub fn from_array_mappings<I, D>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (String, D)>,
        D: IntoIterator<Item = String>,
    {
        let mut result: Vec<(String, Vec<String>)> = Vec::new();
        for (prefix, directories) in mappings {
            let prefix = prefix.trim_matches('\\').to_string();
            let index = match result.iter().position(|(existing, _)| *existing == prefix) {
                Some(index) => index,
                None => {
                    result.push((prefix, Vec::new()));
                    result.len() - 1
                }
            };
            let dirs = &mut result[index].1;
            for directory in directories {
                let directory = trim_directory(&directory);
                if !dirs.contains(&directory) {
                    dirs.push(directory);
                }
            }
        }
        Psr4Mapping { mappings: result }
    }

    /// Candidate files for a class, in mapping order. Existence is not
    /// checked. Non-class identifiers and names equal to a prefix have no
    /// candidates.
    pub fn resolve_possible_file_paths(&self, identifier: &Identifier) -> Vec<PathBuf> {
        if !identifier.is_class() {
            return Vec::new();
        }
        let class_name = identifier.name();

        let mut paths = Vec::new();
        for (prefix, directories) in &self.mappings {
            let relative = if prefix.is_empty() {
                class_name
            } else {
                match class_name
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('\\'))
                {
                    Some(rest) if !rest.is_empty() => rest,
                    _ => continue,
                }
            };
            let relative = format!("{}.php", relative.replace('\\', "/"));
            for directory in directories {
                paths.push(PathBuf::from(format!("{}/{}", directory, relative)));
            }
        }
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Every mapped directory, de-duplicated, in mapping order.
    pub fn directories(&self) -> Vec<String> {
        let mut directories: Vec<String> = Vec::new();
        for (_, dirs) in &self.mappings {
            for directory in dirs {
                if !directories.contains(directory) {
                    directories.push(directory.clone());
                }
            }
        }
        directories
    }
}

fn trim_directory(directory: &str) -> String {
    let trimmed = directory.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !directory.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Finds classes by probing PSR-4 candidate paths in order.
pub struct Psr4SourceLocator {
    mapping: Psr4Mapping,
    ast_locator: AstLocator,
}

impl Psr4SourceLocator {
    pub fn new(mapping: Psr4Mapping, ast_locator: AstLocator) -> Self {
        Psr4SourceLocator {
            mapping,
            ast_locator,
        }
    }

    pub fn mapping(&self) -> &Psr4Mapping {
        &self.mapping
    }
}

impl SourceLocator for Psr4SourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        for path in self.mapping.resolve_possible_file_paths(identifier) {
            if !path.is_file() {
                continue;
            }
            tracing::debug!("PSR-4 candidate {} exists", path.display());
            let located_source = Arc::new(LocatedSource::new(read_source(&path)?, Some(&path)));
            if let Some(reflection) =
                self.ast_locator
                    .find_reflection(reflector, located_source, identifier)?
            {
                return Ok(Some(reflection));
            }
        }
        Ok(None)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        let existing: Vec<PathBuf> = self
            .mapping
            .directories()
            .into_iter()
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir())
            .collect();
        DirectoriesSourceLocator::new(&existing, self.ast_locator.clone())?
            .locate_identifiers_by_type(reflector, identifier_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &[&str])]) -> Psr4Mapping {
        Psr4Mapping::from_array_mappings(pairs.iter().map(|(prefix, dirs)| {
            (
                prefix.to_string(),
                dirs.iter().map(|dir| dir.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    fn class(name: &str) -> Identifier {
        Identifier::new(name, IdentifierType::Class)
    }

    #[test]
    fn test_directories_are_deduplicated_and_trimmed() {
        let mapping = mapping(&[("foo", &["/a", "/a/", "/b"]), ("bar", &["/b", "/c"])]);
        assert_eq!(mapping.directories(), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_from_array_mappings_is_idempotent() {
        let pairs: &[(&str, &[&str])] = &[("Foo\\", &["/src"])];
        assert_eq!(mapping(pairs), mapping(pairs));
    }

    #[test]
    fn test_class_lookup_strips_prefix() {
        let mapping = mapping(&[("Foo\\", &["/src"])]);
        assert_eq!(
            mapping.resolve_possible_file_paths(&class("Foo\\Bar")),
            vec![PathBuf::from("/src/Bar.php")]
        );
        assert_eq!(
            mapping.resolve_possible_file_paths(&class("Foo\\Bar\\Baz")),
            vec![PathBuf::from("/src/Bar/Baz.php")]
        );
    }

    #[test]
    fn test_prefix_without_trailing_separator_and_dir_with_slash() {
        let mapping = mapping(&[("Foo", &["/src/"])]);
        assert_eq!(
            mapping.resolve_possible_file_paths(&class("Foo\\Bar")),
            vec![PathBuf::from("/src/Bar.php")]
        );
    }

    #[test]
    fn test_no_candidates_for_functions_or_prefix_itself() {
        let mapping = mapping(&[("Foo", &["/src"])]);
        assert!(
            mapping
                .resolve_possible_file_paths(&Identifier::new("Foo\\Bar", IdentifierType::Function))
                .is_empty()
        );
        assert!(mapping.resolve_possible_file_paths(&class("Foo")).is_empty());
        assert!(mapping.resolve_possible_file_paths(&class("FooBar\\Baz")).is_empty());
        assert!(Psr4Mapping::default().resolve_possible_file_paths(&class("Foo")).is_empty());
    }

    #[test]
    fn test_longer_prefix_equal_to_class_is_skipped() {
        let mapping = mapping(&[("Foo\\Bar", &["/deep"]), ("Foo", &["/shallow"])]);
        assert_eq!(
            mapping.resolve_possible_file_paths(&class("Foo\\Bar")),
            vec![PathBuf::from("/shallow/Bar.php")]
        );
    }
}
