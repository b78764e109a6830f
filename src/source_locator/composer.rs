use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;
use crate::util::read_source;

/// A precomputed class name to file lookup, such as Composer's
/// `autoload_classmap.php`.
pub trait ClassMap: Send + Sync {
    fn find_file(&self, class_name: &str) -> Option<&Path>;
}

impl ClassMap for HashMap<String, PathBuf> {
    fn find_file(&self, class_name: &str) -> Option<&Path> {
        let class_name = class_name.trim_start_matches('\\');
        if let Some(path) = self.get(class_name) {
            return Some(path);
        }
        self.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(class_name))
            .map(|(_, path)| path.as_path())
    }
}

/// Locates classes listed in a [`ClassMap`].
pub struct ComposerSourceLocator {
    class_map: Arc<dyn ClassMap>,
    ast_locator: AstLocator,
}

impl ComposerSourceLocator {
    pub fn new(class_map: Arc<dyn ClassMap>, ast_locator: AstLocator) -> Self {
        ComposerSourceLocator {
            class_map,
            ast_locator,
        }
    }
}

impl SourceLocator for ComposerSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        if !identifier.kind().is_class() {
            return Ok(None);
        }
        let Some(path) = self.class_map.find_file(identifier.name()) else {
            return Ok(None);
        };
        tracing::debug!("classmap hit for {}: {}", identifier, path.display());
        let source = read_source(path)?;
        self.ast_locator.find_reflection(
            reflector,
            Arc::new(LocatedSource::new(source, Some(path))),
            identifier,
        )
    }

    fn locate_identifiers_by_type(
        &self,
        _reflector: &dyn Reflector,
        _identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        Ok(Vec::new())
    }
}
