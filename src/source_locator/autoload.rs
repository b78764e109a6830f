use std::path::PathBuf;
use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;
use crate::util::read_source;

/// Asks the host where the file declaring a class lives, the way a PHP
/// autoloader would, without loading it.
pub trait ClassAutoloader: Send + Sync {
    fn find_file_for_class(&self, class_name: &str) -> Option<PathBuf>;
}

impl<F> ClassAutoloader for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn find_file_for_class(&self, class_name: &str) -> Option<PathBuf> {
        self(class_name)
    }
}

/// Locates classes through a [`ClassAutoloader`]. Functions and constants
/// are never autoloaded.
pub struct AutoloadSourceLocator {
    autoloader: Arc<dyn ClassAutoloader>,
    ast_locator: AstLocator,
}

impl AutoloadSourceLocator {
    pub fn new(autoloader: Arc<dyn ClassAutoloader>, ast_locator: AstLocator) -> Self {
        AutoloadSourceLocator {
            autoloader,
            ast_locator,
        }
    }
}

impl SourceLocator for AutoloadSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        if !identifier.kind().is_class() {
            return Ok(None);
        }
        let Some(path) = self.autoloader.find_file_for_class(identifier.name()) else {
            tracing::debug!("autoloader has no file for {}", identifier);
            return Ok(None);
        };
        if !path.is_file() {
            return Err(Error::InvalidFileLocation {
                path,
                reason: "autoloader returned a path that is not a file".to_string(),
            });
        }
        let source = read_source(&path)?;
        self.ast_locator.find_reflection(
            reflector,
            Arc::new(LocatedSource::new(source, Some(&path))),
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
