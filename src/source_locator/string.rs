use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;

/// Resolves symbols against literal source text with no file behind it.
pub struct StringSourceLocator {
    located_source: Arc<LocatedSource>,
    ast_locator: AstLocator,
}

impl StringSourceLocator {
    pub fn new(source: impl Into<String>, ast_locator: AstLocator) -> Self {
        StringSourceLocator {
            located_source: Arc::new(LocatedSource::new(source, None)),
            ast_locator,
        }
    }
}

impl SourceLocator for StringSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        self.ast_locator
            .find_reflection(reflector, Arc::clone(&self.located_source), identifier)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        self.ast_locator.find_reflections_of_type(
            reflector,
            Arc::clone(&self.located_source),
            identifier_type,
        )
    }
}
