use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;
use crate::source_stubber::{SourceStubber, StubData};

/// Locates classes, functions and constants built into PHP through a
/// [`SourceStubber`].
pub struct PhpInternalSourceLocator {
    stubber: Arc<dyn SourceStubber>,
    ast_locator: AstLocator,
}

impl PhpInternalSourceLocator {
    pub fn new(stubber: Arc<dyn SourceStubber>, ast_locator: AstLocator) -> Self {
        PhpInternalSourceLocator {
            stubber,
            ast_locator,
        }
    }

    fn stub_for(&self, identifier: &Identifier) -> Option<StubData> {
        match identifier.kind() {
            IdentifierType::Class => self.stubber.generate_class_stub(identifier.name()),
            IdentifierType::Function => self.stubber.generate_function_stub(identifier.name()),
            IdentifierType::Constant => self.stubber.generate_constant_stub(identifier.name()),
        }
    }
}

impl SourceLocator for PhpInternalSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        let Some(stub) = self.stub_for(identifier) else {
            return Ok(None);
        };
        // Stubs without an extension do not describe a built-in symbol.
        let Some(extension) = stub.extension_name() else {
            tracing::debug!("stub for {} has no extension, ignoring it", identifier);
            return Ok(None);
        };
        let located_source = LocatedSource::internal(stub.stub(), extension, stub.file_name());
        self.ast_locator
            .find_reflection(reflector, Arc::new(located_source), identifier)
    }

    fn locate_identifiers_by_type(
        &self,
        _reflector: &dyn Reflector,
        _identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        Ok(Vec::new())
    }
}
