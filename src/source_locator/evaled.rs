use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;

/// Host access to code that was defined through `eval()`.
pub trait EvaledCodeRegistry: Send + Sync {
    /// The evaluated source that declared `identifier`, if any.
    fn source_for(&self, identifier: &Identifier) -> Option<String>;
}

/// Locates symbols declared in evaluated code. The resulting source has
/// no file name.
pub struct EvaledCodeSourceLocator {
    registry: Arc<dyn EvaledCodeRegistry>,
    ast_locator: AstLocator,
}

impl EvaledCodeSourceLocator {
    pub fn new(registry: Arc<dyn EvaledCodeRegistry>, ast_locator: AstLocator) -> Self {
        EvaledCodeSourceLocator {
            registry,
            ast_locator,
        }
    }
}

impl SourceLocator for EvaledCodeSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        let Some(source) = self.registry.source_for(identifier) else {
            return Ok(None);
        };
        self.ast_locator.find_reflection(
            reflector,
            Arc::new(LocatedSource::evaled(source)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::no_function_reflector;
    use crate::parser::MagoParser;
    use crate::reflector::ReflectorId;
    use std::collections::HashMap;

    struct TestReflector(ReflectorId);

    impl Reflector for TestReflector {
        fn id(&self) -> ReflectorId {
            self.0
        }
    }

    struct Registry(HashMap<Identifier, String>);

    impl EvaledCodeRegistry for Registry {
        fn source_for(&self, identifier: &Identifier) -> Option<String> {
            self.0.get(identifier).cloned()
        }
    }

    #[test]
    fn test_evaled_class_has_no_file() {
        let mut sources = HashMap::new();
        sources.insert(
            Identifier::new("Made", IdentifierType::Class),
            "<?php class Made { const A = 1; }".to_string(),
        );
        let locator = EvaledCodeSourceLocator::new(
            Arc::new(Registry(sources)),
            AstLocator::new(Arc::new(MagoParser), no_function_reflector()),
        );
        let reflector = TestReflector(ReflectorId::next());

        let class = locator
            .locate_identifier(&reflector, &Identifier::new("made", IdentifierType::Class))
            .unwrap()
            .expect("class")
            .into_class()
            .unwrap();
        assert!(class.located_source().is_evaled());
        assert!(class.file_name().is_none());
        assert!(
            locator
                .locate_identifier(&reflector, &Identifier::new("Other", IdentifierType::Class))
                .unwrap()
                .is_none()
        );
    }
}
