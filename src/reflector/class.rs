use std::sync::Arc;

use super::{Reflector, ReflectorId};
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType, NameRules};
use crate::reflection::{Reflection, ReflectionClass};
use crate::source_locator::SourceLocator;

/// Reflects classes, interfaces, traits and enums by name.
pub struct ClassReflector {
    id: ReflectorId,
    source_locator: Arc<dyn SourceLocator>,
    rules: Arc<NameRules>,
}

impl ClassReflector {
    pub fn new(source_locator: Arc<dyn SourceLocator>) -> Self {
        ClassReflector {
            id: ReflectorId::next(),
            source_locator,
            rules: NameRules::shared_default(),
        }
    }

    pub fn with_name_rules(mut self, rules: Arc<NameRules>) -> Self {
        self.rules = rules;
        self
    }

    pub fn source_locator(&self) -> &Arc<dyn SourceLocator> {
        &self.source_locator
    }

    pub fn reflect(&self, class_name: &str) -> Result<Arc<ReflectionClass>> {
        let identifier = Identifier::with_rules(class_name, IdentifierType::Class, &self.rules);
        match self.source_locator.locate_identifier(self, &identifier)? {
            Some(reflection) => reflection.into_class(),
            None => Err(Error::IdentifierNotFound { identifier }),
        }
    }

    /// Every class the locator can enumerate.
    pub fn get_all_classes(&self) -> Result<Vec<Arc<ReflectionClass>>> {
        self.source_locator
            .locate_identifiers_by_type(self, IdentifierType::Class)?
            .into_iter()
            .map(Reflection::into_class)
            .collect()
    }
}

impl Reflector for ClassReflector {
    fn id(&self) -> ReflectorId {
        self.id
    }
}
