use super::SourceLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::reflection::Reflection;
use crate::reflector::Reflector;

/// An ordered list of locators, queried first to last.
#[derive(Default)]
pub struct AggregateSourceLocator {
    locators: Vec<Box<dyn SourceLocator>>,
}

impl AggregateSourceLocator {
    pub fn new(locators: Vec<Box<dyn SourceLocator>>) -> Self {
        AggregateSourceLocator { locators }
    }

    pub fn push(&mut self, locator: Box<dyn SourceLocator>) {
        self.locators.push(locator);
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

impl SourceLocator for AggregateSourceLocator {
    /// The first member's hit wins. Errors are not skipped over.
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        for locator in &self.locators {
            if let Some(reflection) = locator.locate_identifier(reflector, identifier)? {
                return Ok(Some(reflection));
            }
        }
        Ok(None)
    }

    /// All members' results concatenated in member order.
    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        let mut reflections = Vec::new();
        for locator in &self.locators {
            reflections.extend(locator.locate_identifiers_by_type(reflector, identifier_type)?);
        }
        Ok(reflections)
    }
}
