use std::collections::HashMap;

use parking_lot::Mutex;

use super::SourceLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::reflection::Reflection;
use crate::reflector::{Reflector, ReflectorId};

/// Caches another locator's answers per reflector.
///
/// Both hits and misses (`None`) are stored. Entries never expire. The
/// lock is released before delegating, so a lookup that re-enters this
/// locator does not deadlock; two threads racing on the same key may both
/// delegate, and the first stored answer wins.
pub struct MemoizingSourceLocator<L: SourceLocator> {
    inner: L,
    by_identifier: Mutex<HashMap<(ReflectorId, Identifier), Option<Reflection>>>,
    by_type: Mutex<HashMap<(ReflectorId, IdentifierType), Vec<Reflection>>>,
}

impl<L: SourceLocator> MemoizingSourceLocator<L> {
    pub fn new(inner: L) -> Self {
        MemoizingSourceLocator {
            inner,
            by_identifier: Mutex::new(HashMap::new()),
            by_type: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: SourceLocator> SourceLocator for MemoizingSourceLocator<L> {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        let key = (reflector.id(), identifier.clone());
        if let Some(cached) = self.by_identifier.lock().get(&key) {
            tracing::trace!("memo hit for {}", identifier);
            return Ok(cached.clone());
        }

        let located = self.inner.locate_identifier(reflector, identifier)?;
        Ok(self
            .by_identifier
            .lock()
            .entry(key)
            .or_insert(located)
            .clone())
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        let key = (reflector.id(), identifier_type);
        if let Some(cached) = self.by_type.lock().get(&key) {
            tracing::trace!("memo hit for all {} declarations", identifier_type);
            return Ok(cached.clone());
        }

        let located = self
            .inner
            .locate_identifiers_by_type(reflector, identifier_type)?;
        Ok(self.by_type.lock().entry(key).or_insert(located).clone())
    }
}
