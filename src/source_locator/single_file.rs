use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;
use crate::util::{assert_readable_file, read_source};

/// Resolves symbols against one fixed file, read on every lookup.
pub struct SingleFileSourceLocator {
    path: PathBuf,
    ast_locator: AstLocator,
}

impl SingleFileSourceLocator {
    /// Fails with [`Error::InvalidFileLocation`](crate::error::Error) if
    /// `path` is not an existing, readable file.
    pub fn new(path: impl Into<PathBuf>, ast_locator: AstLocator) -> Result<Self> {
        let path = path.into();
        assert_readable_file(&path)?;
        Ok(SingleFileSourceLocator { path, ast_locator })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn located_source(&self) -> Result<Arc<LocatedSource>> {
        tracing::debug!("reading {}", self.path.display());
        let source = read_source(&self.path)?;
        Ok(Arc::new(LocatedSource::new(source, Some(&self.path))))
    }
}

impl SourceLocator for SingleFileSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        self.ast_locator
            .find_reflection(reflector, self.located_source()?, identifier)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        self.ast_locator
            .find_reflections_of_type(reflector, self.located_source()?, identifier_type)
    }
}
