use std::path::Path;
use std::sync::Arc;

use super::SourceLocator;
use crate::ast::AstLocator;
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::reflection::Reflection;
use crate::reflector::Reflector;
use crate::util::{assert_readable_file, read_source};

/// What the host runtime knows about a live closure.
pub trait RuntimeClosure: Send + Sync {
    /// The declaring file, or a runtime pseudo-name such as
    /// `/app/x.php(3) : eval()'d code`.
    fn file_name(&self) -> &str;

    fn start_line(&self) -> usize;
}

/// A closure known only by where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureLocation {
    pub file_name: String,
    pub start_line: usize,
}

impl ClosureLocation {
    pub fn new(file_name: impl Into<String>, start_line: usize) -> Self {
        ClosureLocation {
            file_name: file_name.into(),
            start_line,
        }
    }
}

impl RuntimeClosure for ClosureLocation {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn start_line(&self) -> usize {
        self.start_line
    }
}

/// Locates the closure a [`RuntimeClosure`] describes by file and line.
///
/// Only function identifiers are served; the identifier's name is ignored
/// because closures have none.
pub struct ClosureSourceLocator {
    closure: Arc<dyn RuntimeClosure>,
    ast_locator: AstLocator,
}

impl ClosureSourceLocator {
    pub fn new(closure: Arc<dyn RuntimeClosure>, ast_locator: AstLocator) -> Self {
        ClosureSourceLocator {
            closure,
            ast_locator,
        }
    }

    fn locate(&self, reflector: &dyn Reflector) -> Result<Option<Reflection>> {
        let file_name = self.closure.file_name();
        if file_name.contains("eval()'d code") {
            return Err(Error::EvaledClosureCannotBeLocated);
        }
        let path = Path::new(file_name);
        assert_readable_file(path)?;
        let source = read_source(path)?;

        self.ast_locator.find_closure(
            reflector,
            Arc::new(LocatedSource::new(source, Some(path))),
            self.closure.start_line(),
        )
    }
}

impl SourceLocator for ClosureSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        if !identifier.kind().is_function() {
            return Ok(None);
        }
        self.locate(reflector)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        if !identifier_type.is_function() {
            return Ok(Vec::new());
        }
        Ok(self.locate(reflector)?.into_iter().collect())
    }
}
