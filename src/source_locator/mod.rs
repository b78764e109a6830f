/// Source locators: where PHP source for a symbol comes from.
///
/// Every variant implements the same two-operation [`SourceLocator`]
/// trait, so they can be stacked in an [`AggregateSourceLocator`] and
/// wrapped in a [`MemoizingSourceLocator`]. "Not found" is `Ok(None)` or an
/// empty list, never an error.
pub mod aggregate;
pub mod autoload;
pub mod closure;
pub mod composer;
pub mod directories;
pub mod evaled;
pub mod memoizing;
pub mod php_internal;
pub mod psr4;
pub mod single_file;
pub mod string;

use std::sync::Arc;

use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType};
use crate::reflection::Reflection;
use crate::reflector::Reflector;

pub use aggregate::AggregateSourceLocator;
pub use autoload::{AutoloadSourceLocator, ClassAutoloader};
pub use closure::{ClosureLocation, ClosureSourceLocator, RuntimeClosure};
pub use composer::{ClassMap, ComposerSourceLocator};
pub use directories::DirectoriesSourceLocator;
pub use evaled::{EvaledCodeRegistry, EvaledCodeSourceLocator};
pub use memoizing::MemoizingSourceLocator;
pub use php_internal::PhpInternalSourceLocator;
pub use psr4::{Psr4Mapping, Psr4SourceLocator};
pub use single_file::SingleFileSourceLocator;
pub use string::StringSourceLocator;

pub trait SourceLocator: Send + Sync {
    /// Locate the single declaration `identifier` names.
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>>;

    /// Locate every declaration of `identifier_type` this locator can
    /// enumerate.
    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>>;
}

impl<T: SourceLocator + ?Sized> SourceLocator for Arc<T> {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        (**self).locate_identifier(reflector, identifier)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        (**self).locate_identifiers_by_type(reflector, identifier_type)
    }
}
