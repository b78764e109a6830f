use std::sync::Arc;

use super::{ClassReflector, Reflector, ReflectorId};
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType, NameRules};
use crate::reflection::{Reflection, ReflectionClass, ReflectionFunction};
use crate::source_locator::SourceLocator;

/// Native types a parameter hint can name that are never classes.
const NON_CLASS_HINTS: &[&str] = &[
    "int", "float", "string", "bool", "array", "object", "mixed", "void", "never", "null",
    "true", "false", "callable", "iterable", "self", "static", "parent",
];

/// Reflects functions by name.
pub struct FunctionReflector {
    id: ReflectorId,
    source_locator: Arc<dyn SourceLocator>,
    class_reflector: Arc<ClassReflector>,
    rules: Arc<NameRules>,
}

impl FunctionReflector {
    pub fn new(source_locator: Arc<dyn SourceLocator>, class_reflector: Arc<ClassReflector>) -> Self {
        FunctionReflector {
            id: ReflectorId::next(),
            source_locator,
            class_reflector,
            rules: NameRules::shared_default(),
        }
    }

    pub fn with_name_rules(mut self, rules: Arc<NameRules>) -> Self {
        self.rules = rules;
        self
    }

    pub fn class_reflector(&self) -> &Arc<ClassReflector> {
        &self.class_reflector
    }

    pub fn reflect(&self, function_name: &str) -> Result<Arc<ReflectionFunction>> {
        let identifier =
            Identifier::with_rules(function_name, IdentifierType::Function, &self.rules);
        match self.source_locator.locate_identifier(self, &identifier)? {
            Some(reflection) => reflection.into_function(),
            None => Err(Error::IdentifierNotFound { identifier }),
        }
    }

    pub fn get_all_functions(&self) -> Result<Vec<Arc<ReflectionFunction>>> {
        self.source_locator
            .locate_identifiers_by_type(self, IdentifierType::Function)?
            .into_iter()
            .map(Reflection::into_function)
            .collect()
    }

    /// The class named by a parameter's type hint, if it names exactly one.
    ///
    /// `Foo` and `?Foo` resolve through the function's namespace imports;
    /// scalar, union and intersection hints give `None`.
    pub fn parameter_class(
        &self,
        function: &ReflectionFunction,
        parameter: &str,
    ) -> Result<Option<Arc<ReflectionClass>>> {
        let Some(hint) = function
            .parameter(parameter)
            .and_then(|param| param.type_hint())
        else {
            return Ok(None);
        };
        let hint = hint.strip_prefix('?').unwrap_or(hint);
        if hint.contains(['|', '&', '(']) || NON_CLASS_HINTS.contains(&hint.to_ascii_lowercase().as_str()) {
            return Ok(None);
        }
        let class_name = function.namespace.resolve_class_name(hint);
        self.class_reflector.reflect(&class_name).map(Some)
    }
}

impl Reflector for FunctionReflector {
    fn id(&self) -> ReflectorId {
        self.id
    }
}
