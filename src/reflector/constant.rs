use std::sync::Arc;

use super::{ClassReflector, Reflector, ReflectorId};
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType, NameRules};
use crate::node_compiler::CompiledValue;
use crate::reflection::{Reflection, ReflectionConstant};
use crate::source_locator::SourceLocator;

/// Reference chains longer than this are left unresolved.
const MAX_REFERENCE_DEPTH: usize = 32;

/// Reflects global constants by name.
///
/// Holds a class reflector so that constant values referring to class
/// constants can be followed.
pub struct ConstantReflector {
    id: ReflectorId,
    source_locator: Arc<dyn SourceLocator>,
    class_reflector: Arc<ClassReflector>,
    rules: Arc<NameRules>,
}

impl ConstantReflector {
    pub fn new(source_locator: Arc<dyn SourceLocator>, class_reflector: Arc<ClassReflector>) -> Self {
        ConstantReflector {
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

    pub fn reflect(&self, constant_name: &str) -> Result<Arc<ReflectionConstant>> {
        let identifier =
            Identifier::with_rules(constant_name, IdentifierType::Constant, &self.rules);
        match self.source_locator.locate_identifier(self, &identifier)? {
            Some(reflection) => reflection.into_constant(),
            None => Err(Error::IdentifierNotFound { identifier }),
        }
    }

    pub fn get_all_constants(&self) -> Result<Vec<Arc<ReflectionConstant>>> {
        self.source_locator
            .locate_identifiers_by_type(self, IdentifierType::Constant)?
            .into_iter()
            .map(Reflection::into_constant)
            .collect()
    }

    /// The constant's value with references to other constants followed.
    ///
    /// A missing referenced constant or class fails with
    /// [`Error::IdentifierNotFound`]. Values that cannot be evaluated
    /// statically stay [`CompiledValue::Unresolved`].
    pub fn resolve_value(&self, constant: &ReflectionConstant) -> Result<CompiledValue> {
        let mut value = match constant.value() {
            Some(value) => value.clone(),
            None => self.reflect(constant.name())?.value().cloned().unwrap_or(CompiledValue::Null),
        };

        for _ in 0..MAX_REFERENCE_DEPTH {
            value = match value {
                CompiledValue::ConstantRef(name) => {
                    let target = self.reflect(&name)?;
                    target.value().cloned().unwrap_or(CompiledValue::Null)
                }
                CompiledValue::ClassConstantRef { class, constant } => {
                    let reflection = self.class_reflector.reflect(&class)?;
                    match reflection.constant(&constant) {
                        Some(class_constant) => class_constant.value().clone(),
                        None => {
                            return Err(Error::IdentifierNotFound {
                                identifier: Identifier::new(
                                    &format!("{}::{}", class, constant),
                                    IdentifierType::Constant,
                                ),
                            });
                        }
                    }
                }
                resolved => return Ok(resolved),
            };
        }

        tracing::warn!("constant {} has a reference chain that is too deep", constant.name());
        Ok(CompiledValue::Unresolved(constant.value_text().to_string()))
    }
}

impl Reflector for ConstantReflector {
    fn id(&self) -> ReflectorId {
        self.id
    }
}
