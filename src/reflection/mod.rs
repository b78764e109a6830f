/// Reflection data produced from syntax nodes.
///
/// Every reflection owns its data (the syntax tree is discarded once a
/// file has been searched) and shares the [`LocatedSource`] it came from.
/// Reflections are handed out behind `Arc` so caches can return the very
/// same instance on repeated lookups.
mod class;
mod constant;
mod function;
mod string_cast;

use std::sync::Arc;

use mago_span::{HasSpan, Span};

pub use class::{ClassKind, ReflectionClass, ReflectionClassConstant, ReflectionMethod, ReflectionProperty};
pub use constant::ReflectionConstant;
pub use function::{ReflectionFunction, ReflectionParameter};

use crate::ast::strategy::NodeScope;
use crate::error::{Error, Result};
use crate::identifier::IdentifierType;
use crate::located_source::LocatedSource;

/// How much of a node a builder turns into reflection data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Members, parameters, types, docblocks and compiled values.
    Compiled,
    /// Name, kind and location only.
    IdentifierOnly,
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// 1-based line and column range of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSpan {
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl LineSpan {
    pub(crate) fn of(node: &impl HasSpan, scope: &NodeScope<'_>) -> Self {
        Self::from_span(node.span(), scope)
    }

    pub(crate) fn from_span(span: Span, scope: &NodeScope<'_>) -> Self {
        let start = span.start.offset as usize;
        let end = span.end.offset as usize;
        LineSpan {
            start_line: scope.lines.line_of(start),
            end_line: scope.lines.line_of(end.saturating_sub(1).max(start)),
            start_column: scope.lines.column_of(start),
            end_column: scope.lines.column_of(end.saturating_sub(1).max(start)),
        }
    }
}

/// Source text covered by `node`, trimmed.
pub(crate) fn node_text<'s>(source: &'s str, node: &impl HasSpan) -> &'s str {
    let span = node.span();
    source
        .get(span.start.offset as usize..span.end.offset as usize)
        .unwrap_or("")
        .trim()
}

/// A located declaration of any kind.
#[derive(Debug, Clone)]
pub enum Reflection {
    Class(Arc<ReflectionClass>),
    Function(Arc<ReflectionFunction>),
    Constant(Arc<ReflectionConstant>),
}

impl Reflection {
    /// Fully-qualified name without a leading `\`.
    pub fn name(&self) -> &str {
        match self {
            Reflection::Class(class) => class.name(),
            Reflection::Function(function) => function.name(),
            Reflection::Constant(constant) => constant.name(),
        }
    }

    pub fn identifier_type(&self) -> IdentifierType {
        match self {
            Reflection::Class(_) => IdentifierType::Class,
            Reflection::Function(_) => IdentifierType::Function,
            Reflection::Constant(_) => IdentifierType::Constant,
        }
    }

    pub fn located_source(&self) -> &LocatedSource {
        match self {
            Reflection::Class(class) => class.located_source(),
            Reflection::Function(function) => function.located_source(),
            Reflection::Constant(constant) => constant.located_source(),
        }
    }

    /// Whether both values point at the same reflection instance.
    pub fn ptr_eq(&self, other: &Reflection) -> bool {
        match (self, other) {
            (Reflection::Class(a), Reflection::Class(b)) => Arc::ptr_eq(a, b),
            (Reflection::Function(a), Reflection::Function(b)) => Arc::ptr_eq(a, b),
            (Reflection::Constant(a), Reflection::Constant(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn into_class(self) -> Result<Arc<ReflectionClass>> {
        match self {
            Reflection::Class(class) => Ok(class),
            other => Err(other.unexpected(IdentifierType::Class)),
        }
    }

    pub fn into_function(self) -> Result<Arc<ReflectionFunction>> {
        match self {
            Reflection::Function(function) => Ok(function),
            other => Err(other.unexpected(IdentifierType::Function)),
        }
    }

    pub fn into_constant(self) -> Result<Arc<ReflectionConstant>> {
        match self {
            Reflection::Constant(constant) => Ok(constant),
            other => Err(other.unexpected(IdentifierType::Constant)),
        }
    }

    fn unexpected(&self, expected: IdentifierType) -> Error {
        Error::UnexpectedReflection {
            expected: expected.cache_key(),
            found: self.identifier_type().cache_key(),
        }
    }
}

impl std::fmt::Display for Reflection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reflection::Class(class) => write!(f, "{}", class),
            Reflection::Function(function) => write!(f, "{}", function),
            Reflection::Constant(constant) => write!(f, "{}", constant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::walker::{DeclarationNode, collect_declarations};
    use crate::parser::{MagoParser, Parser};
    use crate::reflector::{Reflector, ReflectorId};
    use crate::util::LineIndex;
    use bumpalo::Bump;

    struct TestReflector(ReflectorId);

    impl Reflector for TestReflector {
        fn id(&self) -> ReflectorId {
            self.0
        }
    }

    /// Hand the first declaration of `kind` in `source` to `build`.
    fn build_first(
        source: &str,
        kind: IdentifierType,
        build: impl Fn(&dyn Reflector, &DeclarationNode<'_>, &NodeScope<'_>) -> Result<()>,
    ) -> Result<()> {
        let arena = Bump::new();
        let program = MagoParser.parse(&arena, source, None).expect("parse");
        let declarations = collect_declarations(program, kind);
        let declaration = declarations.first().expect("a declaration");
        let located_source = Arc::new(LocatedSource::new(source, None));
        let lines = LineIndex::new(source);
        let scope = NodeScope {
            located_source: &located_source,
            namespace: &declaration.namespace,
            lines: &lines,
            trivia: program.trivia.as_slice(),
        };
        build(&TestReflector(ReflectorId::next()), &declaration.node, &scope)
    }

    #[test]
    fn test_function_from_class_node_is_invalid_node_type() {
        let err = build_first("<?php class Foo {}", IdentifierType::Class, |r, node, scope| {
            ReflectionFunction::from_node(r, node, scope, BuildMode::Compiled).map(drop)
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidNodeType {
                expected: "a function, closure or arrow function",
                found: "class",
            }
        ));
    }

    #[test]
    fn test_constant_from_function_node_is_invalid_node_type() {
        let source = "<?php function foo() {}";
        let err = build_first(source, IdentifierType::Function, |r, node, scope| {
            ReflectionConstant::from_node(r, node, scope, BuildMode::Compiled).map(drop)
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidNodeType {
                expected: "a const statement or define() call",
                found: "function",
            }
        ));
    }

    #[test]
    fn test_class_from_constant_node_is_invalid_node_type() {
        let err = build_first("<?php const A = 1;", IdentifierType::Constant, |r, node, scope| {
            ReflectionClass::from_node(r, node, scope, BuildMode::IdentifierOnly).map(drop)
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Node must be a class, interface, trait or enum, was const statement"
        );
    }
}
