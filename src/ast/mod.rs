/// Finding declarations in located source.
///
/// [`AstLocator`] parses a [`LocatedSource`], walks the tree for
/// declarations of the requested kind and hands matching nodes to a
/// [`NodeToReflection`] strategy. The syntax tree lives in a per-call
/// arena; only the owned reflections escape.
pub mod namespace;
pub mod strategy;
pub mod walker;

use std::sync::Arc;

use bumpalo::Bump;
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType};
use crate::located_source::LocatedSource;
use crate::parser::Parser;
use crate::reflection::Reflection;
use crate::reflector::{FunctionReflector, Reflector};
use crate::util::LineIndex;
use strategy::{CompileNodeToReflection, IdentifierOnlyNodeToReflection, NodeScope, NodeToReflection};
use walker::{Declaration, DeclarationNode, collect_closures, collect_declarations};

/// Deferred access to the function reflector.
///
/// The locator needs a function reflector to check whether an unqualified
/// `define()` inside a namespace is really a user function named
/// `define`, but the function reflector is built on top of locators that
/// use this very locator. Resolving it lazily breaks the cycle.
pub type FunctionReflectorSupplier =
    Arc<dyn Fn() -> Option<Arc<FunctionReflector>> + Send + Sync>;

/// A supplier that never yields a function reflector. Namespaced
/// `define()` calls are then always treated as the built-in.
pub fn no_function_reflector() -> FunctionReflectorSupplier {
    Arc::new(|| None)
}

#[derive(Clone)]
pub struct AstLocator {
    parser: Arc<dyn Parser>,
    function_reflector: FunctionReflectorSupplier,
    strategy: Arc<dyn NodeToReflection>,
}

impl AstLocator {
    pub fn new(parser: Arc<dyn Parser>, function_reflector: FunctionReflectorSupplier) -> Self {
        AstLocator {
            parser,
            function_reflector,
            strategy: Arc::new(CompileNodeToReflection),
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn NodeToReflection>) -> Self {
        self.strategy = strategy;
        self
    }

    /// A copy of this locator that builds identifier-only reflections.
    pub fn identifier_only(&self) -> Self {
        self.clone()
            .with_strategy(Arc::new(IdentifierOnlyNodeToReflection))
    }

    /// Find the first declaration in `located_source` matching `identifier`.
    pub fn find_reflection(
        &self,
        reflector: &dyn Reflector,
        located_source: Arc<LocatedSource>,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        let arena = Bump::new();
        let program = self.parser.parse(
            &arena,
            located_source.source(),
            located_source.file_name(),
        )?;
        let lines = LineIndex::new(located_source.source());

        for declaration in collect_declarations(program, identifier.kind()) {
            let Some(name) = declaration.qualified_name() else {
                continue;
            };
            if !identifier.matches(&name) || self.is_shadowed_define(&declaration)? {
                continue;
            }
            let scope = NodeScope {
                located_source: &located_source,
                namespace: &declaration.namespace,
                lines: &lines,
                trivia: program.trivia.as_slice(),
            };
            tracing::trace!("found {} in {:?}", identifier, located_source.file_name());
            return self
                .strategy
                .node_to_reflection(reflector, &declaration.node, &scope)
                .map(Some);
        }
        Ok(None)
    }

    /// Every declaration of `kind` in `located_source`, in source order.
    pub fn find_reflections_of_type(
        &self,
        reflector: &dyn Reflector,
        located_source: Arc<LocatedSource>,
        kind: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        let arena = Bump::new();
        let program = self.parser.parse(
            &arena,
            located_source.source(),
            located_source.file_name(),
        )?;
        let lines = LineIndex::new(located_source.source());

        let mut reflections = Vec::new();
        for declaration in collect_declarations(program, kind) {
            if declaration.qualified_name().is_none() || self.is_shadowed_define(&declaration)? {
                continue;
            }
            let scope = NodeScope {
                located_source: &located_source,
                namespace: &declaration.namespace,
                lines: &lines,
                trivia: program.trivia.as_slice(),
            };
            reflections.push(
                self.strategy
                    .node_to_reflection(reflector, &declaration.node, &scope)?,
            );
        }
        Ok(reflections)
    }

    /// The single closure or arrow function that starts on `line`.
    ///
    /// More than one closure starting on that line is ambiguous and fails
    /// with [`Error::TwoClosuresOnSameLine`].
    pub fn find_closure(
        &self,
        reflector: &dyn Reflector,
        located_source: Arc<LocatedSource>,
        line: usize,
    ) -> Result<Option<Reflection>> {
        let arena = Bump::new();
        let program = self.parser.parse(
            &arena,
            located_source.source(),
            located_source.file_name(),
        )?;
        let lines = LineIndex::new(located_source.source());

        let mut on_line = collect_closures(program).into_iter().filter(|declaration| {
            let start = match declaration.node {
                DeclarationNode::Closure(closure) => closure.span().start,
                DeclarationNode::ArrowFunction(arrow) => arrow.span().start,
                _ => return false,
            };
            lines.line_of(start.offset as usize) == line
        });

        let Some(found) = on_line.next() else {
            return Ok(None);
        };
        if on_line.next().is_some() {
            return Err(Error::TwoClosuresOnSameLine {
                file_name: located_source.file_name().unwrap_or_default().to_string(),
                line,
            });
        }

        let scope = NodeScope {
            located_source: &located_source,
            namespace: &found.namespace,
            lines: &lines,
            trivia: program.trivia.as_slice(),
        };
        self.strategy
            .node_to_reflection(reflector, &found.node, &scope)
            .map(Some)
    }

    /// An unqualified `define()` inside a namespace calls `ns\define` when
    /// such a function exists. Those calls declare no constant.
    fn is_shadowed_define(&self, declaration: &Declaration<'_>) -> Result<bool> {
        let DeclarationNode::Define(call) = declaration.node else {
            return Ok(false);
        };
        let Some(namespace) = declaration.namespace.name() else {
            return Ok(false);
        };
        let unqualified = matches!(
            call.function,
            Expression::Identifier(ident) if !ident.value().starts_with('\\') && !ident.value().contains('\\')
        );
        if !unqualified {
            return Ok(false);
        }
        let Some(functions) = (self.function_reflector)() else {
            return Ok(false);
        };

        match functions.reflect(&format!("{}\\define", namespace)) {
            Ok(_) => {
                tracing::debug!("define() in {} resolves to a user function", namespace);
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
