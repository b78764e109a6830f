/// Strategies that turn a located declaration node into a reflection.
use std::sync::Arc;

use mago_syntax::ast::Trivia;

use crate::ast::namespace::NamespaceContext;
use crate::ast::walker::DeclarationNode;
use crate::error::Result;
use crate::located_source::LocatedSource;
use crate::reflection::{
    BuildMode, Reflection, ReflectionClass, ReflectionConstant, ReflectionFunction,
};
use crate::reflector::Reflector;
use crate::util::LineIndex;

/// Everything about the parsed file a builder needs besides the node.
pub struct NodeScope<'a> {
    pub located_source: &'a Arc<LocatedSource>,
    pub namespace: &'a Arc<NamespaceContext>,
    pub lines: &'a LineIndex,
    pub trivia: &'a [Trivia<'a>],
}

impl NodeScope<'_> {
    pub fn source(&self) -> &str {
        self.located_source.source()
    }
}

pub trait NodeToReflection: Send + Sync {
    fn node_to_reflection(
        &self,
        reflector: &dyn Reflector,
        node: &DeclarationNode<'_>,
        scope: &NodeScope<'_>,
    ) -> Result<Reflection>;
}

fn build(
    reflector: &dyn Reflector,
    node: &DeclarationNode<'_>,
    scope: &NodeScope<'_>,
    mode: BuildMode,
) -> Result<Reflection> {
    match node {
        DeclarationNode::Class(_)
        | DeclarationNode::Interface(_)
        | DeclarationNode::Trait(_)
        | DeclarationNode::Enum(_) => Ok(Reflection::Class(Arc::new(
            ReflectionClass::from_node(reflector, node, scope, mode)?,
        ))),
        DeclarationNode::Function(_)
        | DeclarationNode::Closure(_)
        | DeclarationNode::ArrowFunction(_) => Ok(Reflection::Function(Arc::new(
            ReflectionFunction::from_node(reflector, node, scope, mode)?,
        ))),
        DeclarationNode::Constant(..) | DeclarationNode::Define(_) => Ok(Reflection::Constant(
            Arc::new(ReflectionConstant::from_node(reflector, node, scope, mode)?),
        )),
    }
}

/// Builds full reflections: members, parameters, types and compiled values.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompileNodeToReflection;

impl NodeToReflection for CompileNodeToReflection {
    fn node_to_reflection(
        &self,
        reflector: &dyn Reflector,
        node: &DeclarationNode<'_>,
        scope: &NodeScope<'_>,
    ) -> Result<Reflection> {
        build(reflector, node, scope, BuildMode::Compiled)
    }
}

/// Builds name, kind and location only. Used for existence checks where
/// compiling values would be wasted work.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentifierOnlyNodeToReflection;

impl NodeToReflection for IdentifierOnlyNodeToReflection {
    fn node_to_reflection(
        &self,
        reflector: &dyn Reflector,
        node: &DeclarationNode<'_>,
        scope: &NodeScope<'_>,
    ) -> Result<Reflection> {
        build(reflector, node, scope, BuildMode::IdentifierOnly)
    }
}
