use std::sync::Arc;

use super::{BuildMode, LineSpan, node_text};
use crate::ast::strategy::NodeScope;
use crate::ast::walker::{DeclarationNode, define_name, define_value};
use crate::error::{Error, Result};
use crate::located_source::LocatedSource;
use crate::node_compiler::{CompileNodeToValue, CompiledValue, CompilerContext};
use crate::reflector::Reflector;
use crate::util::{qualify, short_name, split_namespace};

/// A global constant declared with `const` or `define()`.
#[derive(Debug, Clone)]
pub struct ReflectionConstant {
    pub(crate) name: String,
    pub(crate) value: Option<CompiledValue>,
    pub(crate) value_text: String,
    pub(crate) is_define: bool,
    pub(crate) lines: LineSpan,
    pub(crate) located_source: Arc<LocatedSource>,
}

impl ReflectionConstant {
    pub(crate) fn from_node(
        reflector: &dyn Reflector,
        node: &DeclarationNode<'_>,
        scope: &NodeScope<'_>,
        mode: BuildMode,
    ) -> Result<Self> {
        let source = scope.source();
        let (name, value_expr, lines, is_define) = match *node {
            DeclarationNode::Constant(statement, item) => (
                qualify(scope.namespace.name(), item.name.value),
                Some(item.value),
                LineSpan::of(statement, scope),
                false,
            ),
            DeclarationNode::Define(call) => {
                let name = define_name(call).ok_or(Error::InvalidNodeType {
                    expected: "a define() call with a literal name",
                    found: "define() call",
                })?;
                (
                    name.trim_start_matches('\\').to_string(),
                    define_value(call),
                    LineSpan::of(call, scope),
                    true,
                )
            }
            other => {
                return Err(Error::InvalidNodeType {
                    expected: "a const statement or define() call",
                    found: other.kind_name(),
                });
            }
        };

        let value = match (mode, value_expr) {
            (BuildMode::Compiled, Some(expr)) => {
                let context = CompilerContext::new(reflector, scope.located_source.file_name())
                    .with_namespace(scope.namespace);
                Some(CompileNodeToValue::new(&context, source, scope.lines).compile(expr)?)
            }
            (BuildMode::Compiled, None) => Some(CompiledValue::Null),
            (BuildMode::IdentifierOnly, _) => None,
        };

        Ok(ReflectionConstant {
            name,
            value,
            value_text: value_expr
                .map(|expr| node_text(source, expr).to_string())
                .unwrap_or_default(),
            is_define,
            lines,
            located_source: Arc::clone(scope.located_source),
        })
    }

    /// Fully-qualified name without a leading `\`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn namespace_name(&self) -> Option<&str> {
        split_namespace(&self.name).0
    }

    /// The compiled value; `None` when reflected identifier-only.
    pub fn value(&self) -> Option<&CompiledValue> {
        self.value.as_ref()
    }

    /// The initialiser as written in source.
    pub fn value_text(&self) -> &str {
        &self.value_text
    }

    /// Declared through `define()` rather than `const`.
    pub fn is_define(&self) -> bool {
        self.is_define
    }

    pub fn is_internal(&self) -> bool {
        self.located_source.is_internal()
    }

    pub fn is_user_defined(&self) -> bool {
        !self.is_internal()
    }

    pub fn extension_name(&self) -> Option<&str> {
        self.located_source.extension_name()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.located_source.file_name()
    }

    pub fn start_line(&self) -> usize {
        self.lines.start_line
    }

    pub fn end_line(&self) -> usize {
        self.lines.end_line
    }

    pub fn located_source(&self) -> &LocatedSource {
        &self.located_source
    }

    pub fn is_compiled(&self) -> bool {
        self.value.is_some()
    }
}
