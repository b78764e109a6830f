use std::sync::Arc;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use super::{BuildMode, LineSpan, node_text};
use crate::ast::namespace::NamespaceContext;
use crate::ast::strategy::NodeScope;
use crate::ast::walker::DeclarationNode;
use crate::docblock::{find_return_type, get_docblock_text_for_node};
use crate::error::{Error, Result};
use crate::located_source::LocatedSource;
use crate::node_compiler::{CompileNodeToValue, CompiledValue, CompilerContext};
use crate::reflector::Reflector;
use crate::util::{qualify, short_name};

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionParameter {
    pub(crate) name: String,
    pub(crate) position: usize,
    pub(crate) type_hint: Option<String>,
    pub(crate) default_value: Option<CompiledValue>,
    pub(crate) default_text: Option<String>,
    pub(crate) is_variadic: bool,
    pub(crate) is_by_ref: bool,
    pub(crate) is_promoted: bool,
}

impl ReflectionParameter {
    /// Name without the leading `$`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    pub fn has_default_value(&self) -> bool {
        self.default_text.is_some()
    }

    /// The compiled default. `None` when there is no default, or when
    /// reflecting in identifier-only mode.
    pub fn default_value(&self) -> Option<&CompiledValue> {
        self.default_value.as_ref()
    }

    /// The default as written in source.
    pub fn default_value_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.has_default_value() || self.is_variadic
    }

    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    pub fn is_passed_by_reference(&self) -> bool {
        self.is_by_ref
    }

    pub fn is_promoted(&self) -> bool {
        self.is_promoted
    }
}

/// Build the parameters of any function-like node.
///
/// Defaults that cannot be evaluated in `compiler`'s context (e.g.
/// `self::X` outside a class) are kept as unresolved source text rather
/// than failing the whole reflection; PHP only evaluates them on use.
pub(crate) fn build_parameters(
    list: &FunctionLikeParameterList<'_>,
    source: &str,
    compiler: Option<&CompileNodeToValue<'_, '_>>,
) -> Vec<ReflectionParameter> {
    list.parameters
        .iter()
        .enumerate()
        .map(|(position, param)| {
            let default_expr = param.default_value.as_ref().map(|default| default.value);
            let default_text = default_expr.map(|expr| node_text(source, expr).to_string());
            let default_value = match (compiler, default_expr) {
                (Some(compiler), Some(expr)) => Some(
                    compiler
                        .compile(expr)
                        .unwrap_or_else(|_| CompiledValue::Unresolved(node_text(source, expr).to_string())),
                ),
                _ => None,
            };
            let raw_name = param.variable.name;

            ReflectionParameter {
                name: raw_name.strip_prefix('$').unwrap_or(raw_name).to_string(),
                position,
                type_hint: param.hint.as_ref().map(|hint| node_text(source, hint).to_string()),
                default_value,
                default_text,
                is_variadic: param.ellipsis.is_some(),
                is_by_ref: param.ampersand.is_some(),
                is_promoted: param.is_promoted_property(),
            }
        })
        .collect()
}

/// A named function, closure or arrow function.
#[derive(Debug, Clone)]
pub struct ReflectionFunction {
    pub(crate) name: String,
    pub(crate) namespace: Arc<NamespaceContext>,
    pub(crate) parameters: Vec<ReflectionParameter>,
    pub(crate) return_type: Option<String>,
    pub(crate) doc_comment: Option<String>,
    pub(crate) doc_return_types: Vec<String>,
    pub(crate) used_variables: Vec<String>,
    pub(crate) is_closure: bool,
    pub(crate) is_static: bool,
    pub(crate) lines: LineSpan,
    pub(crate) located_source: Arc<LocatedSource>,
    pub(crate) compiled: bool,
}

impl ReflectionFunction {
    pub(crate) fn from_node(
        reflector: &dyn Reflector,
        node: &DeclarationNode<'_>,
        scope: &NodeScope<'_>,
        mode: BuildMode,
    ) -> Result<Self> {
        let (short, parameter_list, return_hint, span): (
            &str,
            &FunctionLikeParameterList<'_>,
            Option<&Hint<'_>>,
            Span,
        ) = match node {
            DeclarationNode::Function(function) => (
                function.name.value,
                &function.parameter_list,
                function.return_type_hint.as_ref().map(|rth| &rth.hint),
                function.span(),
            ),
            DeclarationNode::Closure(closure) => (
                "{closure}",
                &closure.parameter_list,
                closure.return_type_hint.as_ref().map(|rth| &rth.hint),
                closure.span(),
            ),
            DeclarationNode::ArrowFunction(arrow) => (
                "{closure}",
                &arrow.parameter_list,
                arrow.return_type_hint.as_ref().map(|rth| &rth.hint),
                arrow.span(),
            ),
            other => {
                return Err(Error::InvalidNodeType {
                    expected: "a function, closure or arrow function",
                    found: other.kind_name(),
                });
            }
        };

        let is_closure = !matches!(node, DeclarationNode::Function(_));
        let name = if is_closure {
            short.to_string()
        } else {
            qualify(scope.namespace.name(), short)
        };
        let source = scope.source();
        let lines = LineSpan::from_span(span, scope);
        // `static function () {}` and `static fn () => ...`
        let is_static = is_closure
            && source
                .get(span.start.offset as usize..)
                .is_some_and(|text| text.trim_start().starts_with("static"));

        let mut function = ReflectionFunction {
            name,
            namespace: Arc::clone(scope.namespace),
            parameters: Vec::new(),
            return_type: None,
            doc_comment: None,
            doc_return_types: Vec::new(),
            used_variables: Vec::new(),
            is_closure,
            is_static,
            lines,
            located_source: Arc::clone(scope.located_source),
            compiled: mode == BuildMode::Compiled,
        };
        if mode == BuildMode::IdentifierOnly {
            return Ok(function);
        }

        let context = CompilerContext::new(reflector, scope.located_source.file_name())
            .with_namespace(scope.namespace)
            .with_function_name(&function.name);
        let compiler = CompileNodeToValue::new(&context, source, scope.lines);
        function.parameters = build_parameters(parameter_list, source, Some(&compiler));
        function.return_type = return_hint.map(|hint| node_text(source, hint).to_string());

        let doc = match node {
            DeclarationNode::Function(f) => get_docblock_text_for_node(scope.trivia, source, *f),
            DeclarationNode::Closure(c) => get_docblock_text_for_node(scope.trivia, source, *c),
            DeclarationNode::ArrowFunction(a) => {
                get_docblock_text_for_node(scope.trivia, source, *a)
            }
            _ => None,
        };
        if let Some(doc) = doc {
            function.doc_return_types = find_return_type(doc, scope.namespace);
            function.doc_comment = Some(doc.to_string());
        }

        if let DeclarationNode::Closure(closure) = node
            && let Some(use_clause) = &closure.use_clause
        {
            function.used_variables = use_clause
                .variables
                .iter()
                .map(|var| {
                    node_text(source, var)
                        .trim_start_matches('&')
                        .trim()
                        .trim_start_matches('$')
                        .to_string()
                })
                .collect();
        }

        Ok(function)
    }

    /// Fully-qualified name; `{closure}` for closures.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn namespace_name(&self) -> Option<&str> {
        if self.is_closure {
            return self.namespace.name();
        }
        crate::util::split_namespace(&self.name).0
    }

    pub fn parameters(&self) -> &[ReflectionParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ReflectionParameter> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.parameters.iter().find(|param| param.name == name)
    }

    pub fn number_of_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn number_of_required_parameters(&self) -> usize {
        self.parameters
            .iter()
            .filter(|param| !param.is_optional())
            .count()
    }

    /// The native return type as written.
    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    /// `@return` types from the docblock, class names fully qualified.
    pub fn doc_block_return_types(&self) -> &[String] {
        &self.doc_return_types
    }

    /// Variables imported with `use (...)`, without `$`.
    pub fn used_variables(&self) -> &[String] {
        &self.used_variables
    }

    pub fn is_closure(&self) -> bool {
        self.is_closure
    }

    pub fn is_static(&self) -> bool {
        self.is_static
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

    pub fn line_span(&self) -> LineSpan {
        self.lines
    }

    pub fn located_source(&self) -> &LocatedSource {
        &self.located_source
    }

    /// Whether members were compiled, as opposed to identifier-only.
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }
}
