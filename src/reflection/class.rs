use std::collections::HashMap;
use std::sync::Arc;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use super::function::build_parameters;
use super::{BuildMode, LineSpan, ReflectionParameter, Visibility, node_text};
use crate::ast::namespace::NamespaceContext;
use crate::ast::strategy::NodeScope;
use crate::ast::walker::DeclarationNode;
use crate::docblock::{find_return_type, get_docblock_text_for_node};
use crate::error::{Error, Result};
use crate::located_source::LocatedSource;
use crate::node_compiler::{CompileNodeToValue, CompiledValue, CompilerContext};
use crate::reflector::Reflector;
use crate::util::{qualify, short_name, split_namespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionClassConstant {
    pub(crate) name: String,
    pub(crate) value: CompiledValue,
    pub(crate) visibility: Visibility,
    pub(crate) is_final: bool,
    pub(crate) doc_comment: Option<String>,
}

impl ReflectionClassConstant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &CompiledValue {
        &self.value
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionMethod {
    pub(crate) name: String,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_abstract: bool,
    pub(crate) is_final: bool,
    pub(crate) parameters: Vec<ReflectionParameter>,
    pub(crate) return_type: Option<String>,
    pub(crate) doc_comment: Option<String>,
    pub(crate) doc_return_types: Vec<String>,
    pub(crate) lines: LineSpan,
}

impl ReflectionMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_constructor(&self) -> bool {
        self.name.eq_ignore_ascii_case("__construct")
    }

    pub fn parameters(&self) -> &[ReflectionParameter] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    /// `@return` types from the docblock, resolved against the class's
    /// namespace and imports.
    pub fn doc_block_return_types(&self) -> &[String] {
        &self.doc_return_types
    }

    pub fn start_line(&self) -> usize {
        self.lines.start_line
    }

    pub fn end_line(&self) -> usize {
        self.lines.end_line
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionProperty {
    pub(crate) name: String,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_readonly: bool,
    pub(crate) type_hint: Option<String>,
    pub(crate) is_promoted: bool,
    pub(crate) doc_comment: Option<String>,
}

impl ReflectionProperty {
    /// Name without the leading `$`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_readonly(&self) -> bool {
        self.is_readonly
    }

    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    /// Declared through a constructor parameter.
    pub fn is_promoted(&self) -> bool {
        self.is_promoted
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }
}

/// A class, interface, trait or enum.
#[derive(Debug, Clone)]
pub struct ReflectionClass {
    pub(crate) name: String,
    pub(crate) namespace: Arc<NamespaceContext>,
    pub(crate) kind: ClassKind,
    pub(crate) parent: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) traits: Vec<String>,
    pub(crate) is_final: bool,
    pub(crate) is_abstract: bool,
    pub(crate) backing_type: Option<String>,
    pub(crate) methods: Vec<ReflectionMethod>,
    pub(crate) properties: Vec<ReflectionProperty>,
    pub(crate) constants: Vec<ReflectionClassConstant>,
    pub(crate) enum_cases: Vec<String>,
    pub(crate) doc_comment: Option<String>,
    pub(crate) lines: LineSpan,
    pub(crate) located_source: Arc<LocatedSource>,
    pub(crate) compiled: bool,
}

/// The parts of the four class-like nodes that reflection cares about.
struct ClassShape<'n> {
    short: &'n str,
    kind: ClassKind,
    members: Vec<&'n ClassLikeMember<'n>>,
    parent: Option<&'n str>,
    interfaces: Vec<&'n str>,
    is_final: bool,
    is_abstract: bool,
    backing: Option<Span>,
    span: Span,
}

impl<'n> ClassShape<'n> {
    fn of(node: &DeclarationNode<'n>) -> Result<Self> {
        let shape = match *node {
            DeclarationNode::Class(class) => ClassShape {
                short: class.name.value,
                kind: ClassKind::Class,
                members: class.members.iter().collect(),
                parent: class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first().map(|ident| ident.value())),
                interfaces: class
                    .implements
                    .as_ref()
                    .map(|imp| imp.types.iter().map(|ident| ident.value()).collect())
                    .unwrap_or_default(),
                is_final: class.modifiers.contains_final(),
                is_abstract: class.modifiers.contains_abstract(),
                backing: None,
                span: class.span(),
            },
            DeclarationNode::Interface(iface) => ClassShape {
                short: iface.name.value,
                kind: ClassKind::Interface,
                members: iface.members.iter().collect(),
                parent: None,
                // An interface's `extends` list is what it implements.
                interfaces: iface
                    .extends
                    .as_ref()
                    .map(|ext| ext.types.iter().map(|ident| ident.value()).collect())
                    .unwrap_or_default(),
                is_final: false,
                is_abstract: false,
                backing: None,
                span: iface.span(),
            },
            DeclarationNode::Trait(trait_def) => ClassShape {
                short: trait_def.name.value,
                kind: ClassKind::Trait,
                members: trait_def.members.iter().collect(),
                parent: None,
                interfaces: Vec::new(),
                is_final: false,
                is_abstract: false,
                backing: None,
                span: trait_def.span(),
            },
            DeclarationNode::Enum(enum_def) => ClassShape {
                short: enum_def.name.value,
                kind: ClassKind::Enum,
                members: enum_def.members.iter().collect(),
                parent: None,
                interfaces: enum_def
                    .implements
                    .as_ref()
                    .map(|imp| imp.types.iter().map(|ident| ident.value()).collect())
                    .unwrap_or_default(),
                is_final: true,
                is_abstract: false,
                backing: enum_def.backing_type_hint.as_ref().map(|hint| hint.span()),
                span: enum_def.span(),
            },
            other => {
                return Err(Error::InvalidNodeType {
                    expected: "a class, interface, trait or enum",
                    found: other.kind_name(),
                });
            }
        };
        Ok(shape)
    }
}

fn visibility_of<'a>(modifiers: impl Iterator<Item = &'a Modifier<'a>>) -> Visibility {
    for modifier in modifiers {
        if modifier.is_private() {
            return Visibility::Private;
        }
        if modifier.is_protected() {
            return Visibility::Protected;
        }
        if modifier.is_public() {
            return Visibility::Public;
        }
    }
    Visibility::Public
}

impl ReflectionClass {
    pub(crate) fn from_node(
        reflector: &dyn Reflector,
        node: &DeclarationNode<'_>,
        scope: &NodeScope<'_>,
        mode: BuildMode,
    ) -> Result<Self> {
        let shape = ClassShape::of(node)?;
        let source = scope.source();
        let namespace: &NamespaceContext = scope.namespace;

        let mut class = ReflectionClass {
            name: qualify(namespace.name(), shape.short),
            namespace: Arc::clone(scope.namespace),
            kind: shape.kind,
            parent: shape.parent.map(|name| namespace.resolve_class_name(name)),
            interfaces: shape
                .interfaces
                .iter()
                .map(|name| namespace.resolve_class_name(name))
                .collect(),
            traits: Vec::new(),
            is_final: shape.is_final,
            is_abstract: shape.is_abstract,
            backing_type: shape.backing.map(|span| {
                source
                    .get(span.start.offset as usize..span.end.offset as usize)
                    .unwrap_or("")
                    .trim()
                    .trim_start_matches(':')
                    .trim()
                    .to_string()
            }),
            methods: Vec::new(),
            properties: Vec::new(),
            constants: Vec::new(),
            enum_cases: Vec::new(),
            doc_comment: None,
            lines: LineSpan::from_span(shape.span, scope),
            located_source: Arc::clone(scope.located_source),
            compiled: mode == BuildMode::Compiled,
        };
        if mode == BuildMode::IdentifierOnly {
            return Ok(class);
        }

        class.doc_comment = class_doc_comment(node, scope);

        // Initialisers of this class's own constants, for `self::X`.
        let mut local_constants: HashMap<String, &Expression<'_>> = HashMap::new();
        for member in &shape.members {
            if let ClassLikeMember::Constant(constant) = member {
                for item in constant.items.iter() {
                    local_constants.insert(item.name.value.to_string(), item.value);
                }
            }
        }

        let file_name = scope.located_source.file_name();
        let class_context = CompilerContext::new(reflector, file_name)
            .with_namespace(namespace)
            .with_self_class(&class.name, class.parent.as_deref());
        let class_compiler = CompileNodeToValue::new(&class_context, source, scope.lines)
            .with_local_constants(&local_constants);

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut constants = Vec::new();
        let mut traits = Vec::new();
        let mut enum_cases = Vec::new();

        for member in &shape.members {
            match member {
                ClassLikeMember::Method(method) => {
                    let method_context = class_context.with_function_name(method.name.value);
                    let method_compiler =
                        CompileNodeToValue::new(&method_context, source, scope.lines)
                            .with_local_constants(&local_constants);
                    let doc = get_docblock_text_for_node(scope.trivia, source, method);
                    let parameters =
                        build_parameters(&method.parameter_list, source, Some(&method_compiler));

                    if method.name.value.eq_ignore_ascii_case("__construct") {
                        for (param, reflected) in
                            method.parameter_list.parameters.iter().zip(&parameters)
                        {
                            if reflected.is_promoted {
                                properties.push(ReflectionProperty {
                                    name: reflected.name.clone(),
                                    visibility: visibility_of(param.modifiers.iter()),
                                    is_static: false,
                                    is_readonly: param.modifiers.iter().any(|m| m.is_readonly()),
                                    type_hint: reflected.type_hint.clone(),
                                    is_promoted: true,
                                    doc_comment: None,
                                });
                            }
                        }
                    }

                    methods.push(ReflectionMethod {
                        name: method.name.value.to_string(),
                        visibility: visibility_of(method.modifiers.iter()),
                        is_static: method.modifiers.iter().any(|m| m.is_static()),
                        is_abstract: shape.kind == ClassKind::Interface
                            || method.modifiers.iter().any(|m| m.is_abstract()),
                        is_final: method.modifiers.iter().any(|m| m.is_final()),
                        parameters,
                        return_type: method
                            .return_type_hint
                            .as_ref()
                            .map(|rth| node_text(source, &rth.hint).to_string()),
                        doc_return_types: doc
                            .map(|doc| find_return_type(doc, namespace))
                            .unwrap_or_default(),
                        doc_comment: doc.map(str::to_string),
                        lines: LineSpan::of(method, scope),
                    });
                }
                ClassLikeMember::Property(property) => {
                    let doc = get_docblock_text_for_node(scope.trivia, source, *member)
                        .map(str::to_string);
                    let visibility = visibility_of(property.modifiers().iter());
                    let is_static = property.modifiers().iter().any(|m| m.is_static());
                    let is_readonly = property.modifiers().iter().any(|m| m.is_readonly());
                    let type_hint = property.hint().map(|hint| node_text(source, hint).to_string());
                    for variable in property.variables().iter() {
                        let raw = variable.name;
                        properties.push(ReflectionProperty {
                            name: raw.strip_prefix('$').unwrap_or(raw).to_string(),
                            visibility,
                            is_static,
                            is_readonly,
                            type_hint: type_hint.clone(),
                            is_promoted: false,
                            doc_comment: doc.clone(),
                        });
                    }
                }
                ClassLikeMember::Constant(constant) => {
                    let doc = get_docblock_text_for_node(scope.trivia, source, *member)
                        .map(str::to_string);
                    let visibility = visibility_of(constant.modifiers.iter());
                    let is_final = constant.modifiers.iter().any(|m| m.is_final());
                    for item in constant.items.iter() {
                        constants.push(ReflectionClassConstant {
                            name: item.name.value.to_string(),
                            value: class_compiler.compile(item.value)?,
                            visibility,
                            is_final,
                            doc_comment: doc.clone(),
                        });
                    }
                }
                ClassLikeMember::EnumCase(enum_case) => {
                    enum_cases.push(enum_case.item.name().value.to_string());
                }
                ClassLikeMember::TraitUse(trait_use) => {
                    traits.extend(
                        trait_use
                            .trait_names
                            .iter()
                            .map(|ident| namespace.resolve_class_name(ident.value())),
                    );
                }
            }
        }

        class.methods = methods;
        class.properties = properties;
        class.constants = constants;
        class.traits = traits;
        class.enum_cases = enum_cases;
        Ok(class)
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

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn parent_class_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Directly declared interfaces, fully qualified.
    pub fn interface_names(&self) -> &[String] {
        &self.interfaces
    }

    pub fn trait_names(&self) -> &[String] {
        &self.traits
    }

    /// The `int`/`string` backing type of a backed enum.
    pub fn backing_type(&self) -> Option<&str> {
        self.backing_type.as_deref()
    }

    pub fn methods(&self) -> &[ReflectionMethod] {
        &self.methods
    }

    /// Method names are case-insensitive.
    pub fn method(&self, name: &str) -> Option<&ReflectionMethod> {
        self.methods
            .iter()
            .find(|method| method.name.eq_ignore_ascii_case(name))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    pub fn properties(&self) -> &[ReflectionProperty] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&ReflectionProperty> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn constants(&self) -> &[ReflectionClassConstant] {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<&ReflectionClassConstant> {
        self.constants.iter().find(|constant| constant.name == name)
    }

    pub fn enum_case_names(&self) -> &[String] {
        &self.enum_cases
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
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

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// The context this class's constant expressions are compiled in.
    pub fn compiler_context<'a>(&'a self, reflector: &'a dyn Reflector) -> CompilerContext<'a> {
        CompilerContext::new(reflector, self.file_name())
            .with_namespace(&self.namespace)
            .with_self_class(&self.name, self.parent.as_deref())
    }
}

fn class_doc_comment(node: &DeclarationNode<'_>, scope: &NodeScope<'_>) -> Option<String> {
    let source = scope.source();
    let doc = match *node {
        DeclarationNode::Class(class) => get_docblock_text_for_node(scope.trivia, source, class),
        DeclarationNode::Interface(iface) => {
            get_docblock_text_for_node(scope.trivia, source, iface)
        }
        DeclarationNode::Trait(trait_def) => {
            get_docblock_text_for_node(scope.trivia, source, trait_def)
        }
        DeclarationNode::Enum(enum_def) => {
            get_docblock_text_for_node(scope.trivia, source, enum_def)
        }
        _ => None,
    };
    doc.map(str::to_string)
}
