/// Syntax-tree walkers that find declarations.
///
/// Declarations are searched where PHP allows them to be declared
/// unconditionally or conditionally at file level: the top level,
/// namespace bodies, `{ }` blocks and `if` branches. Closures are searched
/// everywhere, including inside other closures and method bodies.
use std::sync::Arc;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::sequence::TokenSeparatedSequence;
use mago_syntax::ast::*;

use crate::ast::namespace::NamespaceContext;
use crate::identifier::IdentifierType;
use crate::util::qualify;

/// A syntax node that can become a reflection.
#[derive(Clone, Copy)]
pub enum DeclarationNode<'a> {
    Class(&'a Class<'a>),
    Interface(&'a Interface<'a>),
    Trait(&'a Trait<'a>),
    Enum(&'a Enum<'a>),
    Function(&'a Function<'a>),
    Closure(&'a Closure<'a>),
    ArrowFunction(&'a ArrowFunction<'a>),
    /// One item of a `const A = 1, B = 2;` statement, with the statement.
    Constant(&'a Constant<'a>, &'a ConstantItem<'a>),
    /// A `define('NAME', value)` call.
    Define(&'a FunctionCall<'a>),
}

impl<'a> DeclarationNode<'a> {
    /// Human-readable node kind, used in contract-violation errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclarationNode::Class(_) => "class",
            DeclarationNode::Interface(_) => "interface",
            DeclarationNode::Trait(_) => "trait",
            DeclarationNode::Enum(_) => "enum",
            DeclarationNode::Function(_) => "function",
            DeclarationNode::Closure(_) => "closure",
            DeclarationNode::ArrowFunction(_) => "arrow function",
            DeclarationNode::Constant(..) => "const statement",
            DeclarationNode::Define(_) => "define() call",
        }
    }

    pub fn identifier_type(&self) -> IdentifierType {
        match self {
            DeclarationNode::Class(_)
            | DeclarationNode::Interface(_)
            | DeclarationNode::Trait(_)
            | DeclarationNode::Enum(_) => IdentifierType::Class,
            DeclarationNode::Function(_)
            | DeclarationNode::Closure(_)
            | DeclarationNode::ArrowFunction(_) => IdentifierType::Function,
            DeclarationNode::Constant(..) | DeclarationNode::Define(_) => IdentifierType::Constant,
        }
    }

    /// The short name as declared. Closures are all named `{closure}`.
    /// `None` for a `define()` whose name is not a string literal.
    pub fn declared_name(&self) -> Option<&'a str> {
        match self {
            DeclarationNode::Class(class) => Some(class.name.value),
            DeclarationNode::Interface(iface) => Some(iface.name.value),
            DeclarationNode::Trait(trait_def) => Some(trait_def.name.value),
            DeclarationNode::Enum(enum_def) => Some(enum_def.name.value),
            DeclarationNode::Function(function) => Some(function.name.value),
            DeclarationNode::Closure(_) | DeclarationNode::ArrowFunction(_) => Some("{closure}"),
            DeclarationNode::Constant(_, item) => Some(item.name.value),
            DeclarationNode::Define(call) => define_name(call),
        }
    }
}

impl HasSpan for DeclarationNode<'_> {
    /// The whole declaration. A `const` item spans its statement so the
    /// statement's docblock and attributes are in front of it.
    fn span(&self) -> Span {
        match self {
            DeclarationNode::Class(class) => class.span(),
            DeclarationNode::Interface(iface) => iface.span(),
            DeclarationNode::Trait(trait_def) => trait_def.span(),
            DeclarationNode::Enum(enum_def) => enum_def.span(),
            DeclarationNode::Function(function) => function.span(),
            DeclarationNode::Closure(closure) => closure.span(),
            DeclarationNode::ArrowFunction(arrow) => arrow.span(),
            DeclarationNode::Constant(statement, _) => statement.span(),
            DeclarationNode::Define(call) => call.span(),
        }
    }
}

/// A declaration found in a file, with the namespace it was declared in.
#[derive(Clone)]
pub struct Declaration<'a> {
    pub node: DeclarationNode<'a>,
    pub namespace: Arc<NamespaceContext>,
}

impl<'a> Declaration<'a> {
    /// Fully-qualified name without a leading `\`.
    ///
    /// `define()` names are always global: `define('Foo\\BAR', 1)` inside
    /// any namespace declares `Foo\BAR`.
    pub fn qualified_name(&self) -> Option<String> {
        let name = self.node.declared_name()?;
        match self.node {
            DeclarationNode::Define(_) => Some(name.trim_start_matches('\\').to_string()),
            _ => Some(qualify(self.namespace.name(), name)),
        }
    }
}

/// Collect declarations of `kind` in source order.
pub fn collect_declarations<'a>(
    program: &'a Program<'a>,
    kind: IdentifierType,
) -> Vec<Declaration<'a>> {
    let global = Arc::new(NamespaceContext::from_statements(
        None,
        program.statements.iter(),
    ));
    let mut declarations = Vec::new();
    walk_statements(program.statements.iter(), &global, kind, &mut declarations);
    declarations
}

fn walk_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    namespace: &Arc<NamespaceContext>,
    kind: IdentifierType,
    out: &mut Vec<Declaration<'a>>,
) {
    let push = |out: &mut Vec<Declaration<'a>>, node: DeclarationNode<'a>| {
        out.push(Declaration {
            node,
            namespace: Arc::clone(namespace),
        });
    };

    for statement in statements {
        match statement {
            Statement::Namespace(ns) => {
                let name = ns.name.as_ref().map(|ident| ident.value().to_string());
                let inner = Arc::new(NamespaceContext::from_statements(
                    name,
                    ns.statements().iter(),
                ));
                walk_statements(ns.statements().iter(), &inner, kind, out);
            }
            Statement::Class(class) if kind.is_class() => push(out, DeclarationNode::Class(class)),
            Statement::Interface(iface) if kind.is_class() => {
                push(out, DeclarationNode::Interface(iface))
            }
            Statement::Trait(trait_def) if kind.is_class() => {
                push(out, DeclarationNode::Trait(trait_def))
            }
            Statement::Enum(enum_def) if kind.is_class() => {
                push(out, DeclarationNode::Enum(enum_def))
            }
            Statement::Function(function) if kind.is_function() => {
                push(out, DeclarationNode::Function(function))
            }
            Statement::Constant(constant) if kind.is_constant() => {
                for item in constant.items.iter() {
                    push(out, DeclarationNode::Constant(constant, item));
                }
            }
            Statement::Expression(expr_stmt) if kind.is_constant() => {
                if let Some(call) = as_define_call(expr_stmt.expression)
                    && define_name(call).is_some()
                {
                    push(out, DeclarationNode::Define(call));
                }
            }
            Statement::Block(block) => {
                walk_statements(block.statements.iter(), namespace, kind, out);
            }
            Statement::If(if_stmt) => walk_if_body(&if_stmt.body, namespace, kind, out),
            _ => {}
        }
    }
}

fn walk_if_body<'a>(
    body: &'a IfBody<'a>,
    namespace: &Arc<NamespaceContext>,
    kind: IdentifierType,
    out: &mut Vec<Declaration<'a>>,
) {
    match body {
        IfBody::Statement(body) => {
            walk_statements(std::iter::once(body.statement), namespace, kind, out);
            for else_if in body.else_if_clauses.iter() {
                walk_statements(std::iter::once(else_if.statement), namespace, kind, out);
            }
            if let Some(else_clause) = &body.else_clause {
                walk_statements(std::iter::once(else_clause.statement), namespace, kind, out);
            }
        }
        IfBody::ColonDelimited(body) => {
            walk_statements(body.statements.iter(), namespace, kind, out);
            for else_if in body.else_if_clauses.iter() {
                walk_statements(else_if.statements.iter(), namespace, kind, out);
            }
            if let Some(else_clause) = &body.else_clause {
                walk_statements(else_clause.statements.iter(), namespace, kind, out);
            }
        }
    }
}

/// Match `define(...)` calls, case-insensitively and with or without a
/// leading `\`.
fn as_define_call<'a>(expr: &'a Expression<'a>) -> Option<&'a FunctionCall<'a>> {
    if let Expression::Call(Call::Function(func_call)) = expr
        && let Expression::Identifier(ident) = func_call.function
        && ident
            .value()
            .trim_start_matches('\\')
            .eq_ignore_ascii_case("define")
    {
        return Some(func_call);
    }
    None
}

/// The string-literal first argument of a `define()` call.
pub(crate) fn define_name<'a>(call: &'a FunctionCall<'a>) -> Option<&'a str> {
    let first = call.argument_list.arguments.iter().next()?;
    let first_expr = match first {
        Argument::Positional(pos) => pos.value,
        Argument::Named(named) => named.value,
    };
    if let Expression::Literal(Literal::String(lit_str)) = first_expr
        && let Some(value) = lit_str.value
        && !value.is_empty()
    {
        return Some(value);
    }
    None
}

/// The value argument of a `define()` call.
pub(crate) fn define_value<'a>(call: &'a FunctionCall<'a>) -> Option<&'a Expression<'a>> {
    match call.argument_list.arguments.iter().nth(1)? {
        Argument::Positional(pos) => Some(pos.value),
        Argument::Named(named) => Some(named.value),
    }
}

/// Collect every closure and arrow function in the file, with the
/// namespace each one appears in.
pub fn collect_closures<'a>(program: &'a Program<'a>) -> Vec<Declaration<'a>> {
    let global = Arc::new(NamespaceContext::from_statements(
        None,
        program.statements.iter(),
    ));
    let mut collector = ClosureCollector {
        namespace: global,
        found: Vec::new(),
    };
    collector.statements(program.statements.iter());
    collector.found
}

struct ClosureCollector<'a> {
    namespace: Arc<NamespaceContext>,
    found: Vec<Declaration<'a>>,
}

impl<'a> ClosureCollector<'a> {
    fn statements(&mut self, statements: impl Iterator<Item = &'a Statement<'a>>) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &'a Statement<'a>) {
        match statement {
            Statement::Namespace(ns) => {
                let name = ns.name.as_ref().map(|ident| ident.value().to_string());
                let inner = Arc::new(NamespaceContext::from_statements(
                    name,
                    ns.statements().iter(),
                ));
                let outer = std::mem::replace(&mut self.namespace, inner);
                self.statements(ns.statements().iter());
                self.namespace = outer;
            }
            Statement::Expression(expr_stmt) => self.expression(expr_stmt.expression),
            Statement::Return(ret) => {
                if let Some(value) = ret.value {
                    self.expression(value);
                }
            }
            Statement::Echo(echo) => {
                for value in echo.values.iter() {
                    self.expression(value);
                }
            }
            Statement::Block(block) => self.statements(block.statements.iter()),
            Statement::If(if_stmt) => {
                self.expression(if_stmt.condition);
                match &if_stmt.body {
                    IfBody::Statement(body) => {
                        self.statement(body.statement);
                        for else_if in body.else_if_clauses.iter() {
                            self.expression(else_if.condition);
                            self.statement(else_if.statement);
                        }
                        if let Some(else_clause) = &body.else_clause {
                            self.statement(else_clause.statement);
                        }
                    }
                    IfBody::ColonDelimited(body) => {
                        self.statements(body.statements.iter());
                        for else_if in body.else_if_clauses.iter() {
                            self.expression(else_if.condition);
                            self.statements(else_if.statements.iter());
                        }
                        if let Some(else_clause) = &body.else_clause {
                            self.statements(else_clause.statements.iter());
                        }
                    }
                }
            }
            Statement::Foreach(foreach) => {
                self.expression(foreach.expression);
                match &foreach.body {
                    ForeachBody::Statement(inner) => self.statement(inner),
                    ForeachBody::ColonDelimited(body) => self.statements(body.statements.iter()),
                }
            }
            Statement::While(while_stmt) => {
                self.expression(while_stmt.condition);
                match &while_stmt.body {
                    WhileBody::Statement(inner) => self.statement(inner),
                    WhileBody::ColonDelimited(body) => self.statements(body.statements.iter()),
                }
            }
            Statement::For(for_stmt) => {
                for expr in for_stmt
                    .initializations
                    .iter()
                    .chain(for_stmt.conditions.iter())
                    .chain(for_stmt.increments.iter())
                {
                    self.expression(expr);
                }
                match &for_stmt.body {
                    ForBody::Statement(inner) => self.statement(inner),
                    ForBody::ColonDelimited(body) => self.statements(body.statements.iter()),
                }
            }
            Statement::DoWhile(dw) => {
                self.statement(dw.statement);
                self.expression(dw.condition);
            }
            Statement::Declare(declare) => match &declare.body {
                DeclareBody::Statement(inner) => self.statement(inner),
                DeclareBody::ColonDelimited(body) => self.statements(body.statements.iter()),
            },
            Statement::Try(try_stmt) => {
                self.statements(try_stmt.block.statements.iter());
                for catch in try_stmt.catch_clauses.iter() {
                    self.statements(catch.block.statements.iter());
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.statements(finally.block.statements.iter());
                }
            }
            Statement::Switch(switch) => {
                self.expression(switch.expression);
                match &switch.body {
                    SwitchBody::BraceDelimited(body) => {
                        for case in body.cases.iter() {
                            self.statements(case.statements().iter());
                        }
                    }
                    SwitchBody::ColonDelimited(body) => {
                        for case in body.cases.iter() {
                            self.statements(case.statements().iter());
                        }
                    }
                }
            }
            Statement::Function(function) => self.statements(function.body.statements.iter()),
            Statement::Class(class) => self.members(class.members.iter()),
            Statement::Trait(trait_def) => self.members(trait_def.members.iter()),
            Statement::Enum(enum_def) => self.members(enum_def.members.iter()),
            Statement::Interface(iface) => self.members(iface.members.iter()),
            _ => {}
        }
    }

    fn members(&mut self, members: impl Iterator<Item = &'a ClassLikeMember<'a>>) {
        for member in members {
            if let ClassLikeMember::Method(method) = member
                && let MethodBody::Concrete(block) = &method.body
            {
                self.statements(block.statements.iter());
            }
        }
    }

    fn push(&mut self, node: DeclarationNode<'a>) {
        self.found.push(Declaration {
            node,
            namespace: Arc::clone(&self.namespace),
        });
    }

    fn arguments(&mut self, arguments: &'a TokenSeparatedSequence<'a, Argument<'a>>) {
        for arg in arguments.iter() {
            match arg {
                Argument::Positional(pos) => self.expression(pos.value),
                Argument::Named(named) => self.expression(named.value),
            }
        }
    }

    fn array_elements(&mut self, elements: &'a TokenSeparatedSequence<'a, ArrayElement<'a>>) {
        for element in elements.iter() {
            match element {
                ArrayElement::KeyValue(kv) => {
                    self.expression(kv.key);
                    self.expression(kv.value);
                }
                ArrayElement::Value(v) => self.expression(v.value),
                ArrayElement::Variadic(v) => self.expression(v.value),
                ArrayElement::Missing(_) => {}
            }
        }
    }

    fn expression(&mut self, expr: &'a Expression<'a>) {
        match expr {
            Expression::Closure(closure) => {
                self.push(DeclarationNode::Closure(closure));
                self.statements(closure.body.statements.iter());
            }
            Expression::ArrowFunction(arrow) => {
                self.push(DeclarationNode::ArrowFunction(arrow));
                self.expression(arrow.expression);
            }
            Expression::Parenthesized(p) => self.expression(p.expression),
            Expression::Assignment(a) => {
                self.expression(a.lhs);
                self.expression(a.rhs);
            }
            Expression::Binary(bin) => {
                self.expression(bin.lhs);
                self.expression(bin.rhs);
            }
            Expression::Conditional(cond) => {
                self.expression(cond.condition);
                if let Some(then) = cond.then {
                    self.expression(then);
                }
                self.expression(cond.r#else);
            }
            Expression::Call(call) => match call {
                Call::Function(fc) => {
                    self.expression(fc.function);
                    self.arguments(&fc.argument_list.arguments);
                }
                Call::Method(mc) => {
                    self.expression(mc.object);
                    self.arguments(&mc.argument_list.arguments);
                }
                Call::NullSafeMethod(mc) => {
                    self.expression(mc.object);
                    self.arguments(&mc.argument_list.arguments);
                }
                Call::StaticMethod(sc) => {
                    self.expression(sc.class);
                    self.arguments(&sc.argument_list.arguments);
                }
            },
            Expression::Array(arr) => self.array_elements(&arr.elements),
            Expression::LegacyArray(arr) => self.array_elements(&arr.elements),
            Expression::Match(m) => {
                self.expression(m.expression);
                for arm in m.arms.iter() {
                    if let MatchArm::Expression(arm) = arm {
                        for condition in arm.conditions.iter() {
                            self.expression(condition);
                        }
                    }
                    self.expression(arm.expression());
                }
            }
            Expression::Access(access) => match access {
                Access::Property(pa) => self.expression(pa.object),
                Access::NullSafeProperty(pa) => self.expression(pa.object),
                Access::StaticProperty(pa) => self.expression(pa.class),
                Access::ClassConstant(pa) => self.expression(pa.class),
            },
            Expression::Instantiation(inst) => {
                if let Some(args) = &inst.argument_list {
                    self.arguments(&args.arguments);
                }
            }
            Expression::AnonymousClass(class) => {
                if let Some(args) = &class.argument_list {
                    self.arguments(&args.arguments);
                }
                self.members(class.members.iter());
            }
            Expression::Construct(construct) => match construct {
                Construct::Isset(isset) => {
                    for value in isset.values.iter() {
                        self.expression(value);
                    }
                }
                Construct::Empty(c) => self.expression(c.value),
                Construct::Eval(c) => self.expression(c.value),
                Construct::Include(c) => self.expression(c.value),
                Construct::IncludeOnce(c) => self.expression(c.value),
                Construct::Require(c) => self.expression(c.value),
                Construct::RequireOnce(c) => self.expression(c.value),
                Construct::Print(c) => self.expression(c.value),
                Construct::Exit(c) => {
                    if let Some(args) = &c.arguments {
                        self.arguments(&args.arguments);
                    }
                }
                Construct::Die(c) => {
                    if let Some(args) = &c.arguments {
                        self.arguments(&args.arguments);
                    }
                }
            },
            Expression::UnaryPrefix(u) => self.expression(u.operand),
            Expression::UnaryPostfix(u) => self.expression(u.operand),
            Expression::Yield(y) => match y {
                Yield::Value(yv) => {
                    if let Some(value) = yv.value {
                        self.expression(value);
                    }
                }
                Yield::Pair(yp) => {
                    self.expression(yp.key);
                    self.expression(yp.value);
                }
                Yield::From(yf) => self.expression(yf.iterator),
            },
            Expression::Throw(t) => self.expression(t.exception),
            Expression::Clone(c) => self.expression(c.object),
            Expression::Pipe(p) => {
                self.expression(p.input);
                self.expression(p.callable);
            }
            _ => {}
        }
    }
}
