/// Compile-time evaluation of constant expressions.
///
/// PHP only allows a restricted expression language in constant
/// initialisers and parameter defaults: literals, arrays, arithmetic,
/// string concatenation, comparisons, ternaries, magic constants and
/// references to other constants. [`CompileNodeToValue`] evaluates what it
/// can from the syntax tree alone; references to other classes' constants
/// and to global constants are kept symbolic for the reflectors to resolve.
use std::collections::HashMap;
use std::fmt;

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::ast::namespace::NamespaceContext;
use crate::error::{Error, Result};
use crate::reflector::Reflector;
use crate::util::LineIndex;

/// Context a node is compiled in. Created per compiled node.
#[derive(Clone, Copy)]
pub struct CompilerContext<'a> {
    reflector: &'a dyn Reflector,
    file_name: Option<&'a str>,
    self_class: Option<&'a str>,
    parent_class: Option<&'a str>,
    namespace: Option<&'a NamespaceContext>,
    function_name: Option<&'a str>,
}

impl<'a> CompilerContext<'a> {
    pub fn new(reflector: &'a dyn Reflector, file_name: Option<&'a str>) -> Self {
        CompilerContext {
            reflector,
            file_name,
            self_class: None,
            parent_class: None,
            namespace: None,
            function_name: None,
        }
    }

    pub fn with_self_class(mut self, self_class: &'a str, parent_class: Option<&'a str>) -> Self {
        self.self_class = Some(self_class);
        self.parent_class = parent_class;
        self
    }

    pub fn with_namespace(mut self, namespace: &'a NamespaceContext) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn with_function_name(mut self, function_name: &'a str) -> Self {
        self.function_name = Some(function_name);
        self
    }

    pub fn reflector(&self) -> &'a dyn Reflector {
        self.reflector
    }

    pub fn has_self(&self) -> bool {
        self.self_class.is_some()
    }

    /// The enclosing class, i.e. what `self` refers to.
    pub fn self_class(&self) -> Result<&'a str> {
        self.self_class.ok_or(Error::NoSelf)
    }

    pub fn parent_class(&self) -> Option<&'a str> {
        self.parent_class
    }

    pub fn has_file_name(&self) -> bool {
        self.file_name.is_some()
    }

    pub fn file_name(&self) -> Result<&'a str> {
        self.file_name.ok_or(Error::NoFileName)
    }

    pub fn namespace_name(&self) -> Option<&'a str> {
        self.namespace.and_then(|ns| ns.name())
    }

    pub fn function_name(&self) -> Option<&'a str> {
        self.function_name
    }

    fn resolve_class_name(&self, name: &str) -> String {
        match self.namespace {
            Some(ns) => ns.resolve_class_name(name),
            None => name.trim_start_matches('\\').to_string(),
        }
    }

    fn resolve_constant_name(&self, name: &str) -> String {
        match self.namespace {
            Some(ns) if name.contains('\\') || name.starts_with('\\') => {
                ns.resolve_constant_name(name)
            }
            // Unqualified constants fall back to the global one at runtime,
            // so keep the name unqualified.
            _ => name.trim_start_matches('\\').to_string(),
        }
    }
}

/// A value computed from a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key → value pairs.
    Array(Vec<(CompiledValue, CompiledValue)>),
    /// `Foo::BAR` where `Foo` is another class.
    ClassConstantRef { class: String, constant: String },
    /// A reference to a global constant such as `PHP_EOL`.
    ConstantRef(String),
    /// An expression that cannot be evaluated statically, as written.
    Unresolved(String),
}

impl CompiledValue {
    /// Name PHP's `gettype()` would report.
    pub fn php_type_name(&self) -> &'static str {
        match self {
            CompiledValue::Null => "NULL",
            CompiledValue::Bool(_) => "boolean",
            CompiledValue::Int(_) => "integer",
            CompiledValue::Float(_) => "double",
            CompiledValue::String(_) => "string",
            CompiledValue::Array(_) => "array",
            CompiledValue::ClassConstantRef { .. }
            | CompiledValue::ConstantRef(_)
            | CompiledValue::Unresolved(_) => "unknown type",
        }
    }

    /// Whether the value is fully known.
    pub fn is_resolved(&self) -> bool {
        match self {
            CompiledValue::ClassConstantRef { .. }
            | CompiledValue::ConstantRef(_)
            | CompiledValue::Unresolved(_) => false,
            CompiledValue::Array(items) => items
                .iter()
                .all(|(key, value)| key.is_resolved() && value.is_resolved()),
            _ => true,
        }
    }

    fn truthy(&self) -> Option<bool> {
        Some(match self {
            CompiledValue::Null => false,
            CompiledValue::Bool(b) => *b,
            CompiledValue::Int(i) => *i != 0,
            CompiledValue::Float(f) => *f != 0.0,
            CompiledValue::String(s) => !(s.is_empty() || s == "0"),
            CompiledValue::Array(items) => !items.is_empty(),
            _ => return None,
        })
    }

    /// PHP's string conversion, as used by `echo` and string casts.
    pub fn to_php_string(&self) -> String {
        match self {
            CompiledValue::Null => String::new(),
            CompiledValue::Bool(true) => "1".to_string(),
            CompiledValue::Bool(false) => String::new(),
            CompiledValue::Int(i) => i.to_string(),
            CompiledValue::Float(f) => format_float(*f),
            CompiledValue::String(s) => s.clone(),
            CompiledValue::Array(_) => "Array".to_string(),
            CompiledValue::ClassConstantRef { class, constant } => {
                format!("\\{}::{}", class, constant)
            }
            CompiledValue::ConstantRef(name) => name.clone(),
            CompiledValue::Unresolved(text) => text.clone(),
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            CompiledValue::Null => Some(Number::Int(0)),
            CompiledValue::Bool(b) => Some(Number::Int(*b as i64)),
            CompiledValue::Int(i) => Some(Number::Int(*i)),
            CompiledValue::Float(f) => Some(Number::Float(*f)),
            CompiledValue::String(s) => numeric_string(s, true),
            _ => None,
        }
    }

    /// Like `as_number`, but strings must be numeric in full. Comparisons
    /// treat `"12abc"` as a string, arithmetic reads its leading `12`.
    fn as_comparable_number(&self) -> Option<Number> {
        match self {
            CompiledValue::String(s) => numeric_string(s, false),
            other => other.as_number(),
        }
    }
}

/// `var_export`-style rendering.
impl fmt::Display for CompiledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledValue::Null => f.write_str("null"),
            CompiledValue::Bool(b) => write!(f, "{}", b),
            CompiledValue::Int(i) => write!(f, "{}", i),
            CompiledValue::Float(x) => f.write_str(&format_float(*x)),
            CompiledValue::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            CompiledValue::Array(items) => {
                f.write_str("[")?;
                for (i, (key, value)) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} => {}", key, value)?;
                }
                f.write_str("]")
            }
            CompiledValue::ClassConstantRef { class, constant } => {
                write!(f, "\\{}::{}", class, constant)
            }
            CompiledValue::ConstantRef(name) => f.write_str(name),
            CompiledValue::Unresolved(text) => f.write_str(text),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn into_value(self) -> CompiledValue {
        match self {
            Number::Int(i) => CompiledValue::Int(i),
            Number::Float(f) => CompiledValue::Float(f),
        }
    }
}

/// Parse a PHP numeric literal: decimal, hex, octal, binary, float, with
/// `_` separators.
fn parse_number(text: &str) -> Option<Number> {
    let cleaned = text.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok().map(Number::Int)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok().map(Number::Int)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok().map(Number::Int)
    } else if lower.len() > 1 && lower.starts_with('0') && lower.bytes().all(|b| b.is_ascii_digit()) {
        i64::from_str_radix(&lower[1..], 8).ok().map(Number::Int)
    } else if let Ok(int) = lower.parse::<i64>() {
        Some(Number::Int(int))
    } else if lower.bytes().any(|b| b.is_ascii_digit()) {
        lower.parse::<f64>().ok().map(Number::Float)
    } else {
        None
    };
    parsed
}

/// Read a string operand as a number. Only decimal notation counts:
/// `"0x1A"` and `"010"` are not hex or octal here. Leading whitespace and
/// trailing whitespace are allowed; other trailing text only when
/// `allow_trailing` is set.
fn numeric_string(text: &str, allow_trailing: bool) -> Option<Number> {
    const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0b', '\x0c'];
    let text = text.trim_start_matches(WHITESPACE);
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    let mut is_float = false;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            is_float = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            is_float = true;
            end = exp_end;
        }
    }
    if !allow_trailing && !text[end..].trim_end_matches(WHITESPACE).is_empty() {
        return None;
    }

    let number = &text[..end];
    if !is_float && let Ok(int) = number.parse::<i64>() {
        return Some(Number::Int(int));
    }
    number.parse::<f64>().ok().map(Number::Float)
}

fn is_constant_name(text: &str) -> bool {
    let name = text.trim_start_matches('\\');
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .split('\\')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// How deep `self::X` chains are followed before giving up.
const MAX_SELF_DEPTH: usize = 32;

/// Evaluates constant expressions in a [`CompilerContext`].
pub struct CompileNodeToValue<'c, 'a> {
    context: &'c CompilerContext<'c>,
    source: &'c str,
    lines: &'c LineIndex,
    /// Constant initialisers of the class being compiled, for `self::X`.
    local_constants: Option<&'c HashMap<String, &'a Expression<'a>>>,
}

impl<'c, 'a> CompileNodeToValue<'c, 'a> {
    pub fn new(context: &'c CompilerContext<'c>, source: &'c str, lines: &'c LineIndex) -> Self {
        CompileNodeToValue {
            context,
            source,
            lines,
            local_constants: None,
        }
    }

    pub fn with_local_constants(
        mut self,
        local_constants: &'c HashMap<String, &'a Expression<'a>>,
    ) -> Self {
        self.local_constants = Some(local_constants);
        self
    }

    pub fn compile(&self, expr: &Expression<'_>) -> Result<CompiledValue> {
        self.compile_at_depth(expr, 0)
    }

    fn text(&self, node: &impl HasSpan) -> &'c str {
        let span = node.span();
        self.source
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
            .trim()
    }

    fn compile_at_depth(&self, expr: &Expression<'_>, depth: usize) -> Result<CompiledValue> {
        match expr {
            Expression::Parenthesized(p) => self.compile_at_depth(p.expression, depth),
            Expression::Literal(Literal::String(lit)) => Ok(match lit.value {
                Some(value) => CompiledValue::String(value.to_string()),
                None => CompiledValue::Unresolved(self.text(expr).to_string()),
            }),
            Expression::Array(arr) => self.compile_array(expr, arr.elements.iter(), depth),
            Expression::LegacyArray(arr) => self.compile_array(expr, arr.elements.iter(), depth),
            Expression::UnaryPrefix(u) => {
                let operand = self.compile_at_depth(u.operand, depth)?;
                Ok(self.unary(self.text(&u.operator), operand, expr))
            }
            Expression::Binary(bin) => {
                let lhs = self.compile_at_depth(bin.lhs, depth)?;
                let op = self.text(&bin.operator);
                // Short-circuit forms only evaluate what PHP would.
                if op == "??" && lhs != CompiledValue::Null && lhs.is_resolved() {
                    return Ok(lhs);
                }
                let rhs = self.compile_at_depth(bin.rhs, depth)?;
                Ok(self.binary(op, lhs, rhs, expr))
            }
            Expression::Conditional(cond) => {
                let condition = self.compile_at_depth(cond.condition, depth)?;
                match condition.truthy() {
                    Some(true) => match cond.then {
                        Some(then) => self.compile_at_depth(then, depth),
                        None => Ok(condition),
                    },
                    Some(false) => self.compile_at_depth(cond.r#else, depth),
                    None => Ok(CompiledValue::Unresolved(self.text(expr).to_string())),
                }
            }
            Expression::Access(Access::ClassConstant(access)) => {
                let class = self.text(access.class);
                let constant = self.text(&access.constant);
                self.class_constant(class, constant, depth)
            }
            _ => self.compile_text(expr),
        }
    }

    fn compile_array<'e>(
        &self,
        expr: &Expression<'_>,
        elements: impl Iterator<Item = &'e ArrayElement<'e>>,
        depth: usize,
    ) -> Result<CompiledValue> {
        let mut items: Vec<(CompiledValue, CompiledValue)> = Vec::new();
        // `None` once PHP_INT_MAX has been used as a key: appending is an error.
        let mut next_index: Option<i64> = Some(0);
        let mut push = |items: &mut Vec<(CompiledValue, CompiledValue)>,
                        key: Option<CompiledValue>,
                        value: CompiledValue|
         -> bool {
            let key = match key {
                Some(CompiledValue::Int(i)) => {
                    next_index = match (next_index, i.checked_add(1)) {
                        (Some(current), Some(next)) => Some(current.max(next)),
                        _ => None,
                    };
                    CompiledValue::Int(i)
                }
                Some(key) => key,
                None => {
                    let Some(index) = next_index else {
                        return false;
                    };
                    next_index = index.checked_add(1);
                    CompiledValue::Int(index)
                }
            };
            match items.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => items.push((key, value)),
            }
            true
        };

        let mut appended = true;
        for element in elements {
            match element {
                ArrayElement::KeyValue(kv) => {
                    let key = self.compile_at_depth(kv.key, depth)?;
                    let value = self.compile_at_depth(kv.value, depth)?;
                    appended &= push(&mut items, Some(key), value);
                }
                ArrayElement::Value(v) => {
                    let value = self.compile_at_depth(v.value, depth)?;
                    appended &= push(&mut items, None, value);
                }
                ArrayElement::Variadic(v) => match self.compile_at_depth(v.value, depth)? {
                    CompiledValue::Array(spread) => {
                        for (key, value) in spread {
                            appended &= match key {
                                CompiledValue::Int(_) => push(&mut items, None, value),
                                key => push(&mut items, Some(key), value),
                            };
                        }
                    }
                    other => appended &= push(&mut items, None, other),
                },
                ArrayElement::Missing(_) => {}
            }
        }
        if !appended {
            return Ok(CompiledValue::Unresolved(self.text(expr).to_string()));
        }
        Ok(CompiledValue::Array(items))
    }

    fn unary(&self, op: &str, operand: CompiledValue, expr: &Expression<'_>) -> CompiledValue {
        let unresolved = || CompiledValue::Unresolved(self.text(expr).to_string());
        if !operand.is_resolved() {
            return unresolved();
        }
        match op {
            "!" => operand
                .truthy()
                .map(|b| CompiledValue::Bool(!b))
                .unwrap_or_else(unresolved),
            "-" => match operand.as_number() {
                Some(Number::Int(i)) => i
                    .checked_neg()
                    .map(CompiledValue::Int)
                    .unwrap_or(CompiledValue::Float(-(i as f64))),
                Some(Number::Float(f)) => CompiledValue::Float(-f),
                None => unresolved(),
            },
            "+" => operand
                .as_number()
                .map(Number::into_value)
                .unwrap_or_else(unresolved),
            "~" => match operand.as_number() {
                Some(Number::Int(i)) => CompiledValue::Int(!i),
                _ => unresolved(),
            },
            _ => unresolved(),
        }
    }

    fn binary(
        &self,
        op: &str,
        lhs: CompiledValue,
        rhs: CompiledValue,
        expr: &Expression<'_>,
    ) -> CompiledValue {
        let unresolved = || CompiledValue::Unresolved(self.text(expr).to_string());
        if !lhs.is_resolved() || !rhs.is_resolved() {
            return unresolved();
        }

        let op_lower = op.to_ascii_lowercase();
        match op_lower.as_str() {
            "." => CompiledValue::String(lhs.to_php_string() + &rhs.to_php_string()),
            "??" => {
                if lhs == CompiledValue::Null {
                    rhs
                } else {
                    lhs
                }
            }
            "&&" | "and" | "||" | "or" | "xor" => match (lhs.truthy(), rhs.truthy()) {
                (Some(a), Some(b)) => CompiledValue::Bool(match op_lower.as_str() {
                    "&&" | "and" => a && b,
                    "||" | "or" => a || b,
                    _ => a ^ b,
                }),
                _ => unresolved(),
            },
            "===" => CompiledValue::Bool(lhs == rhs),
            "!==" => CompiledValue::Bool(lhs != rhs),
            "==" | "!=" | "<>" | "<" | "<=" | ">" | ">=" => {
                match (lhs.as_comparable_number(), rhs.as_comparable_number()) {
                    (Some(a), Some(b)) => {
                        let (a, b) = (a.as_f64(), b.as_f64());
                        CompiledValue::Bool(match op {
                            "==" => a == b,
                            "!=" | "<>" => a != b,
                            "<" => a < b,
                            "<=" => a <= b,
                            ">" => a > b,
                            _ => a >= b,
                        })
                    }
                    _ => match op {
                        "==" => CompiledValue::Bool(lhs.to_php_string() == rhs.to_php_string()),
                        "!=" | "<>" => {
                            CompiledValue::Bool(lhs.to_php_string() != rhs.to_php_string())
                        }
                        _ => unresolved(),
                    },
                }
            }
            "+" | "-" | "*" | "/" | "%" | "**" | "|" | "&" | "^" | "<<" | ">>" => {
                match (lhs.as_number(), rhs.as_number()) {
                    (Some(a), Some(b)) => arithmetic(op, a, b).unwrap_or_else(unresolved),
                    _ => unresolved(),
                }
            }
            _ => unresolved(),
        }
    }

    fn class_constant(&self, class: &str, constant: &str, depth: usize) -> Result<CompiledValue> {
        let class_lower = class.to_ascii_lowercase();
        let class_name = match class_lower.as_str() {
            "self" | "static" => self.context.self_class()?.to_string(),
            "parent" => match self.context.parent_class() {
                Some(parent) => parent.to_string(),
                None => return Ok(CompiledValue::Unresolved(format!("{}::{}", class, constant))),
            },
            _ => self.context.resolve_class_name(class),
        };

        if constant.eq_ignore_ascii_case("class") {
            return Ok(CompiledValue::String(class_name));
        }

        let is_self = matches!(class_lower.as_str(), "self" | "static")
            || self
                .context
                .self_class
                .is_some_and(|own| own.eq_ignore_ascii_case(&class_name));
        if is_self
            && depth < MAX_SELF_DEPTH
            && let Some(initialiser) = self.local_constants.and_then(|map| map.get(constant))
        {
            return self.compile_at_depth(initialiser, depth + 1);
        }

        Ok(CompiledValue::ClassConstantRef {
            class: class_name,
            constant: constant.to_string(),
        })
    }

    /// Literals and bare names, evaluated from their source text.
    fn compile_text(&self, expr: &Expression<'_>) -> Result<CompiledValue> {
        let text = self.text(expr);
        let lower = text.trim_start_matches('\\').to_ascii_lowercase();

        let value = match lower.as_str() {
            "true" => CompiledValue::Bool(true),
            "false" => CompiledValue::Bool(false),
            "null" => CompiledValue::Null,
            "__line__" => {
                CompiledValue::Int(self.lines.line_of(expr.span().start.offset as usize) as i64)
            }
            "__file__" => CompiledValue::String(self.context.file_name()?.to_string()),
            "__dir__" => {
                let file = self.context.file_name()?;
                CompiledValue::String(match file.rfind('/') {
                    Some(0) => "/".to_string(),
                    Some(idx) => file[..idx].to_string(),
                    None => ".".to_string(),
                })
            }
            "__class__" => {
                CompiledValue::String(self.context.self_class.unwrap_or_default().to_string())
            }
            "__namespace__" => {
                CompiledValue::String(self.context.namespace_name().unwrap_or_default().to_string())
            }
            "__function__" => {
                CompiledValue::String(self.context.function_name().unwrap_or_default().to_string())
            }
            "__method__" => CompiledValue::String(
                match (self.context.self_class, self.context.function_name()) {
                    (Some(class), Some(function)) => format!("{}::{}", class, function),
                    (None, Some(function)) => function.to_string(),
                    _ => String::new(),
                },
            ),
            _ => {
                if let Some(number) = parse_number(text) {
                    number.into_value()
                } else if is_constant_name(text) {
                    CompiledValue::ConstantRef(self.context.resolve_constant_name(text))
                } else {
                    CompiledValue::Unresolved(text.to_string())
                }
            }
        };
        Ok(value)
    }
}

fn arithmetic(op: &str, a: Number, b: Number) -> Option<CompiledValue> {
    use Number::{Float, Int};
    let value = match (op, a, b) {
        ("+", Int(x), Int(y)) => x
            .checked_add(y)
            .map_or(CompiledValue::Float(x as f64 + y as f64), CompiledValue::Int),
        ("-", Int(x), Int(y)) => x
            .checked_sub(y)
            .map_or(CompiledValue::Float(x as f64 - y as f64), CompiledValue::Int),
        ("*", Int(x), Int(y)) => x
            .checked_mul(y)
            .map_or(CompiledValue::Float(x as f64 * y as f64), CompiledValue::Int),
        // Inexact and overflowing quotients fall through to float division.
        ("/", Int(x), Int(y)) if x.checked_rem(y) == Some(0) => {
            x.checked_div(y).map(CompiledValue::Int)?
        }
        ("%", _, _) => {
            let (x, y) = (as_int(a), as_int(b));
            if y == 0 {
                return None;
            }
            // Only PHP_INT_MIN % -1 overflows, and PHP gives 0 for it.
            CompiledValue::Int(x.checked_rem(y).unwrap_or(0))
        }
        ("**", Int(x), Int(y)) if y >= 0 => u32::try_from(y)
            .ok()
            .and_then(|exp| x.checked_pow(exp))
            .map(CompiledValue::Int)
            .unwrap_or(CompiledValue::Float((x as f64).powf(y as f64))),
        ("|", _, _) => CompiledValue::Int(as_int(a) | as_int(b)),
        ("&", _, _) => CompiledValue::Int(as_int(a) & as_int(b)),
        ("^", _, _) => CompiledValue::Int(as_int(a) ^ as_int(b)),
        ("<<", _, _) => CompiledValue::Int(as_int(a).checked_shl(u32::try_from(as_int(b)).ok()?)?),
        (">>", _, _) => CompiledValue::Int(as_int(a).checked_shr(u32::try_from(as_int(b)).ok()?)?),
        (_, x, y) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            CompiledValue::Float(match op {
                "+" => x + y,
                "-" => x - y,
                "*" => x * y,
                "/" if y != 0.0 => x / y,
                "**" => x.powf(y),
                _ => return None,
            })
        }
    };
    Some(value)
}

fn as_int(number: Number) -> i64 {
    match number {
        Number::Int(i) => i,
        Number::Float(f) => f as i64,
    }
}
