/// PHPDoc helpers.
///
/// Locates the `/** ... */` comment attached to a node and resolves the
/// types in its `@return` tag against the namespace the node lives in.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::ast::namespace::NamespaceContext;

/// Types that never name a class and are kept as written.
const SCALAR_TYPES: &[&str] = &[
    "int", "integer", "float", "double", "string", "bool", "boolean", "array", "object", "mixed",
    "void", "never", "null", "true", "false", "callable", "iterable", "resource", "self",
    "static", "parent", "$this",
];

/// Find the docblock comment that directly precedes `node`.
///
/// Walks trivia backwards from the node start. Whitespace and ordinary
/// comments between the docblock and the node are skipped; any code in
/// between means the docblock belongs to something else.
pub fn get_docblock_text_for_node<'a>(
    trivia: &'a [Trivia<'a>],
    content: &str,
    node: &impl HasSpan,
) -> Option<&'a str> {
    let node_start = node.span().start.offset;
    let candidate_idx = trivia.partition_point(|t| t.span.start.offset < node_start);
    if candidate_idx == 0 {
        return None;
    }

    let content_bytes = content.as_bytes();
    let mut covered_from = node_start;

    for t in trivia[..candidate_idx].iter().rev() {
        let gap = content_bytes
            .get(t.span.end.offset as usize..covered_from as usize)
            .unwrap_or(&[]);
        if !gap.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match t.kind {
            TriviaKind::DocBlockComment => return Some(t.value),
            TriviaKind::WhiteSpace
            | TriviaKind::SingleLineComment
            | TriviaKind::MultiLineComment
            | TriviaKind::HashComment => {
                covered_from = t.span.start.offset;
            }
        }
    }

    None
}

/// The raw type text of the first `@return` tag, e.g. `Foo|null`.
pub fn extract_return_type(docblock: &str) -> Option<&str> {
    let inner = docblock
        .trim()
        .strip_prefix("/**")
        .unwrap_or(docblock)
        .strip_suffix("*/")
        .unwrap_or(docblock);

    for line in inner.lines() {
        let trimmed = line.trim().trim_start_matches('*').trim();
        let rest = trimmed
            .strip_prefix("@return")
            .or_else(|| trimmed.strip_prefix("@phpstan-return"))
            .or_else(|| trimmed.strip_prefix("@psalm-return"));
        let Some(rest) = rest else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let rest = rest.trim_start();
        if rest.is_empty() {
            continue;
        }
        return Some(split_type_token(rest));
    }
    None
}

/// Take the leading type token, respecting `<...>` nesting so that
/// `array<int, Foo> $description` yields `array<int, Foo>`.
fn split_type_token(s: &str) -> &str {
    let mut angle_depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '{' => angle_depth += 1,
            '>' | ')' | '}' => angle_depth -= 1,
            c if c.is_whitespace() && angle_depth <= 0 => return &s[..i],
            _ => {}
        }
    }
    s
}

/// Resolve the `@return` union of `docblock` into individual types.
///
/// Class names are made fully qualified (with a leading `\`) using the
/// namespace and `use` imports in `context`; scalar and pseudo types are
/// kept as written. `Foo[]` keeps its suffix.
pub fn find_return_type(docblock: &str, context: &NamespaceContext) -> Vec<String> {
    let Some(raw) = extract_return_type(docblock) else {
        return Vec::new();
    };

    split_union(raw)
        .into_iter()
        .map(|part| resolve_type_part(part, context))
        .collect()
}

fn split_union(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(raw[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(raw[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

fn resolve_type_part(part: &str, context: &NamespaceContext) -> String {
    let (nullable, body) = match part.strip_prefix('?') {
        Some(rest) => ("?", rest),
        None => ("", part),
    };
    let base_end = body.find(['<', '[', '{', '(']).unwrap_or(body.len());
    let (base, suffix) = body.split_at(base_end);

    if base.is_empty() || SCALAR_TYPES.contains(&base.to_ascii_lowercase().as_str()) {
        return part.to_string();
    }

    format!("{}\\{}{}", nullable, context.resolve_class_name(base), suffix)
}
