/// Stubs from JetBrains phpstorm-stubs, embedded at build time.
///
/// `build.rs` reads `PhpStormStubsMap.php` and embeds every stub file it
/// references together with name → file indices. A symbol's stub is the
/// whole file that declares it, and its extension is the file's top
/// directory (`standard/basic.php` belongs to `standard`).
///
/// With a target PHP version configured, symbols are filtered by the
/// `@since` / `@removed` tags of their docblock and by a leading
/// `#[PhpStormStubsElementAvailable]` attribute.
use std::collections::HashMap;
use std::sync::Arc;

use bumpalo::Bump;
use mago_span::HasSpan;

use super::{Presence, SourceStubber, StubData};
use crate::ast::walker::collect_declarations;
use crate::config::PhpVersion;
use crate::docblock::get_docblock_text_for_node;
use crate::identifier::{Identifier, IdentifierType};
use crate::parser::Parser;
use crate::reflection::node_text;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/stub_map_generated.rs"));
}

pub struct PhpStormStubsSourceStubber {
    files: &'static [&'static str],
    paths: &'static [&'static str],
    classes: HashMap<String, usize>,
    functions: HashMap<String, usize>,
    constants: HashMap<String, usize>,
    parser: Arc<dyn Parser>,
    php_version: Option<PhpVersion>,
}

fn key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

fn index(entries: &[(&str, usize)]) -> HashMap<String, usize> {
    entries.iter().map(|&(name, idx)| (key(name), idx)).collect()
}

impl PhpStormStubsSourceStubber {
    /// A stubber over the embedded phpstorm-stubs.
    pub fn new(parser: Arc<dyn Parser>, php_version: Option<PhpVersion>) -> Self {
        Self::from_index(
            &generated::STUB_FILES,
            &generated::STUB_FILE_PATHS,
            &generated::STUB_CLASS_MAP,
            &generated::STUB_FUNCTION_MAP,
            &generated::STUB_CONSTANT_MAP,
            parser,
            php_version,
        )
    }

    pub(crate) fn from_index(
        files: &'static [&'static str],
        paths: &'static [&'static str],
        classes: &[(&str, usize)],
        functions: &[(&str, usize)],
        constants: &[(&str, usize)],
        parser: Arc<dyn Parser>,
        php_version: Option<PhpVersion>,
    ) -> Self {
        PhpStormStubsSourceStubber {
            files,
            paths,
            classes: index(classes),
            functions: index(functions),
            constants: index(constants),
            parser,
            php_version,
        }
    }

    /// Number of embedded stub files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn presence(&self, kind: IdentifierType, name: &str) -> Presence {
        let table = match kind {
            IdentifierType::Class => &self.classes,
            IdentifierType::Function => &self.functions,
            IdentifierType::Constant => &self.constants,
        };
        let Some(&file) = table.get(&key(name)) else {
            return Presence::Unknown;
        };
        let Some(version) = self.php_version else {
            return Presence::Present;
        };
        if self.available_in(file, kind, name, version) {
            Presence::Present
        } else {
            tracing::debug!("{} {} is not available in PHP {}", kind, name, version);
            Presence::Absent
        }
    }

    /// Whether any declaration of `name` in stub file `file` exists in
    /// PHP `version`. Files that fail to parse count as available.
    fn available_in(&self, file: usize, kind: IdentifierType, name: &str, version: PhpVersion) -> bool {
        let Some(&source) = self.files.get(file) else {
            return false;
        };
        let arena = Bump::new();
        let program = match self.parser.parse(&arena, source, self.paths.get(file).copied()) {
            Ok(program) => program,
            Err(e) => {
                tracing::debug!("stub file for {} does not parse: {}", name, e);
                return true;
            }
        };

        let identifier = Identifier::new(name, kind);
        let mut declarations = collect_declarations(program, kind)
            .into_iter()
            .filter(|declaration| {
                declaration
                    .qualified_name()
                    .is_some_and(|declared| identifier.matches(&declared))
            })
            .peekable();
        if declarations.peek().is_none() {
            return true;
        }

        declarations.any(|declaration| {
            let docblock =
                get_docblock_text_for_node(program.trivia.as_slice(), source, &declaration.node);
            let attributes = attributes_of(source, &declaration.node);
            Availability::of(docblock, &attributes).includes(version)
        })
    }

    fn stub(&self, kind: IdentifierType, name: &str) -> Option<StubData> {
        let table = match kind {
            IdentifierType::Class => &self.classes,
            IdentifierType::Function => &self.functions,
            IdentifierType::Constant => &self.constants,
        };
        let &file = table.get(&key(name))?;
        if self.presence(kind, name) == Presence::Absent {
            return None;
        }
        let source = self.files.get(file)?;
        let extension = self
            .paths
            .get(file)
            .and_then(|path| path.split('/').next())
            .filter(|extension| !extension.is_empty())
            .map(str::to_string);
        Some(StubData::new(*source, extension))
    }
}

impl SourceStubber for PhpStormStubsSourceStubber {
    fn generate_class_stub(&self, class_name: &str) -> Option<StubData> {
        self.stub(IdentifierType::Class, class_name)
    }

    fn generate_function_stub(&self, function_name: &str) -> Option<StubData> {
        self.stub(IdentifierType::Function, function_name)
    }

    fn generate_constant_stub(&self, constant_name: &str) -> Option<StubData> {
        self.stub(IdentifierType::Constant, constant_name)
    }

    fn is_present_class(&self, class_name: &str) -> Presence {
        self.presence(IdentifierType::Class, class_name)
    }

    fn is_present_function(&self, function_name: &str) -> Presence {
        self.presence(IdentifierType::Function, function_name)
    }
}

/// The `#[...]` lines attached to a declaration, whether or not the
/// parser counts them as part of the node.
fn attributes_of(source: &str, node: &impl HasSpan) -> String {
    let start = node.span().start.offset as usize;
    let mut lines: Vec<&str> = source
        .get(..start)
        .unwrap_or_default()
        .lines()
        .rev()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| line.starts_with("#["))
        .collect();
    lines.reverse();
    lines.extend(
        node_text(source, node)
            .lines()
            .map(str::trim)
            .take_while(|line| line.starts_with("#[")),
    );
    lines.join("\n")
}

/// The PHP versions a stub declaration exists in.
#[derive(Debug, Default, PartialEq, Eq)]
struct Availability {
    since: Option<PhpVersion>,
    removed: Option<PhpVersion>,
    /// Last `major.minor` line the element exists in.
    until: Option<PhpVersion>,
}

impl Availability {
    fn of(docblock: Option<&str>, attributes: &str) -> Self {
        let mut availability = Availability::default();
        if let Some(docblock) = docblock {
            for line in docblock.lines() {
                let line = line.trim().trim_start_matches("/**").trim_start_matches('*').trim();
                if let Some(rest) = line.strip_prefix("@since") {
                    availability.since = availability.since.or_else(|| first_version(rest));
                } else if let Some(rest) = line.strip_prefix("@removed") {
                    availability.removed = availability.removed.or_else(|| first_version(rest));
                }
            }
        }

        const MARKER: &str = "PhpStormStubsElementAvailable(";
        if let Some(pos) = attributes.find(MARKER) {
            let args = &attributes[pos + MARKER.len()..];
            let args = &args[..args.find(')').unwrap_or(args.len())];
            for (position, arg) in args.split(',').enumerate() {
                let (name, value) = match arg.split_once(':') {
                    Some((name, value)) => (Some(name.trim()), value),
                    None => (None, arg),
                };
                let version = value
                    .trim()
                    .trim_matches(|c| c == '\'' || c == '"')
                    .parse::<PhpVersion>()
                    .ok();
                match (name, position) {
                    (Some("from"), _) | (None, 0) => {
                        availability.since = version.or(availability.since);
                    }
                    (Some("to"), _) | (None, 1) => availability.until = version,
                    _ => {}
                }
            }
        }
        availability
    }

    fn includes(&self, version: PhpVersion) -> bool {
        if self.since.is_some_and(|since| version < since) {
            return false;
        }
        if self.removed.is_some_and(|removed| version >= removed) {
            return false;
        }
        if let Some(until) = self.until
            && (version.major, version.minor) > (until.major, until.minor)
        {
            return false;
        }
        true
    }
}

/// Parse the first whitespace-separated token as a PHP version. Tags like
/// `@since PECL ...` carry extension versions and are ignored.
fn first_version(text: &str) -> Option<PhpVersion> {
    text.split_whitespace().next()?.parse().ok()
}
