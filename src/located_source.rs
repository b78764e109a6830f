/// Source fragments handed from locators to the AST locator.
use std::path::Path;

use crate::util::normalize_file_name;

/// Where a [`LocatedSource`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Ordinary user code, from a file or a string.
    User,
    /// Code that was defined through `eval()`.
    Evaled,
    /// A stub describing a symbol built into PHP or one of its extensions.
    Internal { extension: String },
}

/// Immutable source text plus its origin.
///
/// Nothing is validated here: an empty string is valid source, and "no
/// source found" is expressed by the absence of a `LocatedSource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    source: String,
    file_name: Option<String>,
    origin: SourceOrigin,
}

impl LocatedSource {
    pub fn new(source: impl Into<String>, file_name: Option<&Path>) -> Self {
        LocatedSource {
            source: source.into(),
            file_name: file_name.map(normalize_file_name),
            origin: SourceOrigin::User,
        }
    }

    pub fn evaled(source: impl Into<String>) -> Self {
        LocatedSource {
            source: source.into(),
            file_name: None,
            origin: SourceOrigin::Evaled,
        }
    }

    /// Source for a built-in symbol. Always carries its extension name.
    pub fn internal(
        source: impl Into<String>,
        extension: impl Into<String>,
        file_name: Option<&Path>,
    ) -> Self {
        LocatedSource {
            source: source.into(),
            file_name: file_name.map(normalize_file_name),
            origin: SourceOrigin::Internal {
                extension: extension.into(),
            },
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Origin file path with forward slashes, `None` for in-memory code.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn is_evaled(&self) -> bool {
        self.origin == SourceOrigin::Evaled
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.origin, SourceOrigin::Internal { .. })
    }

    pub fn extension_name(&self) -> Option<&str> {
        match &self.origin {
            SourceOrigin::Internal { extension } => Some(extension),
            _ => None,
        }
    }
}
