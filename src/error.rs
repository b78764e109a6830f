use std::path::PathBuf;

use thiserror::Error;

use crate::identifier::Identifier;

/// Every failure the reflection pipeline can report.
///
/// "Not found" is never an error inside the locator layer: locators answer
/// `Ok(None)` and only the reflector facade turns that into
/// [`Error::IdentifierNotFound`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} \"{}\" could not be found in the located source", .identifier.kind(), .identifier.name())]
    IdentifierNotFound { identifier: Identifier },

    #[error("Two closures on line {line} in {file_name}")]
    TwoClosuresOnSameLine { file_name: String, line: usize },

    #[error("Evaled closure cannot be located")]
    EvaledClosureCannotBeLocated,

    #[error(
        "AST failed to parse in located source{}: {message} (source starts with \"{}\")",
        file_label(.file_name),
        excerpt(.source_text)
    )]
    ParseToAstFailure {
        file_name: Option<String>,
        source_text: String,
        message: String,
    },

    #[error("Invalid file location {}: {reason}", .path.display())]
    InvalidFileLocation { path: PathBuf, reason: String },

    #[error("Invalid directory {}: {reason}", .path.display())]
    InvalidDirectory { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The current context does not have a class for self")]
    NoSelf,

    #[error("The current context does not have a filename")]
    NoFileName,

    #[error("Node must be {expected}, was {found}")]
    InvalidNodeType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Expected a {expected} reflection, got a {found} reflection")]
    UnexpectedReflection {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid configuration in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is the facade's not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::IdentifierNotFound { .. })
    }
}

fn file_label(file_name: &Option<String>) -> String {
    match file_name {
        Some(name) => format!(" {}", name),
        None => String::new(),
    }
}

/// First 20 characters of the offending source, for error messages.
fn excerpt(source: &str) -> String {
    let mut chars = source.chars();
    let head: String = chars.by_ref().take(20).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
