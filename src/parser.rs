/// The parsing seam.
///
/// The AST locator never calls mago directly; it goes through [`Parser`] so
/// hosts can swap in a caching or instrumented implementation.
use std::panic;

use bumpalo::Bump;
use mago_database::file::FileId;
use mago_syntax::ast::Program;
use mago_syntax::parser::parse_file_content;

use crate::error::{Error, Result};

pub trait Parser: Send + Sync {
    /// Parse `source` into an arena-allocated syntax tree.
    ///
    /// Fails with [`Error::ParseToAstFailure`] when the source does not
    /// parse cleanly.
    fn parse<'arena>(
        &self,
        arena: &'arena Bump,
        source: &'arena str,
        file_name: Option<&str>,
    ) -> Result<&'arena Program<'arena>>;
}

/// [`Parser`] backed by `mago-syntax`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagoParser;

impl Parser for MagoParser {
    fn parse<'arena>(
        &self,
        arena: &'arena Bump,
        source: &'arena str,
        file_name: Option<&str>,
    ) -> Result<&'arena Program<'arena>> {
        let failure = |message: String| Error::ParseToAstFailure {
            file_name: file_name.map(str::to_string),
            source_text: source.to_string(),
            message,
        };

        // mago-syntax can panic on some malformed input (unterminated
        // heredocs in particular); treat that as a parse failure.
        let parsed = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let file_id = FileId::new("input.php");
            parse_file_content(arena, file_id, source)
        }));

        let program = match parsed {
            Ok(program) => program,
            Err(_) => {
                tracing::warn!(
                    "parser panicked while parsing {}",
                    file_name.unwrap_or("<string>")
                );
                return Err(failure("parser panicked".to_string()));
            }
        };

        if let Some(error) = program.errors.iter().next() {
            tracing::debug!(
                "parse error in {}: {}",
                file_name.unwrap_or("<string>"),
                error
            );
            return Err(failure(error.to_string()));
        }

        Ok(program)
    }
}
