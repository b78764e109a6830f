/// Small helpers shared across the crate: name splitting, byte-offset to
/// line conversion, and file checks.
use std::path::Path;

use crate::error::{Error, Result};

/// Return the short (unqualified) name of a namespace-qualified name.
///
/// `"Foo\\Bar\\Baz"` becomes `"Baz"`.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Split `"Foo\\Bar\\Baz"` into `(Some("Foo\\Bar"), "Baz")`.
pub fn split_namespace(name: &str) -> (Option<&str>, &str) {
    let name = name.strip_prefix('\\').unwrap_or(name);
    match name.rfind('\\') {
        Some(idx) => (Some(&name[..idx]), &name[idx + 1..]),
        None => (None, name),
    }
}

/// Join a namespace and a short name.
pub fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, name),
        _ => name.to_string(),
    }
}

/// Normalise a file path for display and comparison: forward slashes only.
pub fn normalize_file_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Fail with [`Error::InvalidFileLocation`] unless `path` is a readable file.
pub fn assert_readable_file(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::InvalidFileLocation {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_file() {
        return Err(Error::InvalidFileLocation {
            path: path.to_path_buf(),
            reason: "not a file".to_string(),
        });
    }
    Ok(())
}

/// Read a PHP file, mapping failures to [`Error::Io`].
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Byte offset to 1-based line/column lookup for one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(source.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|pos| pos + 1));
        LineIndex { line_starts }
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// 1-based column of `offset` within its line.
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset - self.line_starts[line - 1] + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Foo\\Bar\\Baz"), "Baz");
        assert_eq!(short_name("Baz"), "Baz");
    }

    #[test]
    fn test_split_namespace() {
        assert_eq!(split_namespace("\\Foo\\Bar"), (Some("Foo"), "Bar"));
        assert_eq!(split_namespace("strlen"), (None, "strlen"));
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify(Some("App"), "User"), "App\\User");
        assert_eq!(qualify(None, "User"), "User");
        assert_eq!(qualify(Some(""), "User"), "User");
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("<?php\n\nfunction foo() {}\n");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(5), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.column_of(7), 1);
        assert_eq!(index.column_of(16), 10);
    }

    #[test]
    fn test_assert_readable_file_rejects_directories() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let err = assert_readable_file(dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidFileLocation { .. }));

        let missing = dir.path().join("missing.php");
        assert!(assert_readable_file(&missing).is_err());

        let file = dir.path().join("present.php");
        std::fs::write(&file, "<?php").expect("failed to write file");
        assert!(assert_readable_file(&file).is_ok());
    }
}
