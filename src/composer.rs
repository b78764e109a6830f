/// Composer project discovery.
///
/// Reads the autoload configuration a Composer project exposes and turns it
/// into data the source locators can use:
///
///   - `composer.json` `autoload` / `autoload-dev` PSR-4 sections
///   - `vendor/composer/autoload_psr4.php` (installed packages)
///   - `vendor/composer/autoload_classmap.php`
///   - `vendor/composer/autoload_files.php`
///
/// The generated `vendor/composer/*.php` files are never executed. Their
/// `'Key' => $vendorDir . '/path'` lines are read textually.
///
/// Missing or malformed files are not errors: each parser returns an empty
/// result and logs at debug level, so a project without Composer still works.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::source_locator::psr4::Psr4Mapping;

/// A single PSR-4 namespace-to-directory entry, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psr4Entry {
    /// The namespace prefix, ending with `\` unless it is the empty fallback.
    pub prefix: String,
    /// The base directory relative to the project root, ending with `/`.
    pub base_path: String,
}

/// Read `config.vendor-dir` from `composer.json`, defaulting to `vendor`.
pub fn vendor_dir(root: &Path) -> String {
    read_composer_json(root)
        .as_ref()
        .and_then(|json| json.get("config"))
        .and_then(|config| config.get("vendor-dir"))
        .and_then(|dir| dir.as_str())
        .map(|dir| dir.trim_end_matches('/').to_string())
        .unwrap_or_else(|| "vendor".to_string())
}

fn read_composer_json(root: &Path) -> Option<serde_json::Value> {
    let composer_path = root.join("composer.json");
    let content = std::fs::read_to_string(&composer_path).ok()?;
    match serde_json::from_str(&content) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::debug!("ignoring malformed {}: {}", composer_path.display(), e);
            None
        }
    }
}

/// PSR-4 entries from the `autoload` and `autoload-dev` sections of
/// `composer.json`, in declaration order.
pub fn parse_composer_json(root: &Path) -> Vec<Psr4Entry> {
    let Some(json) = read_composer_json(root) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for section_key in &["autoload", "autoload-dev"] {
        if let Some(section) = json.get(section_key)
            && let Some(psr4) = section.get("psr-4")
            && let Some(psr4_obj) = psr4.as_object()
        {
            for (prefix, paths) in psr4_obj {
                extract_psr4_entries(prefix, paths, &mut entries);
            }
        }
    }
    entries
}

/// Every PSR-4 entry of the project at `root`: its own `composer.json`
/// followed by the installed packages listed in the vendor
/// `autoload_psr4.php`, longest prefix first.
pub fn psr4_entries(root: &Path, vendor_dir: &str) -> Vec<Psr4Entry> {
    let mut entries = parse_composer_json(root);
    for entry in parse_vendor_autoload_psr4(root, vendor_dir) {
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    // Stable sort keeps declaration order between equal-length prefixes.
    entries.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    entries
}

/// Extract PSR-4 entries from a single prefix → path(s) pair. The value is
/// either a string (`"src/"`) or an array of strings (`["src/", "lib/"]`).
fn extract_psr4_entries(prefix: &str, paths: &serde_json::Value, entries: &mut Vec<Psr4Entry>) {
    let prefix = normalise_prefix(prefix);

    match paths {
        serde_json::Value::String(path) => entries.push(Psr4Entry {
            prefix,
            base_path: normalise_path(path),
        }),
        serde_json::Value::Array(arr) => {
            for path in arr.iter().filter_map(|entry| entry.as_str()) {
                entries.push(Psr4Entry {
                    prefix: prefix.clone(),
                    base_path: normalise_path(path),
                });
            }
        }
        _ => {}
    }
}

fn normalise_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('\\') {
        prefix.to_string()
    } else {
        format!("{}\\", prefix)
    }
}

/// Normalise a directory path: forward slashes and a trailing `/`.
pub fn normalise_path(path: &str) -> String {
    let p = path.replace('\\', "/");
    if p.ends_with('/') || p.is_empty() {
        p
    } else {
        format!("{}/", p)
    }
}

/// Parse `<vendor>/composer/autoload_psr4.php`.
pub fn parse_vendor_autoload_psr4(root: &Path, vendor_dir: &str) -> Vec<Psr4Entry> {
    let Some(content) = read_vendor_file(root, vendor_dir, "autoload_psr4.php") else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for line in array_lines(&content) {
        let Some((prefix, rest)) = parse_quoted_key(line) else {
            continue;
        };
        let prefix = normalise_prefix(&prefix);
        for path in parse_path_expressions(rest, vendor_dir) {
            entries.push(Psr4Entry {
                prefix: prefix.clone(),
                base_path: normalise_path(&path),
            });
        }
    }
    entries
}

/// Class name → absolute file path, as listed by Composer's classmap.
pub type ComposerClassMap = HashMap<String, PathBuf>;

/// Parse `<vendor>/composer/autoload_classmap.php` into class → absolute path.
pub fn parse_autoload_classmap(root: &Path, vendor_dir: &str) -> ComposerClassMap {
    let Some(content) = read_vendor_file(root, vendor_dir, "autoload_classmap.php") else {
        return HashMap::new();
    };

    let mut classmap = HashMap::new();
    for line in array_lines(&content) {
        let Some((class_name, rest)) = parse_quoted_key(line) else {
            continue;
        };
        if let Some(path) = parse_path_expressions(rest, vendor_dir).into_iter().next() {
            classmap.insert(class_name, root.join(path));
        }
    }
    classmap
}

/// Parse `<vendor>/composer/autoload_files.php`, keeping files that exist.
pub fn parse_autoload_files(root: &Path, vendor_dir: &str) -> Vec<PathBuf> {
    let Some(content) = read_vendor_file(root, vendor_dir, "autoload_files.php") else {
        return Vec::new();
    };

    let mut files = Vec::new();
    for line in array_lines(&content) {
        let Some((_hash, rest)) = parse_quoted_key(line) else {
            continue;
        };
        for path in parse_path_expressions(rest, vendor_dir) {
            let full = root.join(path);
            if full.is_file() {
                files.push(full);
            } else {
                tracing::debug!("autoload file {} does not exist", full.display());
            }
        }
    }
    files
}

/// Build the locator-side PSR-4 mapping with directories resolved against `root`.
pub fn psr4_mapping(root: &Path, entries: &[Psr4Entry]) -> Psr4Mapping {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for entry in entries {
        let dir = root
            .join(entry.base_path.trim_end_matches('/'))
            .to_string_lossy()
            .to_string();
        match grouped.iter_mut().find(|(prefix, _)| *prefix == entry.prefix) {
            Some((_, dirs)) => dirs.push(dir),
            None => grouped.push((entry.prefix.clone(), vec![dir])),
        }
    }
    Psr4Mapping::from_array_mappings(grouped)
}

fn read_vendor_file(root: &Path, vendor_dir: &str, file_name: &str) -> Option<String> {
    let path = root.join(vendor_dir).join("composer").join(file_name);
    match std::fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(_) => {
            tracing::debug!("no {} found", path.display());
            None
        }
    }
}

/// Lines inside the `return array(...)` body.
fn array_lines(content: &str) -> impl Iterator<Item = &str> {
    let body = content
        .find("return array(")
        .map(|pos| &content[pos + "return array(".len()..])
        .unwrap_or("");
    body.lines()
        .map(str::trim)
        .take_while(|line| *line != ");")
}

/// Parse the leading `'Key' =>` of an array line, unescaping `\\` and `\'`.
fn parse_quoted_key(line: &str) -> Option<(String, &str)> {
    let rest = line.strip_prefix('\'')?;
    let mut key = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    if escaped != '\\' && escaped != '\'' {
                        key.push('\\');
                    }
                    key.push(escaped);
                }
            }
            '\'' => {
                let after = rest[i + 1..].trim_start().strip_prefix("=>")?;
                return Some((key, after));
            }
            _ => key.push(c),
        }
    }
    None
}

/// Extract every `$vendorDir . '/x'` / `$baseDir . '/x'` path, relative to the root.
fn parse_path_expressions(rest: &str, vendor_dir: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut remaining = rest;
    loop {
        let vendor_pos = remaining.find("$vendorDir");
        let base_pos = remaining.find("$baseDir");
        let (pos, is_vendor) = match (vendor_pos, base_pos) {
            (Some(v), Some(b)) if v < b => (v, true),
            (Some(_), Some(b)) => (b, false),
            (Some(v), None) => (v, true),
            (None, Some(b)) => (b, false),
            (None, None) => break,
        };
        remaining = &remaining[pos..];
        let Some(quote_start) = remaining.find('\'') else {
            break;
        };
        let after_quote = &remaining[quote_start + 1..];
        let Some(quote_end) = after_quote.find('\'') else {
            break;
        };
        let path = after_quote[..quote_end].trim_start_matches('/');
        paths.push(if is_vendor {
            format!("{}/{}", vendor_dir, path)
        } else {
            path.to_string()
        });
        remaining = &after_quote[quote_end + 1..];
    }
    paths
}
