//! Build script for better-reflection.
//!
//! Parses `stubs/jetbrains/phpstorm-stubs/PhpStormStubsMap.php` and generates
//! `stub_map_generated.rs`, which:
//!
//!   1. Embeds every referenced PHP stub file via `include_str!`.
//!   2. Records each embedded file's path relative to the stubs root. The
//!      first path component is the PHP extension the file describes.
//!   3. Maps class, function and constant names to indices into the
//!      embedded file array.
//!
//! The generated file is consumed by `src/source_stubber/phpstorm.rs`.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::Path;

/// Relative path from the crate root to the stubs map file.
const MAP_FILE: &str = "stubs/jetbrains/phpstorm-stubs/PhpStormStubsMap.php";

/// Base directory for the relative paths found in the map file.
const STUBS_DIR: &str = "stubs/jetbrains/phpstorm-stubs";

/// Map sections and the static each one becomes.
const SECTIONS: &[(&str, &str, &str)] = &[
    ("CLASSES", "STUB_CLASS_MAP", "class, interface, trait and enum names"),
    ("FUNCTIONS", "STUB_FUNCTION_MAP", "function names, namespaced ones included"),
    ("CONSTANTS", "STUB_CONSTANT_MAP", "constant names, namespaced ones included"),
];

fn main() {
    // composer.lock changes when `composer update` pulls a new
    // phpstorm-stubs release into `stubs/`.
    println!("cargo:rerun-if-changed=composer.lock");
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("stub_map_generated.rs");

    let map_content = match fs::read_to_string(Path::new(&manifest_dir).join(MAP_FILE)) {
        Ok(content) => content,
        Err(e) => {
            // Without stubs the crate still builds; internal symbols are
            // simply not found.
            println!(
                "cargo:warning=Could not read PhpStormStubsMap.php ({}); generating empty stub index",
                e
            );
            fs::write(&dest_path, empty_index()).expect("Failed to write empty stub index");
            return;
        }
    };

    let sections: Vec<BTreeMap<String, String>> = SECTIONS
        .iter()
        .map(|(section, _, _)| parse_section(&map_content, section))
        .collect();

    // Only files that exist on disk are embedded.
    let stubs_base = Path::new(&manifest_dir).join(STUBS_DIR);
    let files: Vec<&str> = sections
        .iter()
        .flat_map(|section| section.values().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|rel| stubs_base.join(rel).is_file())
        .collect();
    let file_index: BTreeMap<&str, usize> =
        files.iter().enumerate().map(|(i, &path)| (path, i)).collect();

    let mut out = String::with_capacity(512 * 1024);

    out.push_str("/// Embedded phpstorm-stubs PHP files.\n");
    out.push_str(&format!("pub(crate) static STUB_FILES: [&str; {}] = [\n", files.len()));
    for rel_path in &files {
        let abs = stubs_base.join(rel_path).to_string_lossy().replace('\\', "/");
        out.push_str(&format!("    include_str!(\"{}\"),\n", abs));
    }
    out.push_str("];\n\n");

    out.push_str("/// Path of each [`STUB_FILES`] entry relative to the stubs root.\n");
    out.push_str(&format!("pub(crate) static STUB_FILE_PATHS: [&str; {}] = [\n", files.len()));
    for rel_path in &files {
        out.push_str(&format!("    \"{}\",\n", escape(rel_path)));
    }
    out.push_str("];\n");

    for ((_, static_name, description), section) in SECTIONS.iter().zip(&sections) {
        let entries: Vec<(&str, usize)> = section
            .iter()
            .filter_map(|(name, path)| file_index.get(path.as_str()).map(|&idx| (name.as_str(), idx)))
            .collect();

        out.push_str(&format!("\n/// Maps {} to an index into [`STUB_FILES`].\n", description));
        out.push_str(&format!(
            "pub(crate) static {}: [(&str, usize); {}] = [\n",
            static_name,
            entries.len()
        ));
        for (name, idx) in entries {
            out.push_str(&format!("    (\"{}\", {}),\n", escape(name), idx));
        }
        out.push_str("];\n");
    }

    fs::write(&dest_path, &out).expect("Failed to write generated stub map");
}

/// Parse one `const SECTION = array (...)` block of PhpStormStubsMap.php
/// into `symbol_name → relative_file_path`.
fn parse_section(content: &str, section_name: &str) -> BTreeMap<String, String> {
    let marker = format!("const {} = array (", section_name);
    let Some(start) = content.find(&marker).map(|pos| pos + marker.len()) else {
        return BTreeMap::new();
    };

    content[start..]
        .lines()
        .map(str::trim)
        .take_while(|line| *line != ");")
        .filter_map(parse_map_entry)
        .collect()
}

/// Parse a single `'key' => 'value',` line.
fn parse_map_entry(line: &str) -> Option<(String, String)> {
    let (lhs, rhs) = line.trim_end_matches(',').split_once(" => ")?;
    let key = lhs.trim().strip_prefix('\'')?.strip_suffix('\'')?;
    let value = rhs.trim().strip_prefix('\'')?.strip_suffix('\'')?;
    Some((key.to_string(), value.to_string()))
}

/// Escape a string for embedding in a Rust string literal.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn empty_index() -> String {
    let mut out = String::from("pub(crate) static STUB_FILES: [&str; 0] = [];\n");
    out.push_str("pub(crate) static STUB_FILE_PATHS: [&str; 0] = [];\n");
    for (_, static_name, _) in SECTIONS {
        out.push_str(&format!("pub(crate) static {}: [(&str, usize); 0] = [];\n", static_name));
    }
    out
}
