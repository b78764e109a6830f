/// Project configuration, read from `better-reflection.toml`.
///
/// Every field is optional; a missing file yields [`ReflectionConfig::default`].
///
/// ```toml
/// php-version = "8.2"
/// stubs = true
/// composer = true
/// vendor-dir = "vendor"
/// memoize = true
/// paths = ["src", "bootstrap/helpers.php"]
/// case-insensitive-constants = ["true", "false", "null"]
/// ```
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::identifier::{DEFAULT_CASE_INSENSITIVE_CONSTANTS, NameRules};

pub const CONFIG_FILE_NAME: &str = "better-reflection.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReflectionConfig {
    /// Target PHP version, used to decide whether built-in symbols exist.
    pub php_version: Option<PhpVersion>,
    /// Resolve built-in classes, functions and constants from stubs.
    pub stubs: bool,
    /// Read PSR-4 and classmap autoload data from Composer files.
    pub composer: bool,
    /// Vendor directory override. Defaults to composer.json's `config.vendor-dir`.
    pub vendor_dir: Option<String>,
    /// Cache locator results per reflector.
    pub memoize: bool,
    /// Extra files or directories to scan, relative to the project root.
    pub paths: Vec<PathBuf>,
    pub case_insensitive_constants: Vec<String>,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        ReflectionConfig {
            php_version: None,
            stubs: true,
            composer: true,
            vendor_dir: None,
            memoize: true,
            paths: Vec::new(),
            case_insensitive_constants: DEFAULT_CASE_INSENSITIVE_CONSTANTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ReflectionConfig {
    /// Load `better-reflection.toml` from `root`, or defaults if absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            tracing::debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn name_rules(&self) -> NameRules {
        NameRules::new(&self.case_insensitive_constants)
    }
}

/// A `major.minor[.patch]` PHP version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhpVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PhpVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        PhpVersion {
            major,
            minor,
            patch,
        }
    }
}

impl Ord for PhpVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for PhpVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for PhpVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = |required: bool| -> std::result::Result<u32, String> {
            match parts.next() {
                Some(part) => part
                    .parse::<u32>()
                    .map_err(|_| format!("invalid PHP version \"{}\"", s)),
                None if required => Err(format!("invalid PHP version \"{}\"", s)),
                None => Ok(0),
            }
        };
        let major = next(true)?;
        let minor = next(false)?;
        let patch = next(false)?;
        Ok(PhpVersion::new(major, minor, patch))
    }
}

impl<'de> Deserialize<'de> for PhpVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = ReflectionConfig::load(dir.path()).expect("defaults");
        assert!(config.stubs);
        assert!(config.composer);
        assert!(config.memoize);
        assert!(config.php_version.is_none());
        assert!(config.case_insensitive_constants.contains(&"null".to_string()));
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
php-version = "8.1"
stubs = false
memoize = false
vendor-dir = "libs"
paths = ["src"]
case-insensitive-constants = ["MY_FLAG"]
"#,
        )
        .expect("failed to write config");

        let config = ReflectionConfig::load(dir.path()).expect("config should parse");
        assert_eq!(config.php_version, Some(PhpVersion::new(8, 1, 0)));
        assert!(!config.stubs);
        assert!(!config.memoize);
        assert!(config.composer);
        assert_eq!(config.vendor_dir.as_deref(), Some("libs"));
        assert_eq!(config.paths, vec![PathBuf::from("src")]);
        assert_eq!(config.name_rules().case_insensitive_constants(), ["my_flag"]);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "stubs = \"maybe\"")
            .expect("failed to write config");
        let err = ReflectionConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_php_version_ordering() {
        let v80: PhpVersion = "8.0".parse().expect("valid");
        let v812: PhpVersion = "8.1.2".parse().expect("valid");
        assert!(v80 < v812);
        assert_eq!(v812.to_string(), "8.1.2");
        assert!("eight".parse::<PhpVersion>().is_err());
    }
}
