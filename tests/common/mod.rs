#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use better_reflection::ast::{AstLocator, no_function_reflector};
use better_reflection::parser::MagoParser;
use better_reflection::source_locator::{SourceLocator, StringSourceLocator};
use better_reflection::{ClassReflector, ConstantReflector, FunctionReflector};

/// A throwaway project directory.
pub struct TestWorkspace {
    dir: tempfile::TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        TestWorkspace {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn with_composer(json: &str) -> Self {
        let workspace = Self::new();
        workspace.write("composer.json", json);
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, content).expect("failed to write file");
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("failed to create dir");
        path
    }
}

pub fn ast_locator() -> AstLocator {
    AstLocator::new(Arc::new(MagoParser), no_function_reflector())
}

/// Class, function and constant reflectors sharing one locator.
pub struct Reflectors {
    pub classes: Arc<ClassReflector>,
    pub functions: FunctionReflector,
    pub constants: ConstantReflector,
}

pub fn reflectors_over(locator: Arc<dyn SourceLocator>) -> Reflectors {
    let classes = Arc::new(ClassReflector::new(Arc::clone(&locator)));
    Reflectors {
        functions: FunctionReflector::new(Arc::clone(&locator), Arc::clone(&classes)),
        constants: ConstantReflector::new(locator, Arc::clone(&classes)),
        classes,
    }
}

pub fn reflectors_for_source(source: &str) -> Reflectors {
    reflectors_over(Arc::new(StringSourceLocator::new(source, ast_locator())))
}
