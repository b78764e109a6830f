/// The [`BetterReflection`] container.
///
/// Wires a parser, AST locators, the source locator chain and the three
/// reflectors for one project root. The chain is, in order:
///
///   1. locators supplied by the host,
///   2. the configured `paths` (files and directories),
///   3. Composer PSR-4 directories, classmap and autoload files,
///   4. phpstorm-stubs for symbols built into PHP,
///
/// wrapped in a memoizing locator unless memoization is turned off.
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};

use crate::ast::{AstLocator, FunctionReflectorSupplier};
use crate::composer;
use crate::config::ReflectionConfig;
use crate::error::Result;
use crate::identifier::{Identifier, IdentifierType, NameRules};
use crate::parser::{MagoParser, Parser};
use crate::reflection::{Reflection, ReflectionFunction};
use crate::reflector::{ClassReflector, ConstantReflector, FunctionReflector, Reflector};
use crate::source_locator::{
    AggregateSourceLocator, ClosureSourceLocator, ComposerSourceLocator,
    DirectoriesSourceLocator, MemoizingSourceLocator, PhpInternalSourceLocator,
    Psr4SourceLocator, RuntimeClosure, SingleFileSourceLocator, SourceLocator,
};
use crate::source_stubber::{PhpStormStubsSourceStubber, SourceStubber};

/// Builds extra locators for one AST locator. Called once for the full
/// chain and once for the identifier-only chain.
pub type LocatorFactory<'f> = &'f dyn Fn(&AstLocator) -> Result<Vec<Box<dyn SourceLocator>>>;

pub struct BetterReflection {
    root: PathBuf,
    config: ReflectionConfig,
    rules: Arc<NameRules>,
    ast_locator: AstLocator,
    source_stubber: Option<Arc<dyn SourceStubber>>,
    source_locator: Arc<dyn SourceLocator>,
    /// Same chain as `source_locator`, building identifier-only
    /// reflections for existence checks.
    presence_locator: Arc<dyn SourceLocator>,
    class_reflector: Arc<ClassReflector>,
    function_reflector: Arc<FunctionReflector>,
    constant_reflector: Arc<ConstantReflector>,
}

impl BetterReflection {
    /// Load `better-reflection.toml` from `root` and build the container.
    pub fn from_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = ReflectionConfig::load(&root)?;
        Self::new(root, config)
    }

    pub fn new(root: impl Into<PathBuf>, config: ReflectionConfig) -> Result<Self> {
        Self::with_locators(root, config, &|_| Ok(Vec::new()))
    }

    /// Build the container with host locators in front of the chain.
    pub fn with_locators(
        root: impl Into<PathBuf>,
        config: ReflectionConfig,
        extra: LocatorFactory<'_>,
    ) -> Result<Self> {
        let root = root.into();
        let rules = Arc::new(config.name_rules());
        let parser: Arc<dyn Parser> = Arc::new(MagoParser);

        // The AST locator needs the function reflector to vet namespaced
        // define() calls, and the function reflector needs the locators.
        let function_slot: Arc<OnceLock<Weak<FunctionReflector>>> = Arc::new(OnceLock::new());
        let supplier: FunctionReflectorSupplier = {
            let slot = Arc::clone(&function_slot);
            Arc::new(move || slot.get().and_then(Weak::upgrade))
        };
        let ast_locator = AstLocator::new(Arc::clone(&parser), supplier);

        let source_stubber: Option<Arc<dyn SourceStubber>> = config.stubs.then(|| {
            Arc::new(PhpStormStubsSourceStubber::new(
                Arc::clone(&parser),
                config.php_version,
            )) as Arc<dyn SourceStubber>
        });

        let source_locator =
            build_chain(&root, &config, &ast_locator, source_stubber.as_ref(), extra)?;
        let presence_locator = build_chain(
            &root,
            &config,
            &ast_locator.identifier_only(),
            source_stubber.as_ref(),
            extra,
        )?;

        let class_reflector = Arc::new(
            ClassReflector::new(Arc::clone(&source_locator)).with_name_rules(Arc::clone(&rules)),
        );
        let function_reflector = Arc::new(
            FunctionReflector::new(Arc::clone(&source_locator), Arc::clone(&class_reflector))
                .with_name_rules(Arc::clone(&rules)),
        );
        let constant_reflector = Arc::new(
            ConstantReflector::new(Arc::clone(&source_locator), Arc::clone(&class_reflector))
                .with_name_rules(Arc::clone(&rules)),
        );
        let _ = function_slot.set(Arc::downgrade(&function_reflector));

        tracing::debug!("reflection container ready for {}", root.display());
        Ok(BetterReflection {
            root,
            config,
            rules,
            ast_locator,
            source_stubber,
            source_locator,
            presence_locator,
            class_reflector,
            function_reflector,
            constant_reflector,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ReflectionConfig {
        &self.config
    }

    pub fn ast_locator(&self) -> &AstLocator {
        &self.ast_locator
    }

    pub fn source_locator(&self) -> &Arc<dyn SourceLocator> {
        &self.source_locator
    }

    /// `None` when stubs are disabled.
    pub fn source_stubber(&self) -> Option<&Arc<dyn SourceStubber>> {
        self.source_stubber.as_ref()
    }

    pub fn class_reflector(&self) -> &Arc<ClassReflector> {
        &self.class_reflector
    }

    pub fn function_reflector(&self) -> &Arc<FunctionReflector> {
        &self.function_reflector
    }

    pub fn constant_reflector(&self) -> &Arc<ConstantReflector> {
        &self.constant_reflector
    }

    pub fn has_class(&self, class_name: &str) -> Result<bool> {
        self.is_locatable(class_name, IdentifierType::Class, self.class_reflector.as_ref())
    }

    pub fn has_function(&self, function_name: &str) -> Result<bool> {
        self.is_locatable(
            function_name,
            IdentifierType::Function,
            self.function_reflector.as_ref(),
        )
    }

    pub fn has_constant(&self, constant_name: &str) -> Result<bool> {
        self.is_locatable(
            constant_name,
            IdentifierType::Constant,
            self.constant_reflector.as_ref(),
        )
    }

    fn is_locatable(&self, name: &str, kind: IdentifierType, reflector: &dyn Reflector) -> Result<bool> {
        let identifier = Identifier::with_rules(name, kind, &self.rules);
        Ok(self
            .presence_locator
            .locate_identifier(reflector, &identifier)?
            .is_some())
    }

    /// Reflect the closure a host runtime describes by file and line.
    pub fn reflect_closure(&self, closure: Arc<dyn RuntimeClosure>) -> Result<Arc<ReflectionFunction>> {
        let locator = ClosureSourceLocator::new(closure, self.ast_locator.clone());
        FunctionReflector::new(Arc::new(locator), Arc::clone(&self.class_reflector))
            .with_name_rules(Arc::clone(&self.rules))
            .reflect("{closure}")
    }

    /// Every class, function and constant declared in one file, in that
    /// order.
    pub fn reflect_file(&self, path: &Path) -> Result<Vec<Reflection>> {
        let locator: Arc<dyn SourceLocator> =
            Arc::new(SingleFileSourceLocator::new(path, self.ast_locator.clone())?);
        let classes = ClassReflector::new(Arc::clone(&locator)).with_name_rules(Arc::clone(&self.rules));

        let mut reflections = Vec::new();
        for kind in [
            IdentifierType::Class,
            IdentifierType::Function,
            IdentifierType::Constant,
        ] {
            reflections.extend(locator.locate_identifiers_by_type(&classes, kind)?);
        }
        Ok(reflections)
    }
}

fn build_chain(
    root: &Path,
    config: &ReflectionConfig,
    ast_locator: &AstLocator,
    source_stubber: Option<&Arc<dyn SourceStubber>>,
    extra: LocatorFactory<'_>,
) -> Result<Arc<dyn SourceLocator>> {
    let mut chain = AggregateSourceLocator::new(extra(ast_locator)?);

    for path in &config.paths {
        let path = root.join(path);
        if path.is_dir() {
            chain.push(Box::new(DirectoriesSourceLocator::new(
                &[path],
                ast_locator.clone(),
            )?));
        } else {
            chain.push(Box::new(SingleFileSourceLocator::new(path, ast_locator.clone())?));
        }
    }

    if config.composer {
        let vendor = config
            .vendor_dir
            .clone()
            .unwrap_or_else(|| composer::vendor_dir(root));

        let mapping = composer::psr4_mapping(root, &composer::psr4_entries(root, &vendor));
        if !mapping.is_empty() {
            chain.push(Box::new(Psr4SourceLocator::new(mapping, ast_locator.clone())));
        }

        let class_map = composer::parse_autoload_classmap(root, &vendor);
        if !class_map.is_empty() {
            chain.push(Box::new(ComposerSourceLocator::new(
                Arc::new(class_map),
                ast_locator.clone(),
            )));
        }

        for file in composer::parse_autoload_files(root, &vendor) {
            chain.push(Box::new(SingleFileSourceLocator::new(file, ast_locator.clone())?));
        }
    }

    if let Some(stubber) = source_stubber {
        chain.push(Box::new(PhpInternalSourceLocator::new(
            Arc::clone(stubber),
            ast_locator.clone(),
        )));
    }

    tracing::debug!("source locator chain has {} members", chain.len());
    if config.memoize {
        Ok(Arc::new(MemoizingSourceLocator::new(chain)))
    } else {
        Ok(Arc::new(chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_locator::{ClosureLocation, StringSourceLocator};

    fn config_without_stubs() -> ReflectionConfig {
        ReflectionConfig {
            stubs: false,
            ..ReflectionConfig::default()
        }
    }

    #[test]
    fn test_configured_paths_are_searched() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("src/Model")).expect("mkdir");
        std::fs::write(
            dir.path().join("src/Model/User.php"),
            "<?php\nnamespace App\\Model;\n\nclass User {}\n",
        )
        .expect("write");
        std::fs::write(dir.path().join("helpers.php"), "<?php\nfunction helper() {}\n")
            .expect("write");

        let config = ReflectionConfig {
            paths: vec![PathBuf::from("src"), PathBuf::from("helpers.php")],
            ..config_without_stubs()
        };
        let reflection = BetterReflection::new(dir.path(), config).unwrap();

        let user = reflection.class_reflector().reflect("app\\model\\user").unwrap();
        assert_eq!(user.name(), "App\\Model\\User");
        assert!(reflection.has_function("HELPER").unwrap());
        assert!(!reflection.has_class("App\\Model\\Missing").unwrap());
    }

    #[test]
    fn test_host_locators_come_first() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let reflection = BetterReflection::with_locators(
            dir.path(),
            config_without_stubs(),
            &|ast_locator| {
                Ok(vec![Box::new(StringSourceLocator::new(
                    "<?php namespace Foo; function define() {} define('BAR', 1); const BAZ = 2;",
                    ast_locator.clone(),
                )) as Box<dyn SourceLocator>])
            },
        )
        .unwrap();

        // The namespaced define() is a call to Foo\define, not a constant.
        assert!(!reflection.has_constant("BAR").unwrap());
        assert!(reflection.has_constant("Foo\\BAZ").unwrap());
        assert!(reflection.has_function("Foo\\define").unwrap());
    }

    #[test]
    fn test_reflect_closure_and_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("closures.php");
        std::fs::write(
            &file,
            "<?php\nclass A {}\nfunction b() {}\nconst C = 1;\n$d = function ($x) {};\n",
        )
        .expect("write");
        let reflection = BetterReflection::new(dir.path(), config_without_stubs()).unwrap();

        let closure = reflection
            .reflect_closure(Arc::new(ClosureLocation::new(file.to_string_lossy(), 5)))
            .unwrap();
        assert!(closure.is_closure());
        assert_eq!(closure.number_of_parameters(), 1);

        let names: Vec<String> = reflection
            .reflect_file(&file)
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["A", "b", "C"]);
    }
}
