mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use better_reflection::node_compiler::CompiledValue;
use better_reflection::source_locator::{
    AggregateSourceLocator, ClosureLocation, MemoizingSourceLocator, Psr4Mapping,
    Psr4SourceLocator, SourceLocator, StringSourceLocator,
};
use better_reflection::{
    BetterReflection, Error, Identifier, IdentifierType, Reflection, ReflectionConfig, Reflector,
    Result,
};
use common::{TestWorkspace, ast_locator, reflectors_for_source, reflectors_over};

fn string_locator(source: &str) -> Box<dyn SourceLocator> {
    Box::new(StringSourceLocator::new(source, ast_locator()))
}

fn offline_config() -> ReflectionConfig {
    ReflectionConfig {
        stubs: false,
        composer: false,
        ..ReflectionConfig::default()
    }
}

/// Counts calls that reach the wrapped locator.
struct Counting {
    inner: Box<dyn SourceLocator>,
    calls: AtomicUsize,
}

impl SourceLocator for Counting {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.locate_identifier(reflector, identifier)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.locate_identifiers_by_type(reflector, identifier_type)
    }
}

#[test]
fn test_not_found_carries_the_identifier() {
    let reflectors = reflectors_for_source("<?php class Foo {}");
    match reflectors.classes.reflect("\\Foo\\Missing") {
        Err(Error::IdentifierNotFound { identifier }) => {
            assert_eq!(identifier.name(), "Foo\\Missing");
            assert_eq!(identifier.kind(), IdentifierType::Class);
        }
        other => panic!("expected not found, got {:?}", other.map(|class| class.name().to_string())),
    }

    match reflectors.functions.reflect("missing_fn") {
        Err(Error::IdentifierNotFound { identifier }) => {
            assert_eq!(identifier, Identifier::new("missing_fn", IdentifierType::Function));
        }
        _ => panic!("expected not found"),
    }
}

#[test]
fn test_aggregate_first_locator_wins() {
    let aggregate = AggregateSourceLocator::new(vec![
        string_locator("<?php class Foo { const WHO = 'a'; }"),
        string_locator("<?php\n\nclass Foo { const WHO = 'b'; }\nclass Bar {}"),
    ]);
    let reflectors = reflectors_over(Arc::new(aggregate));

    let foo = reflectors.classes.reflect("Foo").unwrap();
    assert_eq!(foo.constant("WHO").unwrap().value(), &CompiledValue::String("a".to_string()));
    assert_eq!(reflectors.classes.reflect("Bar").unwrap().start_line(), 4);
}

#[test]
fn test_aggregate_stops_at_unparseable_locator() {
    let aggregate = AggregateSourceLocator::new(vec![
        string_locator("<?php class {"),
        string_locator("<?php class Foo {}"),
    ]);
    let reflectors = reflectors_over(Arc::new(aggregate));

    let err = reflectors.classes.reflect("Foo").unwrap_err();
    assert!(matches!(err, Error::ParseToAstFailure { .. }), "got {err:?}");
    assert!(reflectors.classes.get_all_classes().is_err());
}

#[test]
fn test_aggregate_bulk_results_concatenate_without_dedup() {
    let aggregate = AggregateSourceLocator::new(vec![
        string_locator("<?php class Foo {} class A {}"),
        string_locator("<?php class Foo {} class B {}"),
    ]);
    let reflectors = reflectors_over(Arc::new(aggregate));

    let names: Vec<String> = reflectors
        .classes
        .get_all_classes()
        .unwrap()
        .iter()
        .map(|class| class.name().to_string())
        .collect();
    assert_eq!(names, vec!["Foo", "A", "Foo", "B"]);
}

#[test]
fn test_empty_aggregate_finds_nothing() {
    let reflectors = reflectors_over(Arc::new(AggregateSourceLocator::default()));
    assert!(reflectors.constants.reflect("FOO").unwrap_err().is_not_found());
    assert!(reflectors.functions.get_all_functions().unwrap().is_empty());
}

#[test]
fn test_memoized_reflectors_share_instances() {
    let counting = Arc::new(Counting {
        inner: string_locator("<?php function f() {}"),
        calls: AtomicUsize::new(0),
    });
    let memoized = MemoizingSourceLocator::new(Arc::clone(&counting));
    let reflectors = reflectors_over(Arc::new(memoized));

    let first = reflectors.functions.reflect("f").unwrap();
    let second = reflectors.functions.reflect("F").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(reflectors.functions.reflect("g").is_err());
    assert!(reflectors.functions.reflect("g").is_err());
    assert_eq!(counting.calls.load(Ordering::SeqCst), 2);

    // A different reflector has its own cache bucket.
    assert!(reflectors.constants.reflect("f").is_err());
    assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_psr4_candidates() {
    let mapping = Psr4Mapping::from_array_mappings(vec![(
        "Foo\\".to_string(),
        vec!["/project/src".to_string()],
    )]);

    assert_eq!(
        mapping.resolve_possible_file_paths(&Identifier::new("Foo\\Bar", IdentifierType::Class)),
        vec![PathBuf::from("/project/src/Bar.php")]
    );
    assert!(
        mapping
            .resolve_possible_file_paths(&Identifier::new("Foo", IdentifierType::Class))
            .is_empty()
    );
    assert!(
        mapping
            .resolve_possible_file_paths(&Identifier::new("Foo\\bar", IdentifierType::Function))
            .is_empty()
    );
}

#[test]
fn test_psr4_locator_lists_classes_in_mapped_directories() {
    let ws = TestWorkspace::new();
    ws.write("src/Bar.php", "<?php\nnamespace Foo;\nclass Bar {}\n");
    ws.write("src/Sub/Baz.php", "<?php\nnamespace Foo\\Sub;\nclass Baz {}\n");
    let mapping = Psr4Mapping::from_array_mappings(vec![(
        "Foo\\".to_string(),
        vec![ws.path("src").to_string_lossy().to_string()],
    )]);
    let reflectors = reflectors_over(Arc::new(Psr4SourceLocator::new(mapping, ast_locator())));

    assert_eq!(reflectors.classes.reflect("Foo\\Sub\\Baz").unwrap().start_line(), 3);
    let names: Vec<String> = reflectors
        .classes
        .get_all_classes()
        .unwrap()
        .iter()
        .map(|class| class.name().to_string())
        .collect();
    assert_eq!(names, vec!["Foo\\Bar", "Foo\\Sub\\Baz"]);
}

#[test]
fn test_round_trip_name() {
    let reflectors = reflectors_for_source(
        "<?php namespace Foo; class Bar {} function baz() {} const QUX = 1;",
    );
    assert_eq!(reflectors.classes.reflect("Foo\\Bar").unwrap().name(), "Foo\\Bar");
    assert_eq!(reflectors.functions.reflect("Foo\\baz").unwrap().name(), "Foo\\baz");
    assert_eq!(reflectors.constants.reflect("Foo\\QUX").unwrap().name(), "Foo\\QUX");

    let folded = reflectors.classes.reflect("foo\\BAR").unwrap();
    assert!(folded.name().eq_ignore_ascii_case("foo\\BAR"));
}

#[test]
fn test_string_sourced_class_has_no_file_name() {
    let reflectors = reflectors_for_source("<?php class Foo {}");
    let class = reflectors.classes.reflect("Foo").unwrap();
    assert_eq!(class.file_name(), None);

    let context = class.compiler_context(reflectors.classes.as_ref());
    assert!(!context.has_file_name());
    assert!(matches!(context.file_name(), Err(Error::NoFileName)));
    assert_eq!(context.self_class().unwrap(), "Foo");
}

#[test]
fn test_resolve_value_follows_references() {
    let reflectors = reflectors_for_source(concat!(
        "<?php\n",
        "class Limits { const MAX = 10 * 2; }\n",
        "const TOP = Limits::MAX;\n",
        "const ALIAS = TOP;\n",
        "const BROKEN = Limits::NOPE;\n",
    ));

    let alias = reflectors.constants.reflect("ALIAS").unwrap();
    assert_eq!(alias.value(), Some(&CompiledValue::ConstantRef("TOP".to_string())));
    assert_eq!(reflectors.constants.resolve_value(&alias).unwrap(), CompiledValue::Int(20));

    let broken = reflectors.constants.reflect("BROKEN").unwrap();
    let err = reflectors.constants.resolve_value(&broken).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_parameter_class_resolves_imports() {
    let aggregate = AggregateSourceLocator::new(vec![
        string_locator("<?php namespace Lib; class Thing {}"),
        string_locator(
            "<?php namespace App; use Lib\\Thing; function f(?Thing $t, int $i, Thing|int $u) {}",
        ),
    ]);
    let reflectors = reflectors_over(Arc::new(aggregate));
    let function = reflectors.functions.reflect("App\\f").unwrap();

    let class = reflectors.functions.parameter_class(&function, "t").unwrap().unwrap();
    assert_eq!(class.name(), "Lib\\Thing");
    assert!(reflectors.functions.parameter_class(&function, "i").unwrap().is_none());
    assert!(reflectors.functions.parameter_class(&function, "u").unwrap().is_none());
    assert!(reflectors.functions.parameter_class(&function, "missing").unwrap().is_none());
}

#[test]
fn test_get_all_constants_include_defines() {
    let reflectors = reflectors_for_source(
        "<?php const A = 1, B = 2; define('C', 3); if (true) { define('D', 4); }",
    );
    let names: Vec<String> = reflectors
        .constants
        .get_all_constants()
        .unwrap()
        .iter()
        .map(|constant| constant.name().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
}

#[test]
fn test_closure_through_container() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "closures.php",
        "<?php\nnamespace App;\n\n$double = fn (int $x) => $x * 2;\n$pair = [function () {}, function () {}];\n",
    );
    let reflection = BetterReflection::new(ws.root(), offline_config()).unwrap();

    let closure = reflection
        .reflect_closure(Arc::new(ClosureLocation::new(path.to_string_lossy(), 4)))
        .unwrap();
    assert!(closure.is_closure());
    assert_eq!(closure.name(), "{closure}");
    assert_eq!(closure.namespace_name(), Some("App"));
    assert_eq!(closure.parameters()[0].type_hint(), Some("int"));

    let err = reflection
        .reflect_closure(Arc::new(ClosureLocation::new(path.to_string_lossy(), 5)))
        .unwrap_err();
    match err {
        Error::TwoClosuresOnSameLine { file_name, line } => {
            assert_eq!(file_name, path.to_string_lossy());
            assert_eq!(line, 5);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = reflection
        .reflect_closure(Arc::new(ClosureLocation::new("/app/x.php(3) : eval()'d code", 1)))
        .unwrap_err();
    assert!(matches!(err, Error::EvaledClosureCannotBeLocated));
}

#[test]
fn test_container_reads_config_file() {
    let ws = TestWorkspace::new();
    ws.write(
        "better-reflection.toml",
        "stubs = false\ncomposer = false\nmemoize = false\npaths = [\"lib\"]\n",
    );
    ws.write("lib/Helpers/Str.php", "<?php\nnamespace Helpers;\nfunction slug() {}\n");

    let reflection = BetterReflection::from_root(ws.root()).unwrap();
    assert!(!reflection.config().memoize);
    assert!(reflection.source_stubber().is_none());
    assert!(reflection.has_function("Helpers\\slug").unwrap());
    assert!(!reflection.has_class("Helpers\\slug").unwrap());
}

#[test]
fn test_invalid_config_is_reported() {
    let ws = TestWorkspace::new();
    ws.write("better-reflection.toml", "no-such-key = 1\n");
    let err = BetterReflection::from_root(ws.root()).err().expect("config should be rejected");
    assert!(matches!(err, Error::Config { .. }));
}
