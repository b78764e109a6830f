mod common;

use std::sync::Arc;

use better_reflection::node_compiler::CompiledValue;
use better_reflection::reflection::{ClassKind, Visibility};
use better_reflection::source_locator::SingleFileSourceLocator;
use better_reflection::Error;
use common::{TestWorkspace, ast_locator, reflectors_for_source, reflectors_over};

#[test]
fn test_function_string_cast_with_location() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "functions.php",
        "<?php\nnamespace Ns;\n\n\nfunction f()\n{\n}\n",
    );
    let locator = SingleFileSourceLocator::new(&path, ast_locator()).unwrap();
    let reflectors = reflectors_over(Arc::new(locator));

    let function = reflectors.functions.reflect("Ns\\f").unwrap();
    let file = path.to_string_lossy();
    assert_eq!(
        function.to_string(),
        format!("Function [ <user> function Ns\\f ] {{\n  @@ {} 5 - 7\n}}", file)
    );
}

#[test]
fn test_function_string_cast_lists_parameters() {
    let reflectors = reflectors_for_source("<?php function f($a, $b) {}");
    let function = reflectors.functions.reflect("f").unwrap();
    assert_eq!(
        function.to_string(),
        "Function [ <user> function f ] {\n\n  - Parameters [2] {\n    Parameter #0 [ <required> $a ]\n    Parameter #1 [ <required> $b ]\n  }\n}"
    );
}

#[test]
fn test_parameter_details() {
    let reflectors = reflectors_for_source(
        "<?php function g(int $a, ?string &$b = null, $c = 1 + 2, ...$rest): void {}",
    );
    let function = reflectors.functions.reflect("G").unwrap();
    assert_eq!(function.number_of_parameters(), 4);
    assert_eq!(function.number_of_required_parameters(), 1);
    assert_eq!(function.return_type(), Some("void"));

    let a = function.parameter("a").unwrap();
    assert_eq!(a.type_hint(), Some("int"));
    assert!(!a.is_optional());

    let b = function.parameter("b").unwrap();
    assert!(b.is_passed_by_reference());
    assert_eq!(b.default_value(), Some(&CompiledValue::Null));

    let c = function.parameter("c").unwrap();
    assert_eq!(c.position(), 2);
    assert_eq!(c.default_value(), Some(&CompiledValue::Int(3)));
    assert_eq!(c.default_value_text(), Some("1 + 2"));

    let rest = function.parameter("rest").unwrap();
    assert!(rest.is_variadic());
    assert!(rest.is_optional());
}

#[test]
fn test_constant_string_casts() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "constants.php",
        concat!(
            "<?php\n",
            "namespace NS;\n",
            "\n",
            "\n",
            "const BY_CONST = true;\n",
            "const BY_CONST_1 = 1,\n",
            "    BY_CONST_2 = 2;\n",
            "define('NS\\BY_DEFINE', 'define');\n",
        ),
    );
    let locator = SingleFileSourceLocator::new(&path, ast_locator()).unwrap();
    let reflectors = reflectors_over(Arc::new(locator));
    let file = path.to_string_lossy();

    let by_const = reflectors.constants.reflect("NS\\BY_CONST").unwrap();
    assert_eq!(
        by_const.to_string(),
        format!("Constant [ <user> boolean NS\\BY_CONST ] {{\n  @@ {} 5 - 5\n 1 }}", file)
    );

    let by_const_2 = reflectors.constants.reflect("NS\\BY_CONST_2").unwrap();
    assert_eq!(
        by_const_2.to_string(),
        format!("Constant [ <user> integer NS\\BY_CONST_2 ] {{\n  @@ {} 6 - 7\n 2 }}", file)
    );

    let by_define = reflectors.constants.reflect("NS\\BY_DEFINE").unwrap();
    assert!(by_define.is_define());
    assert_eq!(
        by_define.to_string(),
        format!("Constant [ <user> string NS\\BY_DEFINE ] {{\n  @@ {} 8 - 8\n define }}", file)
    );
}

#[test]
fn test_constant_from_string_has_no_location() {
    let reflectors = reflectors_for_source("<?php const FOO = 'a' . 'b';");
    let constant = reflectors.constants.reflect("FOO").unwrap();
    assert_eq!(constant.to_string(), "Constant [ <user> string FOO ] { ab }");
    assert_eq!(constant.file_name(), None);
}

#[test]
fn test_constant_names_are_case_sensitive() {
    let reflectors = reflectors_for_source("<?php const FOO = 1;");
    let err = reflectors.constants.reflect("foo").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_file_constant_in_string_source_fails() {
    let reflectors = reflectors_for_source("<?php const WHERE = __FILE__;");
    let err = reflectors.constants.reflect("WHERE").unwrap_err();
    assert!(matches!(err, Error::NoFileName));
}

#[test]
fn test_class_members() {
    let reflectors = reflectors_for_source(concat!(
        "<?php\n",
        "namespace App;\n",
        "\n",
        "use Other\\Base;\n",
        "\n",
        "abstract class Foo extends Base implements \\Countable\n",
        "{\n",
        "    use Helpers;\n",
        "\n",
        "    const A = 1;\n",
        "    protected const B = self::A + 1;\n",
        "\n",
        "    public static int $count = 0;\n",
        "    private $x, $y;\n",
        "\n",
        "    public function __construct(private readonly string $name) {}\n",
        "\n",
        "    /** @return Base|null */\n",
        "    abstract protected function make(): ?Base;\n",
        "\n",
        "    final public static function create() {}\n",
        "}\n",
    ));

    let class = reflectors.classes.reflect("app\\foo").unwrap();
    assert_eq!(class.name(), "App\\Foo");
    assert_eq!(class.short_name(), "Foo");
    assert_eq!(class.namespace_name(), Some("App"));
    assert_eq!(class.kind(), ClassKind::Class);
    assert!(class.is_abstract());
    assert_eq!(class.parent_class_name(), Some("Other\\Base"));
    assert_eq!(class.interface_names(), ["Countable".to_string()]);
    assert_eq!(class.trait_names(), ["App\\Helpers".to_string()]);
    assert_eq!(class.start_line(), 6);
    assert_eq!(class.end_line(), 22);

    assert_eq!(class.constant("A").unwrap().value(), &CompiledValue::Int(1));
    let b = class.constant("B").unwrap();
    assert_eq!(b.value(), &CompiledValue::Int(2));
    assert_eq!(b.visibility(), Visibility::Protected);

    let names: Vec<&str> = class.properties().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["count", "x", "y", "name"]);
    let count = class.property("count").unwrap();
    assert!(count.is_static());
    assert_eq!(count.type_hint(), Some("int"));
    let name = class.property("name").unwrap();
    assert!(name.is_promoted());
    assert!(name.is_readonly());
    assert_eq!(name.visibility(), Visibility::Private);

    assert!(class.method("__construct").unwrap().is_constructor());
    let make = class.method("MAKE").unwrap();
    assert!(make.is_abstract());
    assert_eq!(make.visibility(), Visibility::Protected);
    assert_eq!(make.return_type(), Some("?Base"));
    assert_eq!(make.doc_block_return_types(), ["\\Other\\Base".to_string(), "null".to_string()]);
    assert_eq!(make.start_line(), 19);

    let create = class.method("create").unwrap();
    assert!(create.is_final());
    assert!(create.is_static());
}

#[test]
fn test_interface_methods_are_abstract() {
    let reflectors = reflectors_for_source(
        "<?php interface Shape extends Countable, Stringable { public function area(): float; }",
    );
    let class = reflectors.classes.reflect("Shape").unwrap();
    assert!(class.is_interface());
    assert_eq!(class.interface_names(), ["Countable".to_string(), "Stringable".to_string()]);
    assert!(class.method("area").unwrap().is_abstract());
}

#[test]
fn test_enum_cases_and_backing_type() {
    let reflectors = reflectors_for_source(
        "<?php enum Suit: string { case Hearts = 'H'; case Spades = 'S'; const Wild = self::Spades; }",
    );
    let class = reflectors.classes.reflect("Suit").unwrap();
    assert!(class.is_enum());
    assert!(class.is_final());
    assert_eq!(class.backing_type(), Some("string"));
    assert_eq!(class.enum_case_names(), ["Hearts".to_string(), "Spades".to_string()]);
}

#[test]
fn test_empty_interface_string_cast() {
    let reflectors = reflectors_for_source("<?php interface Foo {}");
    let class = reflectors.classes.reflect("Foo").unwrap();
    assert_eq!(
        class.to_string(),
        "Interface [ <user> interface Foo ] {\n\n  - Constants [0] {\n  }\n\n  - Properties [0] {\n  }\n\n  - Methods [0] {\n  }\n}"
    );
}

#[test]
fn test_function_docblock_return_types_resolve_imports() {
    let reflectors = reflectors_for_source(concat!(
        "<?php\n",
        "namespace App;\n",
        "use Lib\\Collection;\n",
        "/**\n",
        " * @return Collection<int, User>|false\n",
        " */\n",
        "function users() {}\n",
    ));
    let function = reflectors.functions.reflect("App\\users").unwrap();
    assert!(function.doc_comment().unwrap().contains("@return"));
    assert_eq!(
        function.doc_block_return_types(),
        ["\\Lib\\Collection<int, User>".to_string(), "false".to_string()]
    );
}

#[test]
fn test_wrong_kind_is_not_a_match() {
    let reflectors = reflectors_for_source("<?php function Foo() {}");
    assert!(reflectors.classes.reflect("Foo").unwrap_err().is_not_found());
}
