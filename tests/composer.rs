mod common;

use std::path::PathBuf;

use better_reflection::composer::{
    normalise_path, parse_autoload_classmap, parse_autoload_files, parse_composer_json,
    parse_vendor_autoload_psr4, psr4_entries, vendor_dir,
};
use better_reflection::{BetterReflection, ReflectionConfig};
use common::TestWorkspace;

fn composer_only() -> ReflectionConfig {
    ReflectionConfig {
        stubs: false,
        ..ReflectionConfig::default()
    }
}

#[test]
fn test_parse_basic_psr4() {
    let ws = TestWorkspace::with_composer(
        r#"{
            "autoload": {
                "psr-4": {
                    "Klarna\\": "src/Klarna/"
                }
            }
        }"#,
    );

    let mappings = parse_composer_json(ws.root());
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].prefix, "Klarna\\");
    assert_eq!(mappings[0].base_path, "src/Klarna/");
}

#[test]
fn test_parse_autoload_dev_longest_prefix_first() {
    let ws = TestWorkspace::with_composer(
        r#"{
            "autoload": {
                "psr-4": {
                    "Klarna\\": "src/Klarna/"
                }
            },
            "autoload-dev": {
                "psr-4": {
                    "Klarna\\Rest\\Tests\\": "tests/"
                }
            }
        }"#,
    );

    let mappings = psr4_entries(ws.root(), "vendor");
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0].prefix, "Klarna\\Rest\\Tests\\");
    assert_eq!(mappings[0].base_path, "tests/");
    assert_eq!(mappings[1].prefix, "Klarna\\");
    assert_eq!(mappings[1].base_path, "src/Klarna/");
}

#[test]
fn test_parse_array_paths() {
    let ws = TestWorkspace::with_composer(
        r#"{
            "autoload": {
                "psr-4": {
                    "App\\": ["src/", "lib"]
                }
            }
        }"#,
    );

    let mappings = parse_composer_json(ws.root());
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0].base_path, "src/");
    assert_eq!(mappings[1].prefix, "App\\");
    assert_eq!(mappings[1].base_path, "lib/");
}

#[test]
fn test_prefix_without_trailing_backslash() {
    let ws = TestWorkspace::with_composer(r#"{"autoload": {"psr-4": {"App": "src"}}}"#);
    let mappings = parse_composer_json(ws.root());
    assert_eq!(mappings[0].prefix, "App\\");
    assert_eq!(mappings[0].base_path, "src/");
}

#[test]
fn test_parse_no_composer_json() {
    let ws = TestWorkspace::new();
    assert!(parse_composer_json(ws.root()).is_empty());
    assert_eq!(vendor_dir(ws.root()), "vendor");
}

#[test]
fn test_parse_invalid_json() {
    let ws = TestWorkspace::with_composer("not valid json {{{");
    assert!(parse_composer_json(ws.root()).is_empty());
}

#[test]
fn test_normalise_path() {
    assert_eq!(normalise_path("src"), "src/");
    assert_eq!(normalise_path("src/"), "src/");
    assert_eq!(normalise_path("src\\Foo"), "src/Foo/");
    assert_eq!(normalise_path(""), "");
}

#[test]
fn test_vendor_autoload_basic() {
    let ws = TestWorkspace::with_composer(r#"{"name": "test/project"}"#);
    ws.write(
        "vendor/composer/autoload_psr4.php",
        r#"<?php

// autoload_psr4.php @generated by Composer

$vendorDir = dirname(__DIR__);
$baseDir = dirname($vendorDir);

return array(
    'voku\\' => array($vendorDir . '/voku/portable-ascii/src/voku'),
    'App\\' => array($baseDir . '/src', $baseDir . '/lib'),
);
"#,
    );

    let mappings = parse_vendor_autoload_psr4(ws.root(), "vendor");
    assert_eq!(mappings.len(), 3);
    assert_eq!(mappings[0].prefix, "voku\\");
    assert_eq!(mappings[0].base_path, "vendor/voku/portable-ascii/src/voku/");
    assert_eq!(mappings[1].prefix, "App\\");
    assert_eq!(mappings[1].base_path, "src/");
    assert_eq!(mappings[2].base_path, "lib/");
}

#[test]
fn test_vendor_autoload_missing_file_returns_empty() {
    let ws = TestWorkspace::with_composer(r#"{"name": "test/project"}"#);
    assert!(parse_vendor_autoload_psr4(ws.root(), "vendor").is_empty());
}

#[test]
fn test_vendor_autoload_custom_vendor_dir() {
    let ws = TestWorkspace::with_composer(r#"{"config": {"vendor-dir": "php-packages/"}}"#);
    ws.write(
        "php-packages/composer/autoload_psr4.php",
        r#"<?php
return array(
    'Monolog\\' => array($vendorDir . '/monolog/monolog/src/Monolog'),
);
"#,
    );

    let vendor = vendor_dir(ws.root());
    assert_eq!(vendor, "php-packages");
    let mappings = psr4_entries(ws.root(), &vendor);
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].prefix, "Monolog\\");
    assert_eq!(mappings[0].base_path, "php-packages/monolog/monolog/src/Monolog/");
}

#[test]
fn test_vendor_entries_duplicating_composer_json_are_merged() {
    let ws = TestWorkspace::with_composer(r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#);
    ws.write(
        "vendor/composer/autoload_psr4.php",
        r#"<?php
return array(
    'App\\' => array($baseDir . '/src'),
);
"#,
    );

    let mappings = psr4_entries(ws.root(), "vendor");
    assert_eq!(mappings.len(), 1);
}

#[test]
fn test_classmap_entries() {
    let ws = TestWorkspace::with_composer(r#"{"name": "test/project"}"#);
    let classmap_content = concat!(
        "<?php\n",
        "\n",
        "// autoload_classmap.php @generated by Composer\n",
        "\n",
        "$vendorDir = dirname(__DIR__);\n",
        "$baseDir = dirname($vendorDir);\n",
        "\n",
        "return array(\n",
        "    'AWS\\\\CRT\\\\Auth\\\\AwsCredentials' => $vendorDir . '/aws/aws-crt-php/src/AWS/CRT/Auth/AwsCredentials.php',\n",
        "    'App\\\\Legacy' => $baseDir . '/legacy/Legacy.php',\n",
        ");\n",
    );
    ws.write("vendor/composer/autoload_classmap.php", classmap_content);

    let classmap = parse_autoload_classmap(ws.root(), "vendor");
    assert_eq!(classmap.len(), 2);
    assert!(
        classmap["AWS\\CRT\\Auth\\AwsCredentials"]
            .ends_with("vendor/aws/aws-crt-php/src/AWS/CRT/Auth/AwsCredentials.php")
    );
    assert_eq!(classmap["App\\Legacy"], ws.path("legacy/Legacy.php"));
}

#[test]
fn test_classmap_missing_file_returns_empty() {
    let ws = TestWorkspace::new();
    assert!(parse_autoload_classmap(ws.root(), "vendor").is_empty());
}

#[test]
fn test_autoload_files_skip_missing_entries() {
    let ws = TestWorkspace::with_composer(r#"{"autoload":{"psr-4":{}}}"#);
    ws.write("vendor/amphp/amp/src/functions.php", "<?php\nfunction delay(float $s): void {}\n");
    ws.write("helpers.php", "<?php\nfunction helper() {}\n");
    let autoload_content = concat!(
        "<?php\n",
        "return array(\n",
        "    '88254829cb0eed057c30eaabb6d8edc4' => $vendorDir . '/amphp/amp/src/functions.php',\n",
        "    '6e3fae29631ef280660b3cdad06f25a8' => $vendorDir . '/symfony/missing/function.php',\n",
        "    'a4a119a56e50fbb293281d9a48007e0e' => $baseDir . '/helpers.php',\n",
        ");\n",
    );
    ws.write("vendor/composer/autoload_files.php", autoload_content);

    let files = parse_autoload_files(ws.root(), "vendor");
    assert_eq!(
        files,
        vec![
            ws.path("vendor/amphp/amp/src/functions.php"),
            ws.path("helpers.php"),
        ]
    );
}

#[test]
fn test_psr4_class_resolves_through_container() {
    let ws = TestWorkspace::with_composer(r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#);
    ws.write(
        "src/Models/User.php",
        "<?php\nnamespace App\\Models;\n\nclass User {\n    public string $name;\n}\n",
    );

    let reflection = BetterReflection::new(ws.root(), composer_only()).unwrap();
    let class = reflection.class_reflector().reflect("\\App\\Models\\User").unwrap();
    assert_eq!(class.name(), "App\\Models\\User");
    assert_eq!(class.start_line(), 4);
    let expected: PathBuf = ws.path("src/Models/User.php");
    assert_eq!(class.file_name(), Some(&*expected.to_string_lossy()));
    assert!(class.property("name").is_some());
}

#[test]
fn test_longest_prefix_wins() {
    let ws = TestWorkspace::with_composer(
        r#"{"autoload": {"psr-4": {"App\\": "src/", "App\\Tests\\": "tests/"}}}"#,
    );
    ws.write("tests/Unit.php", "<?php\nnamespace App\\Tests;\nclass Unit {}\n");

    let reflection = BetterReflection::new(ws.root(), composer_only()).unwrap();
    let class = reflection.class_reflector().reflect("App\\Tests\\Unit").unwrap();
    assert!(class.file_name().unwrap().ends_with("tests/Unit.php"));
}

#[test]
fn test_nonexistent_class_is_not_found() {
    let ws = TestWorkspace::with_composer(r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#);
    ws.mkdir("src");

    let reflection = BetterReflection::new(ws.root(), composer_only()).unwrap();
    let err = reflection.class_reflector().reflect("App\\Missing").unwrap_err();
    assert!(err.is_not_found());
    assert!(!reflection.has_class("App\\Missing").unwrap());
}

#[test]
fn test_classmap_and_autoload_files_feed_the_container() {
    let ws = TestWorkspace::with_composer(r#"{"name": "test/project"}"#);
    ws.write("legacy/Legacy.php", "<?php\nclass Legacy {}\n");
    ws.write("bootstrap.php", "<?php\nfunction boot(): void {}\nconst BOOTED = true;\n");
    ws.write(
        "vendor/composer/autoload_classmap.php",
        "<?php\nreturn array(\n    'Legacy' => $baseDir . '/legacy/Legacy.php',\n);\n",
    );
    ws.write(
        "vendor/composer/autoload_files.php",
        "<?php\nreturn array(\n    'abc' => $baseDir . '/bootstrap.php',\n);\n",
    );

    let reflection = BetterReflection::new(ws.root(), composer_only()).unwrap();
    assert_eq!(reflection.class_reflector().reflect("legacy").unwrap().name(), "Legacy");
    assert!(reflection.has_function("boot").unwrap());
    let constant = reflection.constant_reflector().reflect("BOOTED").unwrap();
    assert_eq!(constant.value().map(|value| value.to_php_string()), Some("1".to_string()));
}
