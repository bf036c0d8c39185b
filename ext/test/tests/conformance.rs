//! Conformance tests that run YAML fixtures against jsonmatch
//!
//! Run with: cargo test -p jsonmatch-test --test conformance --features jsonmatch-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use jsonmatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The `fixtures/` directory at the workspace root
fn fixtures_dir() -> PathBuf {
    // Go up: ext/test -> ext -> workspace root
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("Could not find workspace root")
        .join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_navigation() {
    run_fixture_file("01_navigation.yaml");
}

#[test]
fn test_value_matchers() {
    run_fixture_file("02_value_matchers.yaml");
}

#[test]
fn test_versions() {
    run_fixture_file("03_versions.yaml");
}

#[test]
fn test_combinators() {
    run_fixture_file("04_combinators.yaml");
}

#[test]
fn test_malformed() {
    run_fixture_file("05_malformed.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<_> = fs::read_dir(fixtures_dir())
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").file_name().into_string().expect("utf-8 name"))
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_navigation.yaml",
            "02_value_matchers.yaml",
            "03_versions.yaml",
            "04_combinators.yaml",
            "05_malformed.yaml",
        ]
    );
}
