//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the jsonmatch engine.
//!
//! ```yaml
//! name: scope_navigation
//! description: Nested lookup through scope
//! predicate:
//!   scope: [user, properties]
//!   key: tier
//!   value: { equals: gold }
//! cases:
//!   - name: present
//!     document: { user: { properties: { tier: gold } } }
//!     expect: true
//! ```
//!
//! A fixture with `expect_error: true` must fail to parse; `error_path`
//! optionally pins the reported location.

use jsonmatch::{JsonPredicate, ParseError, ParseOptions};
use serde::Deserialize;
use serde_json::Value;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw predicate JSON, parsed by the engine under test.
    pub predicate: Value,
    /// Parse options; defaults when omitted.
    #[serde(default)]
    pub options: ParseOptions,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub expect_error: bool,
    #[serde(default)]
    pub error_path: Option<String>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub document: Value,
    pub expect: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Parse the fixture's predicate with its options.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`ParseError`] when the predicate is malformed.
    pub fn parse(&self) -> Result<JsonPredicate, ParseError> {
        JsonPredicate::parse_with(&self.predicate, &self.options)
    }

    /// Run all test cases and return results
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] when the predicate does not parse.
    pub fn run(&self) -> Result<Vec<CaseResult>, ParseError> {
        let predicate = self.parse()?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                let actual = predicate.apply(&case.document);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect,
                    actual,
                }
            })
            .collect())
    }

    /// Run the fixture and panic on the first failure.
    ///
    /// For accepted predicates this also checks that serialization round-trips
    /// and that traces agree with `apply`.
    pub fn run_and_assert(&self) {
        if self.expect_error {
            self.assert_rejected();
            return;
        }

        let predicate = self
            .parse()
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to parse: {e}", self.name));

        let reparsed = JsonPredicate::parse_with(&predicate.to_json(), &self.options)
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to re-parse: {e}", self.name));
        assert_eq!(
            reparsed, predicate,
            "Fixture '{}' does not round-trip",
            self.name
        );

        for case in &self.cases {
            let actual = predicate.apply(&case.document);
            assert_eq!(
                actual, case.expect,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, case.name, case.expect, actual
            );
            let trace = predicate.evaluate_with_trace(&case.document);
            assert_eq!(
                trace.matched(),
                actual,
                "Fixture '{}' case '{}' trace disagrees with apply:\n{trace}",
                self.name,
                case.name
            );
        }
    }

    fn assert_rejected(&self) {
        match self.parse() {
            Ok(predicate) => panic!(
                "Fixture '{}' expected a parse error, got {predicate}",
                self.name
            ),
            Err(err) => {
                if let Some(path) = &self.error_path {
                    assert_eq!(
                        err.path(),
                        path,
                        "Fixture '{}' reported the wrong location: {err}",
                        self.name
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FIXTURES: &str = r#"
name: presence
predicate:
  key: a
  value: { is_present: true }
cases:
  - name: present
    document: { a: 1 }
    expect: true
  - name: null_is_absent
    document: { a: null }
    expect: false
---
name: rejected
predicate: { and: [] }
expect_error: true
error_path: $.and
"#;

    #[test]
    fn multi_document_yaml_loads() {
        let fixtures = Fixture::from_yaml_multi(TWO_FIXTURES).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 2);
        assert!(fixtures[1].expect_error);
        for fixture in &fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn run_reports_failing_case() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong_expectation
predicate: { key: a, value: { equals: 1 } }
cases:
  - name: mismatch
    document: { a: 2 }
    expect: true
"#,
        )
        .unwrap();
        let results = fixture.run().unwrap();
        assert!(!results[0].passed);
        assert!(!results[0].actual);
    }

    #[test]
    fn options_apply_to_parse() {
        let fixture = Fixture::from_yaml(
            r#"
name: strict_scope
predicate: { scope: [a, 1], key: b, value: { is_present: true } }
options: { scope_mode: strict }
expect_error: true
error_path: $.scope[1]
"#,
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    #[should_panic(expected = "expected a parse error")]
    fn accepted_predicate_fails_error_fixture() {
        let fixture = Fixture::from_yaml(
            "name: ok\npredicate: { key: a, value: { is_present: true } }\nexpect_error: true\n",
        )
        .unwrap();
        fixture.run_and_assert();
    }
}
