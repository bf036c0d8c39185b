//! `JsonMatcher`: locate a field in a document, then test it
//!
//! A matcher navigates `scope` (an ordered list of field names) and then an
//! optional final `key`, and hands whatever it found to its [`ValueMatcher`].
//! Conceptually the path is `scope + [key]`; the two are kept apart so rule
//! builders can share a scope prefix across many leaves.
//!
//! # Absent values
//!
//! Each navigation step yields `Option<&Value>`. A missing field, a non-object
//! at a step, and an explicit `null` all collapse into `None`, and descent
//! stops there. The value matcher then decides (most return `false`,
//! [`ValueMatcher::IsAbsent`] returns `true`).

use crate::json::{self, impl_canonical_json};
use crate::{ParseError, ParseOptions, PredicateTrace, ScopeMode, ValueMatcher};
use serde_json::{Map, Value};
use tracing::{debug, trace};

const VALUE: &str = "value";
const KEY: &str = "key";
const SCOPE: &str = "scope";
const IGNORE_CASE: &str = "ignore_case";

/// Leaf predicate: field locator plus value test.
///
/// # Example
///
/// ```
/// use jsonmatch::{JsonMatcher, ValueMatcher};
/// use serde_json::json;
///
/// let matcher = JsonMatcher::builder()
///     .scope(["a"])
///     .key("b")
///     .value(ValueMatcher::equals(5))
///     .build();
///
/// assert!(matcher.apply(&json!({"a": {"b": 5}})));
/// assert!(!matcher.apply(&json!({"a": {"b": 6}})));
/// assert!(!matcher.apply(&json!({"a": 1})));
/// assert_eq!(
///     matcher.to_json(),
///     json!({"scope": ["a"], "key": "b", "value": {"equals": 5}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonMatcher {
    scope: Vec<String>,
    key: Option<String>,
    value: ValueMatcher,
    ignore_case: Option<bool>,
}

impl JsonMatcher {
    /// Matcher over the whole document.
    #[must_use]
    pub fn new(value: ValueMatcher) -> Self {
        Self {
            scope: Vec::new(),
            key: None,
            value,
            ignore_case: None,
        }
    }

    /// Start building a matcher.
    #[must_use]
    pub fn builder() -> JsonMatcherBuilder {
        JsonMatcherBuilder::default()
    }

    /// Field names descended before `key`.
    #[must_use]
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Final field name, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The value test.
    #[must_use]
    pub fn value(&self) -> &ValueMatcher {
        &self.value
    }

    /// The ignore-case override as written (`None` = unspecified).
    #[must_use]
    pub fn ignore_case(&self) -> Option<bool> {
        self.ignore_case
    }

    /// Navigate `document` along `scope` then `key`.
    #[must_use]
    pub fn locate<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = Some(document).filter(|v| !v.is_null());
        for field in &self.scope {
            current = step(current, field);
            if current.is_none() {
                break;
            }
        }
        match &self.key {
            Some(key) => step(current, key),
            None => current,
        }
    }

    /// Evaluate against a document.
    #[must_use]
    pub fn apply(&self, document: &Value) -> bool {
        let matched = self
            .value
            .apply(self.locate(document), self.ignore_case.unwrap_or(false));
        trace!(scope = ?self.scope, key = ?self.key, matched, "json matcher evaluated");
        matched
    }

    /// Evaluate with a trace of the located value.
    #[must_use]
    pub fn evaluate_with_trace(&self, document: &Value) -> PredicateTrace {
        let found = self.locate(document);
        PredicateTrace::Matcher {
            matched: self.value.apply(found, self.ignore_case.unwrap_or(false)),
            path: self.scope.iter().chain(&self.key).cloned().collect(),
            found: found.cloned(),
            value: self.value.to_string(),
        }
    }

    /// Parse a matcher object with default [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the input is not a non-empty object, lacks
    /// `value`, or has a wrongly shaped field.
    pub fn parse(value: &Value) -> Result<Self, ParseError> {
        Self::parse_with(value, &ParseOptions::default())
    }

    /// Parse a matcher object with explicit options.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse). In [`ScopeMode::Strict`], non-string
    /// scope entries are also rejected.
    pub fn parse_with(value: &Value, options: &ParseOptions) -> Result<Self, ParseError> {
        Self::parse_at(value, json::ROOT, options)
            .inspect_err(|err| debug!(%err, "rejected json matcher"))
    }

    pub(crate) fn parse_at(
        value: &Value,
        path: &str,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let map = json::expect_object(value, path)?;

        let matcher = map.get(VALUE).ok_or_else(|| ParseError::MissingField {
            path: path.to_string(),
            field: VALUE,
        })?;
        let value = ValueMatcher::parse_at(matcher, &json::field_path(path, VALUE))?;

        let key = match json::opt_field(map, KEY) {
            None => None,
            Some(Value::String(key)) => Some(key.clone()),
            Some(other) => return Err(json::invalid_field(path, KEY, "a string", other)),
        };

        let scope = match json::opt_field(map, SCOPE) {
            None => Vec::new(),
            Some(Value::String(field)) => vec![field.clone()],
            Some(Value::Array(fields)) => parse_scope_list(fields, path, options.scope_mode)?,
            Some(other) => {
                return Err(json::invalid_field(
                    path,
                    SCOPE,
                    "a string or an array of strings",
                    other,
                ))
            }
        };

        let ignore_case = match json::opt_field(map, IGNORE_CASE) {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(other) => return Err(json::invalid_field(path, IGNORE_CASE, "a boolean", other)),
        };

        Ok(Self {
            scope,
            key,
            value,
            ignore_case,
        })
    }

    /// Serialize to the canonical wire shape. Absent optional fields are
    /// omitted, and `scope` is always written as an array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(key) = &self.key {
            map.insert(KEY.into(), Value::String(key.clone()));
        }
        if !self.scope.is_empty() {
            map.insert(
                SCOPE.into(),
                Value::Array(self.scope.iter().cloned().map(Value::String).collect()),
            );
        }
        map.insert(VALUE.into(), self.value.to_json());
        if let Some(flag) = self.ignore_case {
            map.insert(IGNORE_CASE.into(), Value::Bool(flag));
        }
        Value::Object(map)
    }

    /// Returns `true` if `map` looks like a matcher rather than a combinator.
    pub(crate) fn is_matcher_shaped(map: &Map<String, Value>) -> bool {
        [VALUE, KEY, SCOPE, IGNORE_CASE]
            .iter()
            .any(|field| map.contains_key(*field))
    }
}

impl_canonical_json!(JsonMatcher);

fn step<'a>(current: Option<&'a Value>, field: &str) -> Option<&'a Value> {
    current?
        .as_object()?
        .get(field)
        .filter(|v| !v.is_null())
}

fn parse_scope_list(
    fields: &[Value],
    path: &str,
    mode: ScopeMode,
) -> Result<Vec<String>, ParseError> {
    let mut scope = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        match (field, mode) {
            (Value::String(name), _) => scope.push(name.clone()),
            (other, ScopeMode::Lenient) => {
                debug!(
                    path = %json::index_path(&json::field_path(path, SCOPE), i),
                    found = json::type_name(other),
                    "skipping non-string scope entry"
                );
            }
            (other, ScopeMode::Strict) => {
                return Err(ParseError::InvalidField {
                    path: json::index_path(&json::field_path(path, SCOPE), i),
                    expected: "a string",
                    found: json::type_name(other),
                })
            }
        }
    }
    Ok(scope)
}

/// Builder for [`JsonMatcher`].
///
/// The value test defaults to [`ValueMatcher::IsPresent`].
#[derive(Debug, Clone, Default)]
pub struct JsonMatcherBuilder {
    scope: Vec<String>,
    key: Option<String>,
    value: Option<ValueMatcher>,
    ignore_case: Option<bool>,
}

impl JsonMatcherBuilder {
    /// Replace the scope path.
    #[must_use]
    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Append one field to the scope path.
    #[must_use]
    pub fn push_scope(mut self, field: impl Into<String>) -> Self {
        self.scope.push(field.into());
        self
    }

    /// Set the final field name.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the value test.
    #[must_use]
    pub fn value(mut self, value: ValueMatcher) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the ignore-case override.
    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = Some(ignore_case);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> JsonMatcher {
        JsonMatcher {
            scope: self.scope,
            key: self.key,
            value: self.value.unwrap_or(ValueMatcher::IsPresent),
            ignore_case: self.ignore_case,
        }
    }
}
