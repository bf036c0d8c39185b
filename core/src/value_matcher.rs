//! `ValueMatcher`: the atomic test applied to a located value
//!
//! The set of tests is closed: it is fixed by the wire format, so it is an
//! enum that evaluation and serialization both match exhaustively.
//!
//! | Variant | Wire shape |
//! |---------|------------|
//! | [`IsPresent`](ValueMatcher::IsPresent) | `{"is_present": true}` |
//! | [`IsAbsent`](ValueMatcher::IsAbsent) | `{"is_present": false}` |
//! | [`Equals`](ValueMatcher::Equals) | `{"equals": <any>}` |
//! | [`NumberRange`](ValueMatcher::NumberRange) | `{"min_value": n?, "max_value": n?}` |
//! | [`VersionRange`](ValueMatcher::VersionRange) | `{"min_version": s?, "max_version": s?}` |
//! | [`VersionMatches`](ValueMatcher::VersionMatches) | `{"version_matches": s}` |

use crate::json::{self, impl_canonical_json};
use crate::{ParseError, Version, VersionConstraint};
use serde_json::{Map, Number, Value};
use tracing::debug;

const IS_PRESENT: &str = "is_present";
const EQUALS: &str = "equals";
const MIN_VALUE: &str = "min_value";
const MAX_VALUE: &str = "max_value";
const MIN_VERSION: &str = "min_version";
const MAX_VERSION: &str = "max_version";
const VERSION_MATCHES: &str = "version_matches";

/// Tests a single JSON value.
///
/// The located value is passed as `Option<&Value>`: `None` means navigation
/// found nothing. An explicit JSON `null` is treated exactly like `None`, so
/// there is a single "absent" state for every variant.
///
/// # Example
///
/// ```
/// use jsonmatch::ValueMatcher;
/// use serde_json::json;
///
/// let m = ValueMatcher::parse(&json!({"min_value": 1, "max_value": 3})).unwrap();
/// assert!(m.apply(Some(&json!(2)), false));
/// assert!(!m.apply(Some(&json!("2")), false));
/// assert!(!m.apply(None, false));
/// assert_eq!(m.to_json(), json!({"min_value": 1, "max_value": 3}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueMatcher {
    /// Value is present and not null.
    IsPresent,
    /// Value is missing or null.
    IsAbsent,
    /// Value equals the literal. Strings compare case-insensitively when
    /// `ignore_case` is set; numbers compare by value.
    Equals(Value),
    /// Value is a number within the inclusive bounds.
    NumberRange {
        /// Lower bound; `None` is unbounded.
        min: Option<Number>,
        /// Upper bound; `None` is unbounded.
        max: Option<Number>,
    },
    /// Value is a version string within the inclusive bounds.
    VersionRange {
        /// Lower bound; `None` is unbounded.
        min: Option<Version>,
        /// Upper bound; `None` is unbounded.
        max: Option<Version>,
    },
    /// Value is a version string satisfying a constraint expression.
    VersionMatches(VersionConstraint),
}

impl ValueMatcher {
    /// Matches when the value equals `expected`.
    pub fn equals(expected: impl Into<Value>) -> Self {
        Self::Equals(expected.into())
    }

    /// Matches numbers `>= min`.
    pub fn at_least(min: impl Into<Number>) -> Self {
        Self::NumberRange {
            min: Some(min.into()),
            max: None,
        }
    }

    /// Matches numbers `<= max`.
    pub fn at_most(max: impl Into<Number>) -> Self {
        Self::NumberRange {
            min: None,
            max: Some(max.into()),
        }
    }

    /// Matches numbers in `min..=max`.
    pub fn between(min: impl Into<Number>, max: impl Into<Number>) -> Self {
        Self::NumberRange {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    /// Matches version strings in the inclusive range.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidVersion`] if a bound is not a version.
    pub fn version_range(min: Option<&str>, max: Option<&str>) -> Result<Self, ParseError> {
        let parse = |field: &str, text: Option<&str>| {
            text.map(str::parse::<Version>)
                .transpose()
                .map_err(|source| ParseError::InvalidVersion {
                    path: json::field_path(json::ROOT, field),
                    source,
                })
        };
        Ok(Self::VersionRange {
            min: parse(MIN_VERSION, min)?,
            max: parse(MAX_VERSION, max)?,
        })
    }

    /// Matches version strings satisfying `expr` (see [`VersionConstraint`]).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidVersion`] if the expression is malformed.
    pub fn version_matches(expr: &str) -> Result<Self, ParseError> {
        expr.parse()
            .map(Self::VersionMatches)
            .map_err(|source| ParseError::InvalidVersion {
                path: json::field_path(json::ROOT, VERSION_MATCHES),
                source,
            })
    }

    /// Test a located value.
    ///
    /// Total: every input yields a boolean, type mismatches yield `false`.
    #[must_use]
    pub fn apply(&self, value: Option<&Value>, ignore_case: bool) -> bool {
        let value = value.filter(|v| !v.is_null());
        match self {
            Self::IsPresent => value.is_some(),
            Self::IsAbsent => value.is_none(),
            Self::Equals(expected) => {
                let actual = value.unwrap_or(&Value::Null);
                match (expected, actual) {
                    (Value::String(e), Value::String(a)) if ignore_case => {
                        json::eq_ignore_case(e, a)
                    }
                    _ => json::values_equal(expected, actual),
                }
            }
            Self::NumberRange { min, max } => {
                let Some(Value::Number(n)) = value else {
                    return false;
                };
                let above = min
                    .as_ref()
                    .map_or(true, |m| json::compare_numbers(n, m).is_some_and(|o| o.is_ge()));
                let below = max
                    .as_ref()
                    .map_or(true, |m| json::compare_numbers(n, m).is_some_and(|o| o.is_le()));
                above && below
            }
            Self::VersionRange { min, max } => {
                let Some(version) = as_version(value) else {
                    return false;
                };
                min.as_ref().map_or(true, |m| version.compare(m).is_ge())
                    && max.as_ref().map_or(true, |m| version.compare(m).is_le())
            }
            Self::VersionMatches(constraint) => {
                as_version(value).is_some_and(|version| constraint.matches(&version))
            }
        }
    }

    /// Shorthand for `apply(Some(value), false)`.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.apply(Some(value), false)
    }

    /// Parse a value matcher object.
    ///
    /// Exactly one key family must be present. Unknown keys are ignored; a
    /// recognized key holding the wrong kind of value is an error.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first problem found.
    pub fn parse(value: &Value) -> Result<Self, ParseError> {
        Self::parse_at(value, json::ROOT).inspect_err(|err| debug!(%err, "rejected value matcher"))
    }

    pub(crate) fn parse_at(value: &Value, path: &str) -> Result<Self, ParseError> {
        let map = json::expect_object(value, path)?;

        let families: Vec<&'static str> = [
            (map.contains_key(IS_PRESENT), IS_PRESENT),
            (map.contains_key(EQUALS), EQUALS),
            (
                map.contains_key(MIN_VALUE) || map.contains_key(MAX_VALUE),
                "min_value/max_value",
            ),
            (
                map.contains_key(MIN_VERSION) || map.contains_key(MAX_VERSION),
                "min_version/max_version",
            ),
            (map.contains_key(VERSION_MATCHES), VERSION_MATCHES),
        ]
        .into_iter()
        .filter_map(|(present, family)| present.then_some(family))
        .collect();

        match families.as_slice() {
            [] => Err(ParseError::NoMatcherKey {
                path: path.to_string(),
            }),
            [IS_PRESENT] => match &map[IS_PRESENT] {
                Value::Bool(true) => Ok(Self::IsPresent),
                Value::Bool(false) => Ok(Self::IsAbsent),
                other => Err(json::invalid_field(path, IS_PRESENT, "a boolean", other)),
            },
            [EQUALS] => Ok(Self::Equals(map[EQUALS].clone())),
            [VERSION_MATCHES] => match &map[VERSION_MATCHES] {
                Value::String(expr) => expr.parse().map(Self::VersionMatches).map_err(|source| {
                    ParseError::InvalidVersion {
                        path: json::field_path(path, VERSION_MATCHES),
                        source,
                    }
                }),
                other => Err(json::invalid_field(path, VERSION_MATCHES, "a string", other)),
            },
            ["min_value/max_value"] => Ok(Self::NumberRange {
                min: number_bound(map, path, MIN_VALUE)?,
                max: number_bound(map, path, MAX_VALUE)?,
            }),
            ["min_version/max_version"] => Ok(Self::VersionRange {
                min: version_bound(map, path, MIN_VERSION)?,
                max: version_bound(map, path, MAX_VERSION)?,
            }),
            _ => Err(ParseError::ConflictingKeys {
                path: path.to_string(),
                keys: families.clone(),
            }),
        }
    }

    /// Serialize to the canonical wire shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::IsPresent => {
                map.insert(IS_PRESENT.into(), Value::Bool(true));
            }
            Self::IsAbsent => {
                map.insert(IS_PRESENT.into(), Value::Bool(false));
            }
            Self::Equals(expected) => {
                map.insert(EQUALS.into(), expected.clone());
            }
            Self::NumberRange { min, max } => {
                let min = min.clone().map(Value::Number);
                let max = max.clone().map(Value::Number);
                insert_bounds(&mut map, (MIN_VALUE, min), (MAX_VALUE, max));
            }
            Self::VersionRange { min, max } => {
                let min = min.as_ref().map(|v| Value::String(v.as_str().into()));
                let max = max.as_ref().map(|v| Value::String(v.as_str().into()));
                insert_bounds(&mut map, (MIN_VERSION, min), (MAX_VERSION, max));
            }
            Self::VersionMatches(constraint) => {
                map.insert(VERSION_MATCHES.into(), Value::String(constraint.as_str().into()));
            }
        }
        Value::Object(map)
    }
}

impl_canonical_json!(ValueMatcher);

fn as_version(value: Option<&Value>) -> Option<Version> {
    value?.as_str()?.parse().ok()
}

/// Writes the bounds that are set. With neither set, the lower key is written
/// as `null` so the object still names its key family.
fn insert_bounds(
    map: &mut Map<String, Value>,
    (min_key, min): (&str, Option<Value>),
    (max_key, max): (&str, Option<Value>),
) {
    if min.is_none() && max.is_none() {
        map.insert(min_key.into(), Value::Null);
        return;
    }
    if let Some(min) = min {
        map.insert(min_key.into(), min);
    }
    if let Some(max) = max {
        map.insert(max_key.into(), max);
    }
}

fn number_bound(
    map: &Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<Option<Number>, ParseError> {
    match json::opt_field(map, field) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(other) => Err(json::invalid_field(path, field, "a number", other)),
    }
}

fn version_bound(
    map: &Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<Option<Version>, ParseError> {
    match json::opt_field(map, field) {
        None => Ok(None),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|source| ParseError::InvalidVersion {
                path: json::field_path(path, field),
                source,
            }),
        Some(other) => Err(json::invalid_field(path, field, "a string", other)),
    }
}
