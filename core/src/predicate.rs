//! `JsonPredicate`: Boolean composition of [`JsonMatcher`] leaves
//!
//! ```json
//! { "and": [ { "key": "a", "value": { "is_present": true } }, ... ] }
//! { "or":  [ ... ] }
//! { "not": { "key": "a", "value": { "equals": 1 } } }
//! ```
//!
//! Any object without a combinator key is parsed as a leaf matcher.

use crate::json::{self, impl_canonical_json};
use crate::{JsonMatcher, ParseError, ParseOptions, PredicateTrace};
use serde_json::{Map, Value};
use tracing::debug;

const AND: &str = "and";
const OR: &str = "or";
const NOT: &str = "not";

/// Composite predicate with boolean logic.
///
/// Evaluation short-circuits: `And` stops at the first `false`, `Or` at the
/// first `true`.
///
/// `And` and `Or` must have at least one child. Parsing and the
/// [`and`](Self::and)/[`or`](Self::or) constructors enforce this; a value
/// built directly from the variants can be checked with
/// [`validate`](Self::validate).
///
/// # Example
///
/// ```
/// use jsonmatch::JsonPredicate;
/// use serde_json::json;
///
/// let rule = JsonPredicate::parse(&json!({
///     "and": [
///         {"scope": ["properties"], "key": "plan", "value": {"equals": "pro"}},
///         {"not": {"key": "opted_out", "value": {"equals": true}}}
///     ]
/// })).unwrap();
///
/// assert!(rule.apply(&json!({"properties": {"plan": "pro"}})));
/// assert!(!rule.apply(&json!({"properties": {"plan": "pro"}, "opted_out": true})));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonPredicate {
    /// A leaf matcher.
    Matcher(JsonMatcher),

    /// All predicates must match (logical AND).
    /// Short-circuits on the first `false`.
    And(Vec<JsonPredicate>),

    /// Any predicate must match (logical OR).
    /// Short-circuits on the first `true`.
    Or(Vec<JsonPredicate>),

    /// Inverts the result of the inner predicate (logical NOT).
    Not(Box<JsonPredicate>),
}

impl From<JsonMatcher> for JsonPredicate {
    fn from(matcher: JsonMatcher) -> Self {
        Self::Matcher(matcher)
    }
}

impl JsonPredicate {
    /// AND over `children`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyCombinator`] if `children` is empty.
    pub fn and(children: Vec<Self>) -> Result<Self, ParseError> {
        non_empty(AND, &children)?;
        Ok(Self::And(children))
    }

    /// OR over `children`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyCombinator`] if `children` is empty.
    pub fn or(children: Vec<Self>) -> Result<Self, ParseError> {
        non_empty(OR, &children)?;
        Ok(Self::Or(children))
    }

    /// Negation of `child`.
    #[must_use]
    pub fn not(child: impl Into<Self>) -> Self {
        Self::Not(Box::new(child.into()))
    }

    /// Compose with AND, skipping the wrapper when there is one predicate.
    ///
    /// - Empty → `None`
    /// - Single → unwrapped
    /// - Multiple → `And(predicates)`
    #[must_use]
    pub fn from_all(predicates: Vec<Self>) -> Option<Self> {
        Self::compose(predicates, Self::And)
    }

    /// Compose with OR, skipping the wrapper when there is one predicate.
    ///
    /// Symmetric with [`from_all`](Self::from_all).
    #[must_use]
    pub fn from_any(predicates: Vec<Self>) -> Option<Self> {
        Self::compose(predicates, Self::Or)
    }

    fn compose(mut predicates: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Option<Self> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(wrap(predicates)),
        }
    }

    /// Evaluate this predicate against a document.
    ///
    /// Recursive; depth is bounded at parse time by
    /// [`ParseOptions::max_depth`].
    #[must_use]
    pub fn apply(&self, document: &Value) -> bool {
        match self {
            Self::Matcher(m) => m.apply(document),
            Self::And(predicates) => predicates.iter().all(|p| p.apply(document)),
            Self::Or(predicates) => predicates.iter().any(|p| p.apply(document)),
            Self::Not(p) => !p.apply(document),
        }
    }

    /// Evaluate with full trace for debugging.
    ///
    /// Unlike [`apply()`](Self::apply), this does NOT short-circuit
    /// And/Or: all children are evaluated. The `matched` result is the same.
    #[must_use]
    pub fn evaluate_with_trace(&self, document: &Value) -> PredicateTrace {
        match self {
            Self::Matcher(m) => m.evaluate_with_trace(document),
            Self::And(predicates) => {
                let children: Vec<PredicateTrace> = predicates
                    .iter()
                    .map(|p| p.evaluate_with_trace(document))
                    .collect();
                let matched = children.iter().all(PredicateTrace::matched);
                PredicateTrace::And { matched, children }
            }
            Self::Or(predicates) => {
                let children: Vec<PredicateTrace> = predicates
                    .iter()
                    .map(|p| p.evaluate_with_trace(document))
                    .collect();
                let matched = children.iter().any(PredicateTrace::matched);
                PredicateTrace::Or { matched, children }
            }
            Self::Not(p) => {
                let inner = p.evaluate_with_trace(document);
                PredicateTrace::Not {
                    matched: !inner.matched(),
                    inner: Box::new(inner),
                }
            }
        }
    }

    /// Depth of this predicate tree. A lone matcher has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Matcher(_) => 1,
            Self::And(ps) | Self::Or(ps) => 1 + ps.iter().map(Self::depth).max().unwrap_or(0),
            Self::Not(p) => 1 + p.depth(),
        }
    }

    /// Number of leaf matchers.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Matcher(_) => 1,
            Self::And(ps) | Self::Or(ps) => ps.iter().map(Self::leaf_count).sum(),
            Self::Not(p) => p.leaf_count(),
        }
    }

    /// Check arity and limits for a tree built by hand.
    ///
    /// # Errors
    ///
    /// Returns the first violation of non-empty `And`/`Or`,
    /// [`ParseOptions::max_children`] or [`ParseOptions::max_depth`].
    pub fn validate(&self, options: &ParseOptions) -> Result<(), ParseError> {
        let depth = self.depth();
        if depth > options.max_depth {
            return Err(ParseError::DepthExceeded {
                depth,
                max: options.max_depth,
            });
        }
        self.validate_at(json::ROOT, options)
    }

    fn validate_at(&self, path: &str, options: &ParseOptions) -> Result<(), ParseError> {
        let (kind, children) = match self {
            Self::Matcher(_) => return Ok(()),
            Self::Not(p) => return p.validate_at(&json::field_path(path, NOT), options),
            Self::And(ps) => (AND, ps),
            Self::Or(ps) => (OR, ps),
        };
        let field = json::field_path(path, kind);
        non_empty(kind, children).map_err(|_| ParseError::EmptyCombinator {
            path: field.clone(),
            kind,
        })?;
        check_width(&field, children.len(), options)?;
        children
            .iter()
            .enumerate()
            .try_for_each(|(i, child)| child.validate_at(&json::index_path(&field, i), options))
    }

    /// Parse a predicate with default [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for any malformed node. There is no partial
    /// result: one bad clause rejects the whole predicate.
    pub fn parse(value: &Value) -> Result<Self, ParseError> {
        Self::parse_with(value, &ParseOptions::default())
    }

    /// Parse a predicate with explicit options.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_with(value: &Value, options: &ParseOptions) -> Result<Self, ParseError> {
        Self::parse_at(value, json::ROOT, options, 1)
            .inspect_err(|err| debug!(%err, "rejected json predicate"))
    }

    fn parse_at(
        value: &Value,
        path: &str,
        options: &ParseOptions,
        depth: usize,
    ) -> Result<Self, ParseError> {
        if depth > options.max_depth {
            return Err(ParseError::DepthExceeded {
                depth,
                max: options.max_depth,
            });
        }

        let map = json::expect_object(value, path)?;
        let combinators: Vec<&'static str> = [AND, OR, NOT]
            .into_iter()
            .filter(|kind| map.contains_key(*kind))
            .collect();

        match combinators.as_slice() {
            [] if JsonMatcher::is_matcher_shaped(map) => {
                JsonMatcher::parse_at(value, path, options).map(Self::Matcher)
            }
            [] => Err(ParseError::UnrecognizedPredicate {
                path: path.to_string(),
            }),
            [_] if JsonMatcher::is_matcher_shaped(map) => Err(ParseError::ConflictingKeys {
                path: path.to_string(),
                keys: combinators.clone(),
            }),
            [NOT] => Self::parse_not(&map[NOT], &json::field_path(path, NOT), options, depth),
            &[kind] => {
                let field = json::field_path(path, kind);
                let children = Self::parse_children(&map[kind], &field, kind, options, depth)?;
                Ok(if kind == AND {
                    Self::And(children)
                } else {
                    Self::Or(children)
                })
            }
            _ => Err(ParseError::ConflictingKeys {
                path: path.to_string(),
                keys: combinators.clone(),
            }),
        }
    }

    fn parse_children(
        value: &Value,
        path: &str,
        kind: &'static str,
        options: &ParseOptions,
        depth: usize,
    ) -> Result<Vec<Self>, ParseError> {
        let Value::Array(items) = value else {
            return Err(ParseError::InvalidField {
                path: path.to_string(),
                expected: "an array of predicates",
                found: json::type_name(value),
            });
        };
        if items.is_empty() {
            return Err(ParseError::EmptyCombinator {
                path: path.to_string(),
                kind,
            });
        }
        check_width(path, items.len(), options)?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::parse_at(item, &json::index_path(path, i), options, depth + 1))
            .collect()
    }

    fn parse_not(
        value: &Value,
        path: &str,
        options: &ParseOptions,
        depth: usize,
    ) -> Result<Self, ParseError> {
        let child = match value {
            Value::Object(_) => Self::parse_at(value, path, options, depth + 1)?,
            Value::Array(items) if items.len() == 1 => {
                Self::parse_at(&items[0], &json::index_path(path, 0), options, depth + 1)?
            }
            Value::Array(items) => {
                return Err(ParseError::NotArity {
                    path: path.to_string(),
                    count: items.len(),
                })
            }
            other => {
                return Err(ParseError::InvalidField {
                    path: path.to_string(),
                    expected: "a predicate object",
                    found: json::type_name(other),
                })
            }
        };
        Ok(Self::Not(Box::new(child)))
    }

    /// Serialize to the canonical wire shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let (kind, body) = match self {
            Self::Matcher(m) => return m.to_json(),
            Self::And(ps) => (AND, Value::Array(ps.iter().map(Self::to_json).collect())),
            Self::Or(ps) => (OR, Value::Array(ps.iter().map(Self::to_json).collect())),
            Self::Not(p) => (NOT, p.to_json()),
        };
        let mut map = Map::new();
        map.insert(kind.into(), body);
        Value::Object(map)
    }
}

impl_canonical_json!(JsonPredicate);

fn non_empty(kind: &'static str, children: &[JsonPredicate]) -> Result<(), ParseError> {
    if children.is_empty() {
        return Err(ParseError::EmptyCombinator {
            path: json::field_path(json::ROOT, kind),
            kind,
        });
    }
    Ok(())
}

fn check_width(path: &str, count: usize, options: &ParseOptions) -> Result<(), ParseError> {
    if count > options.max_children {
        return Err(ParseError::TooManyChildren {
            path: path.to_string(),
            count,
            max: options.max_children,
        });
    }
    Ok(())
}
