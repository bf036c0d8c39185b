//! jsonmatch - JSON predicate matching
//!
//! A small expression language, itself written in JSON, that decides whether
//! a JSON document satisfies a server-authored rule. Rules are parsed once
//! from untrusted input, held immutably, and evaluated offline as often as
//! needed.
//!
//! # Architecture
//!
//! - [`ValueMatcher`]: Atomic test on one value (presence, equality, number
//!   range, version range/constraint)
//! - [`JsonMatcher`]: Leaf: navigates `scope` then `key`, applies a `ValueMatcher`
//! - [`JsonPredicate`]: Boolean composition (And, Or, Not) of leaves
//! - [`ParseOptions`]: Strictness and size limits for untrusted input
//! - [`PredicateTrace`]: Per-node evaluation results for debugging
//!
//! # Key Invariants
//!
//! 1. **Evaluation is total**: `apply` never fails. A navigation miss is an
//!    absent value, not an error.
//!
//! 2. **Parsing is all-or-nothing**: one malformed clause rejects the whole
//!    predicate with a [`ParseError`] naming the offending node.
//!
//! 3. **Round-trip**: `parse(x.to_json()) == x` for every valid value.
//!
//! # Example
//!
//! ```
//! use jsonmatch::prelude::*;
//! use serde_json::json;
//!
//! let rule = JsonPredicate::parse(&json!({
//!     "or": [
//!         {"scope": ["properties"], "key": "tier", "value": {"equals": "GOLD"}, "ignore_case": true},
//!         {"scope": ["properties"], "key": "spend", "value": {"min_value": 100}}
//!     ]
//! })).unwrap();
//!
//! assert!(rule.apply(&json!({"properties": {"tier": "gold"}})));
//! assert!(rule.apply(&json!({"properties": {"spend": 150}})));
//! assert!(!rule.apply(&json!({"properties": {"spend": 50}})));
//!
//! // Serialization gives back the shape that was parsed.
//! let again = JsonPredicate::parse(&rule.to_json()).unwrap();
//! assert_eq!(again, rule);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod json;
mod json_matcher;
mod options;
mod predicate;
mod trace;
mod value_matcher;
mod version;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use json_matcher::{JsonMatcher, JsonMatcherBuilder};
pub use options::{ParseOptions, ScopeMode};
pub use predicate::JsonPredicate;
pub use trace::PredicateTrace;
pub use value_matcher::ValueMatcher;
pub use version::{Version, VersionConstraint, VersionError};

/// Re-exported so callers need not depend on `serde_json` directly.
pub use serde_json::Value;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use jsonmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        JsonMatcher, JsonPredicate, ParseError, ParseOptions, PredicateTrace, ScopeMode,
        ValueMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum predicate nesting depth.
///
/// Evaluation recurses once per level, so this bounds stack use for rules
/// from untrusted sources. Override with [`ParseOptions::max_depth`].
pub const MAX_DEPTH: usize = 32;

/// Default maximum number of children in a single `and` / `or`.
///
/// Width-based counterpart of [`MAX_DEPTH`]. Override with
/// [`ParseOptions::max_children`].
pub const MAX_PREDICATES_PER_COMPOUND: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from parsing untrusted predicate JSON.
///
/// Every variant except [`DepthExceeded`](Self::DepthExceeded) carries the
/// location of the offending node, written `$` for the root, `.field` for
/// object members and `[i]` for array elements (e.g. `$.and[1].value`).
/// Evaluation never produces these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Expected an object.
    #[error("{path}: expected an object, found {found}")]
    NotAnObject {
        /// Location of the node.
        path: String,
        /// JSON type actually found.
        found: &'static str,
    },
    /// Object has no members.
    #[error("{path}: expected a non-empty object")]
    Empty {
        /// Location of the node.
        path: String,
    },
    /// A required member is missing.
    #[error("{path}: missing required field \"{field}\"")]
    MissingField {
        /// Location of the object.
        path: String,
        /// Name of the missing member.
        field: &'static str,
    },
    /// A recognized member holds the wrong kind of value.
    #[error("{path}: expected {expected}, found {found}")]
    InvalidField {
        /// Location of the member.
        path: String,
        /// What was expected there.
        expected: &'static str,
        /// JSON type actually found.
        found: &'static str,
    },
    /// More than one mutually exclusive key is present.
    #[error("{path}: conflicting keys {keys:?}, expected exactly one")]
    ConflictingKeys {
        /// Location of the object.
        path: String,
        /// The conflicting keys (or key families).
        keys: Vec<&'static str>,
    },
    /// A value matcher object has none of the recognized keys.
    #[error(
        "{path}: no value matcher key, expected one of is_present, equals, \
         min_value/max_value, min_version/max_version, version_matches"
    )]
    NoMatcherKey {
        /// Location of the object.
        path: String,
    },
    /// Neither a matcher nor a combinator.
    #[error(
        "{path}: not a predicate, expected a matcher with \"value\" \
         or one of \"and\", \"or\", \"not\""
    )]
    UnrecognizedPredicate {
        /// Location of the object.
        path: String,
    },
    /// `and` / `or` with no children.
    #[error("{path}: \"{kind}\" needs at least one predicate")]
    EmptyCombinator {
        /// Location of the combinator member.
        path: String,
        /// `"and"` or `"or"`.
        kind: &'static str,
    },
    /// `not` given an array whose length is not one.
    #[error("{path}: \"not\" takes exactly one predicate, found {count}")]
    NotArity {
        /// Location of the `not` member.
        path: String,
        /// Number of elements supplied.
        count: usize,
    },
    /// A version bound or constraint does not parse.
    #[error("{path}: {source}")]
    InvalidVersion {
        /// Location of the member.
        path: String,
        /// What is wrong with the version text.
        source: VersionError,
    },
    /// Nesting exceeds the configured maximum depth.
    #[error(
        "predicate nesting depth is {depth}, but maximum allowed is {max}; \
         flatten the predicate or raise max_depth"
    )]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A combinator has more children than allowed.
    #[error("{path}: combinator has {count} children, but maximum allowed is {max}")]
    TooManyChildren {
        /// Location of the combinator member.
        path: String,
        /// Number of children supplied.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl ParseError {
    /// Location of the offending node (`$` when not tied to one node).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotAnObject { path, .. }
            | Self::Empty { path }
            | Self::MissingField { path, .. }
            | Self::InvalidField { path, .. }
            | Self::ConflictingKeys { path, .. }
            | Self::NoMatcherKey { path }
            | Self::UnrecognizedPredicate { path }
            | Self::EmptyCombinator { path, .. }
            | Self::NotArity { path, .. }
            | Self::InvalidVersion { path, .. }
            | Self::TooManyChildren { path, .. } => path,
            Self::DepthExceeded { .. } => json::ROOT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as _;

    #[test]
    fn error_messages_name_the_location() {
        let err = JsonPredicate::parse(&json!({"and": [{"key": "a"}]})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "$.and[0]: missing required field \"value\""
        );
    }

    #[test]
    fn version_errors_expose_source() {
        let err = JsonMatcher::parse(&json!({"value": {"min_version": "one"}})).unwrap_err();
        assert_eq!(err.path(), "$.value.min_version");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("invalid version \"one\""));
    }

    #[test]
    fn depth_error_points_at_root() {
        let err = ParseError::DepthExceeded { depth: 40, max: 32 };
        assert_eq!(err.path(), "$");
        assert_eq!(
            err.to_string(),
            "predicate nesting depth is 40, but maximum allowed is 32; \
             flatten the predicate or raise max_depth"
        );
    }

    #[test]
    fn malformed_inputs_never_yield_defaults() {
        let leaf = json!({"key": "a", "value": {"is_present": true}});
        for bad in [
            json!({}),
            json!({"value": {"is_present": true, "equals": "x"}}),
            json!({"not": [leaf.clone(), leaf]}),
            json!({"and": []}),
        ] {
            assert!(JsonPredicate::parse(&bad).is_err(), "accepted {bad}");
        }
    }
}
