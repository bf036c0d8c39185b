//! Parse options.
//!
//! [`ParseOptions`] is serde-deserializable so it can sit next to rule
//! payloads in JSON or YAML configuration. Every field has a default:
//!
//! ```yaml
//! scope_mode: strict   # or lenient (default)
//! max_depth: 16        # default 32
//! max_children: 64     # default 256
//! ```

use crate::{MAX_DEPTH, MAX_PREDICATES_PER_COMPOUND};
use serde::{Deserialize, Serialize};

/// How non-string entries in a `scope` array are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    /// Skip non-string entries. Matches payloads produced by older rule
    /// authors that put numbers or nulls in scope lists.
    #[default]
    Lenient,
    /// Reject the whole predicate when a scope entry is not a string.
    Strict,
}

/// Limits and strictness applied while parsing untrusted predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Handling of non-string scope entries.
    pub scope_mode: ScopeMode,
    /// Maximum predicate nesting depth (a lone matcher has depth 1).
    pub max_depth: usize,
    /// Maximum number of children in one `and` / `or`.
    pub max_children: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            scope_mode: ScopeMode::Lenient,
            max_depth: MAX_DEPTH,
            max_children: MAX_PREDICATES_PER_COMPOUND,
        }
    }
}

impl ParseOptions {
    /// Default limits with [`ScopeMode::Strict`].
    #[must_use]
    pub fn strict() -> Self {
        Self {
            scope_mode: ScopeMode::Strict,
            ..Self::default()
        }
    }

    /// Set the scope mode.
    #[must_use]
    pub fn with_scope_mode(mut self, scope_mode: ScopeMode) -> Self {
        self.scope_mode = scope_mode;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of children per combinator.
    #[must_use]
    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient_with_core_limits() {
        let opts = ParseOptions::default();
        assert_eq!(opts.scope_mode, ScopeMode::Lenient);
        assert_eq!(opts.max_depth, MAX_DEPTH);
        assert_eq!(opts.max_children, MAX_PREDICATES_PER_COMPOUND);
    }

    #[test]
    fn deserialize_partial_yaml() {
        let opts: ParseOptions = serde_yaml::from_str("scope_mode: strict\nmax_depth: 4\n").unwrap();
        assert_eq!(opts, ParseOptions::strict().with_max_depth(4));
    }

    #[test]
    fn deserialize_empty_json_uses_defaults() {
        let opts: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ParseOptions::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<ParseOptions>(r#"{"max_dept": 3}"#).is_err());
    }
}
