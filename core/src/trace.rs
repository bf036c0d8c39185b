//! Evaluation traces for debugging predicates.
//!
//! [`PredicateTrace`] mirrors the [`JsonPredicate`](crate::JsonPredicate)
//! tree but records results instead of conditions. Use
//! `evaluate_with_trace()` to see which leaves fired and what value each one
//! located in the document.
//!
//! ```
//! use jsonmatch::JsonPredicate;
//! use serde_json::json;
//!
//! let predicate = JsonPredicate::parse(&json!({
//!     "or": [
//!         {"key": "tier", "value": {"equals": "gold"}},
//!         {"key": "spend", "value": {"min_value": 100}}
//!     ]
//! })).unwrap();
//!
//! let trace = predicate.evaluate_with_trace(&json!({"tier": "silver", "spend": 250}));
//! assert!(trace.matched());
//! assert_eq!(trace.leaves().filter(|leaf| leaf.matched()).count(), 1);
//! ```

use serde_json::Value;
use std::fmt;

/// Trace of a predicate evaluation.
///
/// In `And`/`Or`, all children are evaluated (no short-circuit) so the trace
/// is complete. `matched` still equals what `apply()` returns.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateTrace {
    /// A leaf matcher evaluation.
    Matcher {
        /// Whether the leaf matched.
        matched: bool,
        /// Navigation path (`scope` followed by `key`).
        path: Vec<String>,
        /// The value found at `path`, `None` if absent.
        found: Option<Value>,
        /// The value matcher in canonical JSON.
        value: String,
    },
    /// AND: all children must match.
    And {
        /// Whether all children matched.
        matched: bool,
        /// Trace of each child.
        children: Vec<PredicateTrace>,
    },
    /// OR: any child must match.
    Or {
        /// Whether any child matched.
        matched: bool,
        /// Trace of each child.
        children: Vec<PredicateTrace>,
    },
    /// NOT: inverts inner result.
    Not {
        /// Whether the inner predicate did NOT match.
        matched: bool,
        /// Trace of the inner predicate.
        inner: Box<PredicateTrace>,
    },
}

impl PredicateTrace {
    /// Overall result of this node.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Matcher { matched, .. }
            | Self::And { matched, .. }
            | Self::Or { matched, .. }
            | Self::Not { matched, .. } => *matched,
        }
    }

    /// Leaf traces in document order (depth-first).
    pub fn leaves(&self) -> impl Iterator<Item = &PredicateTrace> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                match node {
                    Self::Matcher { .. } => return Some(node),
                    Self::And { children, .. } | Self::Or { children, .. } => {
                        stack.extend(children.iter().rev());
                    }
                    Self::Not { inner, .. } => stack.push(&**inner),
                }
            }
            None
        })
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let mark = if self.matched() { "✓" } else { "✗" };
        let pad = "  ".repeat(depth);
        match self {
            Self::Matcher {
                path, found, value, ..
            } => {
                let path = if path.is_empty() {
                    "$".to_string()
                } else {
                    path.join(".")
                };
                let found = found
                    .as_ref()
                    .map_or_else(|| "<absent>".to_string(), Value::to_string);
                writeln!(f, "{pad}{mark} {path} = {found} against {value}")
            }
            Self::And { children, .. } | Self::Or { children, .. } => {
                let name = if matches!(self, Self::And { .. }) { "and" } else { "or" };
                writeln!(f, "{pad}{mark} {name}")?;
                children
                    .iter()
                    .try_for_each(|child| child.fmt_indented(f, depth + 1))
            }
            Self::Not { inner, .. } => {
                writeln!(f, "{pad}{mark} not")?;
                inner.fmt_indented(f, depth + 1)
            }
        }
    }
}

/// Indented tree, one node per line.
impl fmt::Display for PredicateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
