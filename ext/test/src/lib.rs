//! jsonmatch-test: test documents and conformance fixtures
//!
//! Provides a small builder for nested JSON documents and, behind the
//! `fixtures` feature, a YAML fixture runner that drives the engine from
//! data files.
//!
//! # Example
//!
//! ```
//! use jsonmatch_test::prelude::*;
//! use serde_json::json;
//!
//! // TestDocument places values at nested paths
//! let doc = TestDocument::new()
//!     .with(&["user", "properties", "tier"], "gold")
//!     .with(&["event"], "purchase")
//!     .build();
//!
//! assert_eq!(doc, json!({"user": {"properties": {"tier": "gold"}}, "event": "purchase"}));
//! ```

use serde_json::{Map, Value};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Builder for nested JSON test documents.
///
/// Intermediate objects are created on demand. Writing through a path that
/// already holds a non-object replaces it with an object.
#[derive(Debug, Clone, Default)]
pub struct TestDocument {
    root: Map<String, Value>,
}

impl TestDocument {
    /// Create an empty document (`{}`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `value` at `path` (builder pattern). An empty path is a no-op.
    #[must_use]
    pub fn with(mut self, path: &[&str], value: impl Into<Value>) -> Self {
        insert(&mut self.root, path, value.into());
        self
    }

    /// Finish and return the document.
    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(self.root)
    }
}

fn insert(target: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            target.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let slot = target
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(next) = slot {
                insert(next, rest, value);
            }
        }
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::TestDocument;
    pub use jsonmatch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonmatch::prelude::*;
    use serde_json::json;

    #[test]
    fn test_document_builder() {
        let doc = TestDocument::new()
            .with(&["a", "b"], 1)
            .with(&["a", "c"], "x")
            .with(&["d"], json!(null))
            .build();

        assert_eq!(doc, json!({"a": {"b": 1, "c": "x"}, "d": null}));
    }

    #[test]
    fn test_document_replaces_scalar_parent() {
        let doc = TestDocument::new()
            .with(&["a"], 1)
            .with(&["a", "b"], 2)
            .build();

        assert_eq!(doc, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_document_empty_path_is_noop() {
        assert_eq!(TestDocument::new().with(&[], 1).build(), json!({}));
    }

    #[test]
    fn test_full_predicate() {
        let predicate = JsonPredicate::parse(&json!({
            "and": [
                {"scope": ["user"], "key": "role", "value": {"equals": "admin"}},
                {"not": {"scope": ["user"], "key": "suspended", "value": {"equals": true}}}
            ]
        }))
        .unwrap();

        let admin = TestDocument::new().with(&["user", "role"], "admin").build();
        let suspended = TestDocument::new()
            .with(&["user", "role"], "admin")
            .with(&["user", "suspended"], true)
            .build();

        assert!(predicate.apply(&admin));
        assert!(!predicate.apply(&suspended));
    }
}
