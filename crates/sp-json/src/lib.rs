//! A thin wrapper over a parsed JSON document that adds slash-path
//! traversal and `#ref` alias resolution.
//!
//! The configuration format's contract only requires a tree of tagged nodes
//! supporting path lookup and aliasing; `serde_json::Value` already gives us
//! the tree, so this crate adds exactly the two operations the contract
//! names and nothing else.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonPathError {
    #[error("path {0:?} does not exist")]
    NotFound(String),
    #[error("path {0:?} does not resolve to an object")]
    NotAnObject(String),
    #[error("#ref at {0:?} points to {1:?}, which does not exist")]
    DanglingRef(String, String),
    #[error("#ref at {0:?} is combined with sibling keys, which is not allowed")]
    RefWithSiblings(String),
    #[error("#ref at {0:?} target must be a string path")]
    RefNotAString(String),
}

/// A parsed configuration document, addressable by slash path from the
/// root, with `#ref` aliases transparently resolved at lookup time.
#[derive(Debug, Clone)]
pub struct JsonTree {
    root: Value,
}

impl JsonTree {
    pub fn new(root: Value) -> JsonTree {
        JsonTree { root }
    }

    pub fn parse(text: &str) -> Result<JsonTree, serde_json::Error> {
        Ok(JsonTree::new(serde_json::from_str(text)?))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resolve a slash path (e.g. `"outputs/L/filters/0"`) from the document
    /// root, following `#ref` aliases as they are encountered. An empty path
    /// or `"/"` resolves to the document root itself.
    pub fn get(&self, path: &str) -> Result<&Value, JsonPathError> {
        let resolved_root = self.resolve_refs(&self.root, "")?;
        self.get_from(resolved_root, path)
    }

    fn get_from<'a>(&'a self, node: &'a Value, path: &str) -> Result<&'a Value, JsonPathError> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(node);
        }
        let mut current = node;
        let mut walked = String::new();
        for segment in trimmed.split('/') {
            current = self.resolve_refs(current, &walked)?;
            let next = match current {
                Value::Object(map) => map
                    .get(segment)
                    .ok_or_else(|| JsonPathError::NotFound(format!("{walked}/{segment}")))?,
                Value::Array(arr) => {
                    let index: usize = segment
                        .parse()
                        .map_err(|_| JsonPathError::NotFound(format!("{walked}/{segment}")))?;
                    arr.get(index)
                        .ok_or_else(|| JsonPathError::NotFound(format!("{walked}/{segment}")))?
                }
                _ => return Err(JsonPathError::NotAnObject(walked.clone())),
            };
            walked = format!("{walked}/{segment}");
            current = next;
        }
        self.resolve_refs(current, &walked)
    }

    /// Recursively resolve every `#ref` in the document and return an owned
    /// copy with all aliases substituted in place. Configuration compilation
    /// deserializes this resolved value directly into typed structs instead
    /// of re-resolving paths field by field.
    pub fn resolve_document(&self) -> Result<Value, JsonPathError> {
        self.resolve_deep(&self.root, "")
    }

    fn resolve_deep(&self, node: &Value, at: &str) -> Result<Value, JsonPathError> {
        let resolved = self.resolve_refs(node, at)?;
        match resolved {
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    let child_path = format!("{at}/{key}");
                    out.insert(key.clone(), self.resolve_deep(value, &child_path)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(arr) => {
                let mut out = Vec::with_capacity(arr.len());
                for (i, value) in arr.iter().enumerate() {
                    let child_path = format!("{at}/{i}");
                    out.push(self.resolve_deep(value, &child_path)?);
                }
                Ok(Value::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// If `node` is an object containing exactly one key `#ref`, follow it
    /// (recursively, in case the target is itself a `#ref`) and return the
    /// resolved subtree. A `#ref` alongside any other key is a hard error.
    fn resolve_refs<'a>(&'a self, node: &'a Value, at: &str) -> Result<&'a Value, JsonPathError> {
        let Value::Object(map) = node else {
            return Ok(node);
        };
        let Some(target) = map.get("#ref") else {
            return Ok(node);
        };
        if map.len() > 1 {
            return Err(JsonPathError::RefWithSiblings(at.to_string()));
        }
        let target_path = target
            .as_str()
            .ok_or_else(|| JsonPathError::RefNotAString(at.to_string()))?;
        let resolved = self
            .get_from(&self.root, target_path)
            .map_err(|_| JsonPathError::DanglingRef(at.to_string(), target_path.to_string()))?;
        self.resolve_refs(resolved, target_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_path_traversal() {
        let tree = JsonTree::new(json!({"a": {"b": {"c": 42}}}));
        assert_eq!(tree.get("a/b/c").unwrap(), &json!(42));
    }

    #[test]
    fn array_index_traversal() {
        let tree = JsonTree::new(json!({"a": [1, 2, 3]}));
        assert_eq!(tree.get("a/1").unwrap(), &json!(2));
    }

    #[test]
    fn empty_path_is_the_root() {
        let tree = JsonTree::new(json!({"a": 1}));
        assert_eq!(tree.get("").unwrap(), tree.root());
    }

    #[test]
    fn ref_is_substituted_transparently() {
        let tree = JsonTree::new(json!({
            "shared": {"gain": -3.0},
            "outputs": {"L": {"#ref": "shared"}}
        }));
        assert_eq!(tree.get("outputs/L/gain").unwrap(), &json!(-3.0));
    }

    #[test]
    fn ref_with_sibling_keys_is_rejected() {
        let tree = JsonTree::new(json!({
            "shared": {"gain": -3.0},
            "outputs": {"L": {"#ref": "shared", "extra": true}}
        }));
        assert!(matches!(
            tree.get("outputs/L"),
            Err(JsonPathError::RefWithSiblings(_))
        ));
    }

    #[test]
    fn dangling_ref_is_an_error() {
        let tree = JsonTree::new(json!({"outputs": {"L": {"#ref": "nope"}}}));
        assert!(matches!(tree.get("outputs/L"), Err(JsonPathError::DanglingRef(_, _))));
    }

    #[test]
    fn missing_path_is_an_error() {
        let tree = JsonTree::new(json!({"a": 1}));
        assert!(matches!(tree.get("a/b"), Err(JsonPathError::NotAnObject(_))));
        assert!(matches!(tree.get("missing"), Err(JsonPathError::NotFound(_))));
    }

    #[test]
    fn resolve_document_substitutes_refs_everywhere_in_the_tree() {
        let tree = JsonTree::new(json!({
            "shared": {"gain": -3.0},
            "outputs": {"L": {"#ref": "shared"}, "R": {"#ref": "shared"}}
        }));
        let resolved = tree.resolve_document().unwrap();
        assert_eq!(resolved["outputs"]["L"]["gain"], json!(-3.0));
        assert_eq!(resolved["outputs"]["R"]["gain"], json!(-3.0));
    }

    #[test]
    fn chained_refs_resolve_through_multiple_hops() {
        let tree = JsonTree::new(json!({
            "base": {"gain": 1.0},
            "mid": {"#ref": "base"},
            "outputs": {"L": {"#ref": "mid"}}
        }));
        assert_eq!(tree.get("outputs/L/gain").unwrap(), &json!(1.0));
    }
}
