//! Schema resolution - dereferences in-document `$ref`s and reduces combinators.

use serde_json::{Map, Value};

use crate::types::{json_type_name, RefIssue, RefIssueKind};

/// Longest chain of references followed before giving up on a branch.
pub const MAX_REF_DEPTH: usize = 256;

/// Resolve a schema node against the OpenAPI document it came from.
///
/// Every `$ref` is replaced by its resolved target, `oneOf` and `allOf`
/// collapse to their first branch, and `anyOf`/`not` keep their structure
/// with resolved children. References that cannot be followed become `{}`.
///
/// Use [`SchemaResolver`] directly to find out which references degraded.
pub fn resolve(root: &Value, node: &Value) -> Value {
    SchemaResolver::new(root).resolve(node)
}

/// Recursive `$ref` resolver bound to one OpenAPI document.
///
/// Keeps the chain of references currently being expanded, so a reference
/// that leads back to itself resolves to `{}` instead of recursing forever.
/// Chains longer than [`MAX_REF_DEPTH`] are cut off the same way.
pub struct SchemaResolver<'a> {
    root: &'a Value,
    in_progress: Vec<String>,
    issues: Vec<RefIssue>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            in_progress: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Resolve `node`, accumulating any degraded references in [`issues`](Self::issues).
    pub fn resolve(&mut self, node: &Value) -> Value {
        self.resolve_value(node)
    }

    /// References replaced by `{}` so far, in the order they were met.
    pub fn issues(&self) -> &[RefIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<RefIssue> {
        self.issues
    }

    // --- Internal implementation ---

    fn resolve_value(&mut self, value: &Value) -> Value {
        match value {
            Value::Object(map) => self.resolve_object(map),
            Value::Array(arr) => Value::Array(arr.iter().map(|v| self.resolve_value(v)).collect()),
            // Primitives pass through unchanged
            other => other.clone(),
        }
    }

    fn resolve_object(&mut self, map: &Map<String, Value>) -> Value {
        // Keyword precedence: $ref, then oneOf, then allOf. Each replaces the
        // whole mapping, siblings included.
        if let Some(reference) = map.get("$ref") {
            return self.resolve_ref(reference);
        }
        if let Some(branches) = map.get("oneOf") {
            return self.resolve_first_branch(branches);
        }
        if let Some(branches) = map.get("allOf") {
            return self.resolve_first_branch(branches);
        }

        // `anyOf` branches and the `not` schema are ordinary values here:
        // they keep their shape and get resolved children.
        let mut result = Map::new();
        for (key, value) in map {
            result.insert(key.clone(), self.resolve_value(value));
        }
        Value::Object(result)
    }

    /// Only the first branch is kept; the others are dropped without being
    /// merged, so validation checks a subset of the real constraint.
    fn resolve_first_branch(&mut self, branches: &Value) -> Value {
        match branches.as_array().and_then(|arr| arr.first()) {
            Some(first) => self.resolve_value(first),
            None => unconstrained(),
        }
    }

    fn resolve_ref(&mut self, reference: &Value) -> Value {
        let Some(reference) = reference.as_str() else {
            let shown = format!("<{}>", json_type_name(reference));
            self.record(shown, RefIssueKind::Unsupported);
            return unconstrained();
        };

        let Some([section, kind, name]) = split_reference(reference) else {
            self.record(reference.to_string(), RefIssueKind::Unsupported);
            return unconstrained();
        };

        // Segments past the third are ignored, so key the chain on the target.
        let target_key = format!("#/{}/{}/{}", section, kind, name);
        if self.in_progress.contains(&target_key) {
            self.record(reference.to_string(), RefIssueKind::Cycle);
            return unconstrained();
        }
        if self.in_progress.len() >= MAX_REF_DEPTH {
            self.record(reference.to_string(), RefIssueKind::DepthExceeded);
            return unconstrained();
        }

        let root = self.root;
        let Some(target) = root
            .get(section)
            .and_then(|s| s.get(kind))
            .and_then(|t| t.get(name))
        else {
            self.record(reference.to_string(), RefIssueKind::Dangling);
            return unconstrained();
        };

        self.in_progress.push(target_key);
        let resolved = self.resolve_value(target);
        self.in_progress.pop();
        resolved
    }

    fn record(&mut self, reference: String, kind: RefIssueKind) {
        let issue = RefIssue { reference, kind };
        tracing::debug!(%issue, "replacing reference with an unconstrained schema");
        self.issues.push(issue);
    }
}

/// Split `#/<section>/<type>/<name>` into its three segments.
///
/// Segments are matched literally; JSON Pointer escapes are not decoded.
/// Anything after the third segment is ignored.
fn split_reference(reference: &str) -> Option<[&str; 3]> {
    let mut parts = reference.split('/');
    if parts.next() != Some("#") {
        return None;
    }
    let section = parts.next()?;
    let kind = parts.next()?;
    let name = parts.next()?;
    if parts.next().is_some() {
        tracing::debug!(reference, "ignoring segments after the schema name");
    }
    Some([section, kind, name])
}

fn unconstrained() -> Value {
    Value::Object(Map::new())
}

/// Return a copy of `schema` in which every object schema without an
/// `additionalProperties` keyword gets `additionalProperties: false`.
///
/// A mapping counts as an object schema when its `type` is `"object"`.
/// Existing `additionalProperties` values, including `true` and schemas,
/// are kept. Every nested mapping and array is visited.
pub fn close_additional_properties(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut result: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), close_additional_properties(v)))
                .collect();

            let is_object_schema = map.get("type").and_then(Value::as_str) == Some("object");
            if is_object_schema && !map.contains_key("additionalProperties") {
                result.insert("additionalProperties".to_string(), Value::Bool(false));
            }

            Value::Object(result)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(close_additional_properties).collect()),
        other => other.clone(),
    }
}
