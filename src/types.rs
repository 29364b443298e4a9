//! Core types shared by extraction, resolution, and validation.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// HTTP methods an OpenAPI path item may define an operation for.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Media type whose schema is extracted from request bodies and responses.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Response status whose schema is extracted.
pub const SUCCESS_STATUS: &str = "200";

/// Returns the JSON type name for messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Which piece of user input a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Document,
    Request,
    Response,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputKind::Document => "document",
            InputKind::Request => "request",
            InputKind::Response => "response",
        })
    }
}

/// Request and 200-response schemas of one operation, already dereferenced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedSchemas {
    pub request_schema: Option<Value>,
    pub response_schema: Option<Value>,
}

/// A path and the HTTP methods defined under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub path: String,
    pub methods: Vec<String>,
}

/// Why a reference was replaced by an unconstrained schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefIssueKind {
    /// The target does not exist in the document.
    Dangling,
    /// The reference is already being resolved further up the tree.
    Cycle,
    /// Not an in-document `#/<section>/<type>/<name>` reference.
    Unsupported,
    /// Reached through a longer chain of references than the resolver follows.
    DepthExceeded,
}

/// A reference the resolver degraded to `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefIssue {
    pub reference: String,
    pub kind: RefIssueKind,
}

impl fmt::Display for RefIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            RefIssueKind::Dangling => "dangling reference",
            RefIssueKind::Cycle => "reference cycle",
            RefIssueKind::Unsupported => "unsupported reference",
            RefIssueKind::DepthExceeded => "reference chain too deep at",
        };
        write!(f, "{} {}", what, self.reference)
    }
}

/// A segment in an instance path (object key or array index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "'{}'", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Single validation failure with its location in the instance and schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Human-readable error message.
    pub message: String,
    /// Keys and indexes leading to the offending value.
    pub instance_path: Vec<PathSegment>,
    /// Keywords leading to the failing constraint.
    pub schema_path: Vec<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instance: Vec<String> = self.instance_path.iter().map(|s| s.to_string()).collect();
        let schema: Vec<String> = self
            .schema_path
            .iter()
            .map(|s| format!("'{}'", s))
            .collect();
        write!(
            f,
            "Error: {} at path [{}] at schema path [{}]",
            self.message,
            instance.join(", "),
            schema.join(", ")
        )
    }
}
