//! Locating operation schemas inside an OpenAPI document.

use serde_json::Value;

use crate::resolver::SchemaResolver;
use crate::types::{
    ExtractedSchemas, Operation, RefIssue, HTTP_METHODS, JSON_MEDIA_TYPE, SUCCESS_STATUS,
};

/// Extract the dereferenced request and 200-response schemas of an operation.
///
/// `method` is matched case-insensitively. A path or method the document
/// does not define yields two `None` schemas; that is not an error.
///
/// # Example
///
/// ```
/// use oas_check::extract;
/// use serde_json::json;
///
/// let document = json!({
///     "paths": {
///         "/widgets": {
///             "post": {
///                 "requestBody": { "content": { "application/json": {
///                     "schema": { "$ref": "#/components/schemas/Widget" }
///                 } } }
///             }
///         }
///     },
///     "components": { "schemas": { "Widget": { "type": "object" } } }
/// });
///
/// let schemas = extract(&document, "/widgets", "POST");
/// assert_eq!(schemas.request_schema, Some(json!({ "type": "object" })));
/// assert_eq!(schemas.response_schema, None);
/// ```
pub fn extract(document: &Value, path: &str, method: &str) -> ExtractedSchemas {
    extract_with_issues(document, path, method).0
}

/// Like [`extract`], also returning the references that resolved to `{}`.
pub fn extract_with_issues(
    document: &Value,
    path: &str,
    method: &str,
) -> (ExtractedSchemas, Vec<RefIssue>) {
    let method = method.to_lowercase();
    let Some(operation) = document
        .get("paths")
        .and_then(|paths| paths.get(path))
        .and_then(|item| item.get(method.as_str()))
    else {
        tracing::debug!(path, %method, "operation not defined");
        return (ExtractedSchemas::default(), Vec::new());
    };

    let request = operation
        .get("requestBody")
        .and_then(|body| body.get("content"))
        .and_then(json_schema_of);

    let response = operation
        .get("responses")
        .and_then(|responses| responses.get(SUCCESS_STATUS))
        .and_then(|ok| ok.get("content"))
        .and_then(json_schema_of);

    let mut resolver = SchemaResolver::new(document);
    let schemas = ExtractedSchemas {
        request_schema: request.map(|schema| resolver.resolve(schema)),
        response_schema: response.map(|schema| resolver.resolve(schema)),
    };

    tracing::debug!(
        path,
        %method,
        request = schemas.request_schema.is_some(),
        response = schemas.response_schema.is_some(),
        "extracted operation schemas"
    );

    (schemas, resolver.into_issues())
}

/// List every path in the document with the HTTP methods defined under it.
///
/// Paths keep document order. Path-item keys that are not HTTP methods
/// (`parameters`, `summary`, extensions) are skipped.
pub fn list_operations(document: &Value) -> Vec<Operation> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    paths
        .iter()
        .map(|(path, item)| {
            let methods = item
                .as_object()
                .map(|item| {
                    item.keys()
                        .filter(|key| HTTP_METHODS.contains(&key.as_str()))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Operation {
                path: path.clone(),
                methods,
            }
        })
        .collect()
}

fn json_schema_of(content: &Value) -> Option<&Value> {
    content.get(JSON_MEDIA_TYPE).and_then(|media| media.get("schema"))
}
