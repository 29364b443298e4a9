//! Instance validation against dereferenced schemas.

use serde_json::Value;

use crate::error::ValidateError;
use crate::types::{Diagnostic, PathSegment};

/// Validate an instance against a dereferenced schema using Draft 7 rules.
///
/// Every violation is reported, not just the first. An empty vector means
/// the instance conforms.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the engine cannot compile `schema`.
pub fn validate(instance: &Value, schema: &Value) -> Result<Vec<Diagnostic>, ValidateError> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let diagnostics: Vec<Diagnostic> = validator
        .iter_errors(instance)
        .map(|e| Diagnostic {
            message: e.to_string(),
            instance_path: instance_segments(instance, &e.instance_path.to_string()),
            schema_path: pointer_segments(&e.schema_path.to_string()),
        })
        .collect();

    tracing::debug!(violations = diagnostics.len(), "validated instance");

    Ok(diagnostics)
}

/// Split a JSON Pointer into unescaped segments. The root pointer is empty.
fn pointer_segments(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        .map(|part| part.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Split an instance pointer, walking the instance so that segments stepping
/// into arrays become indexes and the rest stay keys.
fn instance_segments(instance: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut current = Some(instance);
    pointer_segments(pointer)
        .into_iter()
        .map(|part| match current.take() {
            Some(Value::Array(items)) => match part.parse::<usize>() {
                Ok(index) => {
                    current = items.get(index);
                    PathSegment::Index(index)
                }
                Err(_) => PathSegment::Key(part),
            },
            Some(Value::Object(map)) => {
                current = map.get(&part);
                PathSegment::Key(part)
            }
            _ => PathSegment::Key(part),
        })
        .collect()
}
