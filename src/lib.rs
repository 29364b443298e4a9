//! OpenAPI operation schema checker
//!
//! Resolves the request and response schemas of one OpenAPI operation into
//! self-contained JSON Schemas and validates JSON payloads against them.
//!
//! # Example
//!
//! ```
//! use oas_check::{extract, validate, PathSegment};
//! use serde_json::json;
//!
//! let document = json!({
//!     "paths": {
//!         "/widgets": {
//!             "post": {
//!                 "requestBody": { "content": { "application/json": {
//!                     "schema": { "$ref": "#/components/schemas/Widget" }
//!                 } } }
//!             }
//!         }
//!     },
//!     "components": {
//!         "schemas": {
//!             "Widget": {
//!                 "type": "object",
//!                 "required": ["name"],
//!                 "properties": { "name": { "type": "string" } }
//!             }
//!         }
//!     }
//! });
//!
//! let schemas = extract(&document, "/widgets", "post");
//! let schema = schemas.request_schema.unwrap();
//!
//! let diagnostics = validate(&json!({ "name": 123 }), &schema).unwrap();
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].instance_path, vec![PathSegment::from("name")]);
//! ```
//!
//! # Resolution Rules
//!
//! | Keyword | Result |
//! |---------|--------|
//! | `$ref` | Replaced by the resolved target; `{}` if missing, cyclic, or too deep |
//! | `oneOf` | First branch only |
//! | `allOf` | First branch only (no merge) |
//! | `anyOf` | Kept, every branch resolved |
//! | `not` | Kept, nested schema resolved |
//!
//! Only in-document references of the form `#/<section>/<type>/<name>`
//! (typically `#/components/schemas/<name>`) are followed. Segments after
//! the name are ignored.

mod check;
mod error;
mod extractor;
mod loader;
mod resolver;
mod types;
mod validator;

pub use check::{check, CheckReport, CheckRequest, InstanceOutcome};
pub use error::{InputError, LoadError, ValidateError};
pub use extractor::{extract, extract_with_issues, list_operations};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, read_text, read_text_auto,
};
pub use resolver::{close_additional_properties, resolve, SchemaResolver, MAX_REF_DEPTH};
pub use types::{
    Diagnostic, ExtractedSchemas, InputKind, Operation, PathSegment, RefIssue, RefIssueKind,
    HTTP_METHODS,
};
pub use validator::validate;

#[cfg(feature = "remote")]
pub use loader::{fetch_text, load_document_url};
