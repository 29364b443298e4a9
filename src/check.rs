//! End-to-end check of request/response payloads against one operation.
//!
//! Takes raw text for every input so that malformed JSON is reported per
//! input instead of aborting the whole check.

use serde::Serialize;
use serde_json::Value;

use crate::error::InputError;
use crate::extractor::{extract_with_issues, list_operations};
use crate::resolver::close_additional_properties;
use crate::types::{Diagnostic, ExtractedSchemas, InputKind, Operation, RefIssue};
use crate::validator::validate;

/// Inputs of one check. Empty instance text counts as not supplied.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub document: String,
    pub path: String,
    pub method: String,
    pub request: Option<String>,
    pub response: Option<String>,
    /// Inject `additionalProperties: false` into the response schema's
    /// objects before validating. Defaults to true.
    pub close_response: bool,
}

impl CheckRequest {
    /// Create a check for `method` on `path` with no instances supplied.
    pub fn new(
        document: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            path: path.into(),
            method: method.into(),
            request: None,
            response: None,
            close_response: true,
        }
    }

    pub fn request(mut self, text: impl Into<String>) -> Self {
        self.request = Some(text.into());
        self
    }

    pub fn response(mut self, text: impl Into<String>) -> Self {
        self.response = Some(text.into());
        self
    }

    pub fn close_response(mut self, close: bool) -> Self {
        self.close_response = close;
        self
    }
}

/// What happened to one supplied instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstanceOutcome {
    /// No instance text, or the operation defines no schema for it.
    Skipped,
    /// The instance text is not JSON.
    Malformed { error: InputError },
    /// The operation's schema could not be compiled, so the instance was
    /// never looked at.
    InvalidSchema { message: String },
    /// Validated; an empty list means the instance conforms.
    Checked { diagnostics: Vec<Diagnostic> },
}

impl InstanceOutcome {
    pub fn is_valid(&self) -> bool {
        match self {
            InstanceOutcome::Skipped => true,
            InstanceOutcome::Malformed { .. } | InstanceOutcome::InvalidSchema { .. } => false,
            InstanceOutcome::Checked { diagnostics } => diagnostics.is_empty(),
        }
    }
}

/// Result of [`check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_error: Option<InputError>,
    pub operations: Vec<Operation>,
    pub schemas: ExtractedSchemas,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ref_issues: Vec<RefIssue>,
    pub request: InstanceOutcome,
    pub response: InstanceOutcome,
}

impl CheckReport {
    fn document_error(error: InputError) -> Self {
        Self {
            document_error: Some(error),
            operations: Vec::new(),
            schemas: ExtractedSchemas::default(),
            ref_issues: Vec::new(),
            request: InstanceOutcome::Skipped,
            response: InstanceOutcome::Skipped,
        }
    }

    /// True when the document parsed and no instance failed.
    pub fn is_valid(&self) -> bool {
        self.document_error.is_none() && self.request.is_valid() && self.response.is_valid()
    }
}

/// Run the full pipeline: parse, extract, close the response schema, validate.
pub fn check(request: &CheckRequest) -> CheckReport {
    let document: Value = match serde_json::from_str(&request.document) {
        Ok(document) => document,
        Err(e) => {
            let error = InputError::new(InputKind::Document, e.to_string());
            return CheckReport::document_error(error);
        }
    };

    let (mut schemas, ref_issues) =
        extract_with_issues(&document, &request.path, &request.method);
    if request.close_response {
        schemas.response_schema = schemas
            .response_schema
            .as_ref()
            .map(close_additional_properties);
    }

    let request_outcome = check_instance(
        InputKind::Request,
        request.request.as_deref(),
        schemas.request_schema.as_ref(),
    );
    let response_outcome = check_instance(
        InputKind::Response,
        request.response.as_deref(),
        schemas.response_schema.as_ref(),
    );

    CheckReport {
        document_error: None,
        operations: list_operations(&document),
        schemas,
        ref_issues,
        request: request_outcome,
        response: response_outcome,
    }
}

fn check_instance(
    kind: InputKind,
    text: Option<&str>,
    schema: Option<&Value>,
) -> InstanceOutcome {
    let (Some(text), Some(schema)) = (text.filter(|t| !t.trim().is_empty()), schema) else {
        tracing::debug!(%kind, "nothing to validate");
        return InstanceOutcome::Skipped;
    };

    let instance: Value = match serde_json::from_str(text) {
        Ok(instance) => instance,
        Err(e) => {
            return InstanceOutcome::Malformed {
                error: InputError::new(kind, e.to_string()),
            }
        }
    };

    match validate(&instance, schema) {
        Ok(diagnostics) => InstanceOutcome::Checked { diagnostics },
        Err(e) => {
            tracing::debug!(%kind, error = %e, "schema rejected by the validator");
            InstanceOutcome::InvalidSchema {
                message: e.to_string(),
            }
        }
    }
}
