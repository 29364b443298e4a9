//! CLI integration tests for oas-check binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("oas-check"))
}

// Helper to create a temp file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const WIDGETS: &str = r##"{
    "openapi": "3.0.3",
    "paths": {
        "/widgets": {
            "get": {
                "responses": { "200": { "content": { "application/json": {
                    "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Widget" } }
                } } } }
            },
            "post": {
                "requestBody": { "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Widget" }
                } } },
                "responses": { "200": { "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Widget" }
                } } } }
            }
        },
        "/health": {}
    },
    "components": {
        "schemas": {
            "Widget": {
                "type": "object",
                "required": ["name"],
                "properties": { "name": { "type": "string" } }
            }
        }
    }
}"##;

mod paths_command {
    use super::*;

    #[test]
    fn lists_methods_per_path() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args(["paths", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("GET     /widgets"))
            .stdout(predicate::str::contains("POST    /widgets"))
            .stdout(predicate::str::contains("-       /health"));
    }

    #[test]
    fn json_output() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args(["paths", doc.to_str().unwrap(), "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"path":"/widgets","methods":["get","post"]}"#,
            ));
    }

    #[test]
    fn missing_document_exits_3() {
        cmd()
            .args(["paths", "/nonexistent/openapi.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn malformed_document_exits_2() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", "{ nope");

        cmd()
            .args(["paths", doc.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }
}

mod extract_command {
    use super::*;

    #[test]
    fn prints_dereferenced_schemas() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args(["extract", doc.to_str().unwrap(), "--path", "/widgets"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""request_schema":{"type":"object""#))
            .stdout(predicate::str::contains("$ref").not());
    }

    #[test]
    fn closes_response_by_default() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        let output = cmd()
            .args(["extract", doc.to_str().unwrap(), "--path", "/widgets"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["response_schema"]["additionalProperties"], false);
        assert!(value["request_schema"].get("additionalProperties").is_none());
    }

    #[test]
    fn strict_response_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args([
                "extract",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--strict-response",
                "false",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("additionalProperties").not());
    }

    #[test]
    fn method_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args([
                "extract",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--method",
                "GET",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""request_schema":null"#))
            .stdout(predicate::str::contains(r#""type":"array""#));
    }

    #[test]
    fn unknown_operation_warns_and_prints_nulls() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args(["extract", doc.to_str().unwrap(), "--path", "/gadgets"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"request_schema":null,"response_schema":null}"#,
            ))
            .stderr(predicate::str::contains("no JSON schemas for POST /gadgets"));
    }

    #[test]
    fn dangling_ref_warns() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "openapi.json",
            r##"{"paths":{"/a":{"post":{"requestBody":{"content":{"application/json":{
                "schema":{"$ref":"#/components/schemas/Gone"}}}}}}}}"##,
        );

        cmd()
            .args(["extract", doc.to_str().unwrap(), "--path", "/a"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""request_schema":{}"#))
            .stderr(predicate::str::contains(
                "dangling reference #/components/schemas/Gone",
            ));
    }

    #[test]
    fn writes_output_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let output = dir.path().join("schemas.json");

        cmd()
            .args([
                "extract",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--pretty",
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("{\n"));
        assert!(content.contains(r#""request_schema""#));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_request() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let request = write_temp_file(&dir, "request.json", r#"{"name":"ok"}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Request: Valid"));
    }

    #[test]
    fn invalid_request_exits_1() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let request = write_temp_file(&dir, "request.json", r#"{"name":123}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Request: Validation failed"))
            .stderr(predicate::str::contains("at path ['name']"));
    }

    #[test]
    fn response_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let response = write_temp_file(&dir, "response.json", r#"{"name":"ok","extra":1}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--response",
                response.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("additionalProperties"));
    }

    #[test]
    fn response_allows_unknown_fields_when_not_strict() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let response = write_temp_file(&dir, "response.json", r#"{"name":"ok","extra":1}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--response",
                response.to_str().unwrap(),
                "--strict-response",
                "false",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Response: Valid"));
    }

    #[test]
    fn malformed_request_still_checks_response() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let request = write_temp_file(&dir, "request.json", "{ broken");
        let response = write_temp_file(&dir, "response.json", r#"{"name":"ok"}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
                "--response",
                response.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid request JSON"))
            .stdout(predicate::str::contains("Response: Valid"));
    }

    #[test]
    fn malformed_document_exits_2() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", "not json");
        let request = write_temp_file(&dir, "request.json", "{}");

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid document JSON"));
    }

    #[test]
    fn missing_payload_file_exits_3() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                "/nonexistent/request.json",
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("loading request"));
    }

    #[test]
    fn no_schema_is_skipped() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let request = write_temp_file(&dir, "request.json", r#"{"anything":true}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--method",
                "get",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Request: skipped (no JSON schema for GET /widgets)",
            ));
    }

    #[test]
    fn blank_payload_is_reported_as_empty() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let request = write_temp_file(&dir, "request.json", "  \n");

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Request: skipped (empty payload)"))
            .stdout(predicate::str::contains("no JSON schema").not());
    }

    #[test]
    fn draft7_incompatible_schema_blames_the_document() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "openapi.json",
            r#"{
                "paths": { "/counters": { "post": {
                    "requestBody": { "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": {
                            "n": { "type": "integer", "minimum": 0, "exclusiveMinimum": true }
                        }
                    } } } }
                } } }
            }"#,
        );
        let request = write_temp_file(&dir, "request.json", r#"{"n":5}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/counters",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Request: Error: invalid schema:"))
            .stderr(predicate::str::contains("invalid request JSON").not());
    }

    #[test]
    fn json_output_invalid() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "openapi.json", WIDGETS);
        let request = write_temp_file(&dir, "request.json", r#"{"name":123}"#);

        let output = cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
                "--json",
            ])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["report"]["request"]["status"], "checked");
        assert_eq!(
            value["report"]["request"]["diagnostics"][0]["instance_path"],
            serde_json::json!(["name"])
        );
        assert_eq!(value["report"]["response"]["status"], "skipped");
    }

    #[test]
    fn json_output_missing_document() {
        cmd()
            .args([
                "validate",
                "/nonexistent/openapi.json",
                "--path",
                "/widgets",
                "--json",
            ])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#));
    }
}

#[cfg(feature = "remote")]
mod remote_document {
    use super::*;

    #[test]
    fn validates_against_fetched_document() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/openapi.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(WIDGETS)
            .create();

        let dir = TempDir::new().unwrap();
        let request = write_temp_file(&dir, "request.json", r#"{"name":"ok"}"#);

        cmd()
            .args([
                "validate",
                &format!("{}/openapi.json", server.url()),
                "--path",
                "/widgets",
                "--request",
                request.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Request: Valid"));
    }
}
