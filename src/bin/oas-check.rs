//! OpenAPI schema checker CLI
//!
//! Command-line interface for extracting operation schemas and validating
//! payloads against them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oas_check::{
    check, close_additional_properties, extract_with_issues, list_operations, load_document_auto,
    read_text, read_text_auto, CheckReport, CheckRequest, InstanceOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas-check")]
#[command(about = "Dereference OpenAPI operation schemas and validate JSON payloads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the paths and methods an OpenAPI document defines
    Paths {
        /// OpenAPI document: file path or URL (http:// or https://)
        document: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the dereferenced request and 200-response schemas of an operation
    Extract {
        /// OpenAPI document: file path or URL (http:// or https://)
        document: String,

        /// Path as written under `paths` (e.g., /widgets/{id})
        #[arg(long)]
        path: String,

        /// HTTP method (case-insensitive)
        #[arg(long, short, default_value = "post")]
        method: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Set additionalProperties=false on response object schemas
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        strict_response: bool,
    },

    /// Validate request and/or response payloads against an operation
    Validate {
        /// OpenAPI document: file path or URL (http:// or https://)
        document: String,

        /// Path as written under `paths` (e.g., /widgets/{id})
        #[arg(long)]
        path: String,

        /// HTTP method (case-insensitive)
        #[arg(long, short, default_value = "post")]
        method: String,

        /// Request payload file
        #[arg(long)]
        request: Option<PathBuf>,

        /// Response payload file
        #[arg(long)]
        response: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Reject response fields the schema does not declare
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        strict_response: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Paths { document, json } => run_paths(&document, json),

        Commands::Extract {
            document,
            path,
            method,
            output,
            pretty,
            strict_response,
        } => run_extract(ExtractArgs {
            document,
            path,
            method,
            output,
            pretty,
            strict_response,
        }),

        Commands::Validate {
            document,
            path,
            method,
            request,
            response,
            json,
            strict_response,
        } => run_validate(ValidateArgs {
            document,
            path,
            method,
            request,
            response,
            json_output: json,
            strict_response,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_paths(source: &str, json_output: bool) -> Result<(), u8> {
    let document = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let operations = list_operations(&document);

    if json_output {
        let output = serde_json::to_string(&operations).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
        return Ok(());
    }

    for operation in &operations {
        if operation.methods.is_empty() {
            println!("{:<7} {}", "-", operation.path);
        }
        for method in &operation.methods {
            println!("{:<7} {}", method.to_uppercase(), operation.path);
        }
    }

    Ok(())
}

struct ExtractArgs {
    document: String,
    path: String,
    method: String,
    output: Option<PathBuf>,
    pretty: bool,
    strict_response: bool,
}

fn run_extract(args: ExtractArgs) -> Result<(), u8> {
    let ExtractArgs {
        document: source,
        path,
        method,
        output,
        pretty,
        strict_response,
    } = args;

    let document = load_document_auto(&source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let (mut schemas, issues) = extract_with_issues(&document, &path, &method);
    for issue in &issues {
        eprintln!("Warning: {}", issue);
    }
    if schemas.request_schema.is_none() && schemas.response_schema.is_none() {
        eprintln!(
            "Warning: no JSON schemas for {} {}",
            method.to_uppercase(),
            path
        );
    }

    if strict_response {
        schemas.response_schema = schemas
            .response_schema
            .as_ref()
            .map(close_additional_properties);
    }

    let json_output = if pretty {
        serde_json::to_string_pretty(&schemas)
    } else {
        serde_json::to_string(&schemas)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

struct ValidateArgs {
    document: String,
    path: String,
    method: String,
    request: Option<PathBuf>,
    response: Option<PathBuf>,
    json_output: bool,
    strict_response: bool,
}

fn run_validate(args: ValidateArgs) -> Result<(), u8> {
    let ValidateArgs {
        document: source,
        path,
        method,
        request,
        response,
        json_output,
        strict_response,
    } = args;

    // Documents and payloads are read as text; parsing happens in the checker
    // so each malformed input is reported on its own.
    let document = read_text_auto(&source).map_err(|e| {
        report_error(json_output, &format!("loading document: {}", e));
        e.exit_code() as u8
    })?;
    let request_text = read_payload(request.as_deref(), "request", json_output)?;
    let response_text = read_payload(response.as_deref(), "response", json_output)?;

    let mut check_request =
        CheckRequest::new(document, &path, &method).close_response(strict_response);
    check_request.request = request_text;
    check_request.response = response_text;

    let report = check(&check_request);

    if json_output {
        let output = serde_json::json!({
            "valid": report.is_valid(),
            "report": report,
        });
        println!("{}", output);
    } else {
        print_report(&report, &method, &path, &check_request);
    }

    exit_status(&report)
}

fn read_payload(
    path: Option<&Path>,
    what: &str,
    json_output: bool,
) -> Result<Option<String>, u8> {
    let Some(path) = path else {
        return Ok(None);
    };
    read_text(path).map(Some).map_err(|e| {
        report_error(json_output, &format!("loading {}: {}", what, e));
        e.exit_code() as u8
    })
}

fn print_report(report: &CheckReport, method: &str, path: &str, request: &CheckRequest) {
    if let Some(error) = &report.document_error {
        eprintln!("Error: {}", error);
        return;
    }

    for issue in &report.ref_issues {
        eprintln!("Warning: {}", issue);
    }

    let operation = format!("{} {}", method.to_uppercase(), path);
    let outcomes = [
        ("Request", request.request.as_deref(), &report.request),
        ("Response", request.response.as_deref(), &report.response),
    ];

    for (label, text, outcome) in outcomes {
        match outcome {
            InstanceOutcome::Skipped => match text {
                Some(text) if text.trim().is_empty() => {
                    println!("{}: skipped (empty payload)", label);
                }
                Some(_) => {
                    println!("{}: skipped (no JSON schema for {})", label, operation);
                }
                None => {}
            },
            InstanceOutcome::Malformed { error } => {
                eprintln!("{}: Error: {}", label, error);
            }
            InstanceOutcome::InvalidSchema { message } => {
                eprintln!("{}: Error: {} ({})", label, message, operation);
            }
            InstanceOutcome::Checked { diagnostics } if diagnostics.is_empty() => {
                println!("{}: Valid", label);
            }
            InstanceOutcome::Checked { diagnostics } => {
                eprintln!("{}: Validation failed:", label);
                for diagnostic in diagnostics {
                    eprintln!("  {}", diagnostic);
                }
            }
        }
    }
}

/// Exit code: 2 for unusable input or schemas, 1 for validation failures, else success.
fn exit_status(report: &CheckReport) -> Result<(), u8> {
    let outcomes = [&report.request, &report.response];
    if report.document_error.is_some()
        || outcomes
            .iter()
            .any(|o| {
                matches!(
                    o,
                    InstanceOutcome::Malformed { .. } | InstanceOutcome::InvalidSchema { .. }
                )
            })
    {
        Err(2)
    } else if report.is_valid() {
        Ok(())
    } else {
        Err(1)
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
