//! Integration tests for recon-guard CLI commands
//!
//! Commands run against an in-memory configuration source and write into a
//! buffer, so the process environment is never touched.

use recon_guard_cli::cli::commands::{execute_check, execute_show_config, execute_validate, FieldKind};
use recon_guard_cli::cli::OutputFormat;
use recon_guard_cli::ExitCode;
use recon_guard_core::{keys, ExecutionMode};
use serde_json::Value;
use std::collections::HashMap;
use tempfile::TempDir;

fn source(dir: &TempDir, extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut source: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    source.insert(
        keys::LOG_DIR.to_string(),
        dir.path().join("logs").display().to_string(),
    );
    source.insert(
        keys::DATA_DIR.to_string(),
        dir.path().join("data").display().to_string(),
    );
    source
}

fn run_json<F>(f: F) -> (ExitCode, Value)
where
    F: FnOnce(&mut Vec<u8>) -> recon_guard_cli::Result<ExitCode>,
{
    let mut buf = Vec::new();
    let code = f(&mut buf).unwrap();
    (code, serde_json::from_slice(&buf).unwrap())
}

#[test]
fn test_check_passes_in_development() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir, &[]);
    let (code, value) = run_json(|out| execute_check(&source, OutputFormat::Json, out));
    assert_eq!(code, ExitCode::Success);
    assert_eq!(value["valid"], true);
    assert_eq!(value["mode"], "development");
}

#[test]
fn test_check_lists_all_problems_in_production() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir, &[("APP_ENV", "production"), ("PORT", "0")]);
    let (code, value) = run_json(|out| execute_check(&source, OutputFormat::Json, out));
    assert_eq!(code, ExitCode::ConfigInvalid);
    let problems = value["problems"].as_array().unwrap();
    assert_eq!(problems.len(), 2);
    assert!(problems[0].as_str().unwrap().starts_with("1. PORT"));
    assert!(problems[1].as_str().unwrap().starts_with("2. SESSION_SECRET"));
}

#[test]
fn test_check_text_output() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir, &[("PORT", "not-a-port")]);
    let mut buf = Vec::new();
    let code = execute_check(&source, OutputFormat::Text, &mut buf).unwrap();
    assert_eq!(code, ExitCode::ConfigInvalid);
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("configuration invalid"));
    assert!(text.contains("PORT: must be an integer"));
}

#[test]
fn test_show_config_masks_secrets() {
    let dir = TempDir::new().unwrap();
    let secret = "z".repeat(40);
    let source = source(
        &dir,
        &[
            ("SESSION_SECRET", secret.as_str()),
            ("BREACH_API_KEY", "live_0123456789abcdef"),
        ],
    );
    let (code, value) = run_json(|out| execute_show_config(&source, OutputFormat::Json, out));
    assert_eq!(code, ExitCode::Success);
    assert_eq!(value["SESSION_SECRET"], "[REDACTED]");
    assert_eq!(value["BREACH_API_KEY"], "live_01234********");
    assert!(!value.to_string().contains(&secret));
}

#[test]
fn test_validate_rejects_private_url_in_production() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir, &[]);
    let (code, value) = run_json(|out| {
        execute_validate(
            &source,
            FieldKind::Url,
            "http://169.254.169.254/latest/meta-data",
            ExecutionMode::Production,
            OutputFormat::Json,
            out,
        )
    });
    assert_eq!(code, ExitCode::ValidationFailed);
    assert_eq!(value["type"], "validation_error");
    assert_eq!(value["error"], true);
}

#[test]
fn test_validate_sanitizes_text() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir, &[]);
    let (code, value) = run_json(|out| {
        execute_validate(
            &source,
            FieldKind::Text,
            "<img src=x onerror=alert(1)>",
            ExecutionMode::Development,
            OutputFormat::Json,
            out,
        )
    });
    assert_eq!(code, ExitCode::Success);
    assert_eq!(value["value"], "&lt;img src=x onerror=alert(1)&gt;");
}

#[test]
fn test_validate_uses_configured_batch_limit() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir, &[("MAX_BATCH_USERNAMES", "2")]);
    let (code, value) = run_json(|out| {
        execute_validate(
            &source,
            FieldKind::Usernames,
            "john,jane,bob",
            ExecutionMode::Development,
            OutputFormat::Json,
            out,
        )
    });
    assert_eq!(code, ExitCode::ValidationFailed);
    assert_eq!(value["message"], "usernames must contain at most 2 entries");

    let (code, _) = run_json(|out| {
        execute_validate(
            &source,
            FieldKind::Usernames,
            "john,jane",
            ExecutionMode::Development,
            OutputFormat::Json,
            out,
        )
    });
    assert_eq!(code, ExitCode::Success);
}
