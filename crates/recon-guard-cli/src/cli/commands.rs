//! CLI command definitions for recon-guard
//!
//! Clap-based commands for checking the process environment against the
//! application schema, printing the masked configuration, and validating a
//! single request field value the way a request handler would.

use clap::{Parser, Subcommand, ValueEnum};
use recon_guard_core::{
    app_schema, load_configuration, redact, respond, ConfigSource, ExecutionMode, FieldError,
    InputValidator, Limits,
};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::io::Write;

use super::output::{CheckOutput, ConfigOutput, FieldOutput, OutputFormat};
use super::ExitCode;
use crate::error::Result;

/// Recon Guard CLI
///
/// Validate service configuration and request inputs.
#[derive(Parser, Debug)]
#[command(name = "recon-guard")]
#[command(about = "Recon Guard - Validate service configuration and request inputs", long_about = None)]
#[command(version)]
pub struct GuardCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: GuardCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum GuardCommands {
    /// Validate the process environment against the application schema
    ///
    /// Directories under the create policy are created as a side effect.
    Check {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the loaded configuration with secrets masked
    ShowConfig {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a single request field value
    ///
    /// Request limits come from the environment when it loads cleanly, so
    /// directories under the create policy may be created.
    Validate {
        /// Field kind to validate as
        #[arg(value_enum)]
        kind: FieldKind,

        /// Raw value, as a caller would send it
        value: String,

        /// Execution mode; only "production" enables production checks
        #[arg(long, env = "APP_ENV", default_value = "development")]
        mode: String,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl GuardCommands {
    /// Subcommand name, safe to log
    pub fn name(&self) -> &'static str {
        match self {
            GuardCommands::Check { .. } => "check",
            GuardCommands::ShowConfig { .. } => "show-config",
            GuardCommands::Validate { .. } => "validate",
        }
    }
}

/// Request field kinds accepted by `validate`
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum FieldKind {
    Username,
    Usernames,
    Token,
    Url,
    ScanMode,
    Format,
    Text,
    ApiKey,
}

impl FieldKind {
    /// Name as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Username => "username",
            FieldKind::Usernames => "usernames",
            FieldKind::Token => "token",
            FieldKind::Url => "url",
            FieldKind::ScanMode => "scan-mode",
            FieldKind::Format => "format",
            FieldKind::Text => "text",
            FieldKind::ApiKey => "api-key",
        }
    }
}

/// Execute `check`
pub fn execute_check<S: ConfigSource + ?Sized>(
    source: &S,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let schema = app_schema()?;
    let (output, code) = match load_configuration(source, &schema) {
        Ok(snapshot) => (
            CheckOutput {
                valid: true,
                mode: Some(snapshot.mode().to_string()),
                fields: snapshot.len(),
                problems: Vec::new(),
            },
            ExitCode::Success,
        ),
        Err(errors) => (
            CheckOutput {
                valid: false,
                mode: None,
                fields: 0,
                problems: errors.lines(),
            },
            ExitCode::ConfigInvalid,
        ),
    };
    output.render(format, out)?;
    Ok(code)
}

/// Execute `show-config`
pub fn execute_show_config<S: ConfigSource + ?Sized>(
    source: &S,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let schema = app_schema()?;
    match load_configuration(source, &schema) {
        Ok(snapshot) => {
            let output = ConfigOutput {
                mode: snapshot.mode().to_string(),
                values: redact::disclose(&snapshot),
            };
            output.render(format, out)?;
            Ok(ExitCode::Success)
        }
        Err(errors) => {
            let output = CheckOutput {
                valid: false,
                mode: None,
                fields: 0,
                problems: errors.lines(),
            };
            output.render(format, out)?;
            Ok(ExitCode::ConfigInvalid)
        }
    }
}

/// Run one field validator and convert the typed result to JSON.
///
/// API keys are echoed masked, never verbatim.
pub fn validate_field(
    validator: &InputValidator,
    kind: FieldKind,
    raw: &str,
) -> std::result::Result<Value, FieldError> {
    let input = Value::String(raw.to_string());
    let value = Some(&input);
    let typed = match kind {
        FieldKind::Username => Value::String(validator.username(value)?),
        FieldKind::Usernames => Value::from(validator.usernames(value)?),
        FieldKind::Token => Value::String(validator.token(value)?),
        FieldKind::Url => Value::String(validator.url(value)?.to_string()),
        FieldKind::ScanMode => Value::from(validator.scan_mode(value)?.as_str()),
        FieldKind::Format => Value::from(validator.output_format(value)?.as_str()),
        FieldKind::Text => Value::String(validator.display_text(value)?),
        FieldKind::ApiKey => {
            Value::String(redact::mask_api_key(validator.api_key(value)?.expose_secret()))
        }
    };
    Ok(typed)
}

/// Request limits from `source`, or the defaults when it does not load
fn request_limits<S: ConfigSource + ?Sized>(source: &S) -> Result<Limits> {
    let schema = app_schema()?;
    match load_configuration(source, &schema) {
        Ok(snapshot) => Ok(Limits::from_snapshot(&snapshot)),
        Err(errors) => {
            tracing::warn!(
                problems = errors.len(),
                "configuration invalid; using default request limits"
            );
            Ok(Limits::default())
        }
    }
}

/// Execute `validate`.
///
/// `mode` comes from the command line, so a value can be checked as
/// production would check it without a production environment.
pub fn execute_validate<S: ConfigSource + ?Sized>(
    source: &S,
    kind: FieldKind,
    raw: &str,
    mode: ExecutionMode,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let validator = InputValidator::new(mode, request_limits(source)?);
    let (output, code) = match validate_field(&validator, kind, raw) {
        Ok(value) => (
            FieldOutput::Valid {
                kind: kind.as_str().to_string(),
                value,
            },
            ExitCode::Success,
        ),
        Err(err) => (FieldOutput::Invalid(respond(err, mode)), ExitCode::ValidationFailed),
    };
    output.render(format, out)?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;
    use recon_guard_core::keys;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Source whose create-policy directories live in `dir`
    fn sandbox(dir: &TempDir) -> HashMap<String, String> {
        [
            (keys::LOG_DIR, dir.path().join("logs")),
            (keys::DATA_DIR, dir.path().join("data")),
        ]
        .into_iter()
        .map(|(k, p)| (k.to_string(), p.display().to_string()))
        .collect()
    }

    #[test]
    fn test_cli_definition() {
        GuardCli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate() {
        let cli = GuardCli::try_parse_from([
            "recon-guard",
            "validate",
            "scan-mode",
            "deep",
            "--mode",
            "production",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            GuardCommands::Validate {
                kind, value, mode, format,
            } => {
                assert_eq!(kind, FieldKind::ScanMode);
                assert_eq!(value, "deep");
                assert_eq!(mode, "production");
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_field_kinds() {
        let v = InputValidator::new(ExecutionMode::Development, Limits::default());
        assert_eq!(validate_field(&v, FieldKind::Usernames, "a,b").unwrap(), json!(["a", "b"]));
        assert_eq!(validate_field(&v, FieldKind::ScanMode, "Quick").unwrap(), json!("quick"));
        assert_eq!(validate_field(&v, FieldKind::Format, "csv").unwrap(), json!("csv"));
        assert_eq!(
            validate_field(&v, FieldKind::ApiKey, "sk_live_0123456789abcdef").unwrap(),
            json!("sk_live_01********")
        );
        assert!(validate_field(&v, FieldKind::Username, "../etc").is_err());
    }

    #[test]
    fn test_execute_validate_json_error_record() {
        let dir = TempDir::new().unwrap();
        let mut buf = Vec::new();
        let code = execute_validate(
            &sandbox(&dir),
            FieldKind::Url,
            "http://127.0.0.1/admin",
            ExecutionMode::Production,
            OutputFormat::Json,
            &mut buf,
        )
        .unwrap();
        assert_eq!(code, ExitCode::ValidationFailed);
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["type"], "validation_error");
        assert_eq!(value["statusCode"], 400);
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_request_limits_fall_back_on_invalid_source() {
        let dir = TempDir::new().unwrap();
        let mut source = sandbox(&dir);
        source.insert(keys::PORT.to_string(), "not-a-port".to_string());
        source.insert(keys::MAX_BATCH_USERNAMES.to_string(), "2".to_string());
        assert_eq!(request_limits(&source).unwrap(), Limits::default());
    }

    #[test]
    fn test_execute_validate_success() {
        let dir = TempDir::new().unwrap();
        let mut buf = Vec::new();
        let code = execute_validate(
            &sandbox(&dir),
            FieldKind::Url,
            "http://127.0.0.1/admin",
            ExecutionMode::Development,
            OutputFormat::Json,
            &mut buf,
        )
        .unwrap();
        assert_eq!(code, ExitCode::Success);
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["value"], "http://127.0.0.1/admin");
    }
}
