//! Output rendering for the recon-guard CLI
//!
//! Every command renders either human-readable colored text or JSON. JSON
//! output for a rejected field value is the same error record a request
//! handler would return.

use clap::ValueEnum;
use colored::Colorize;
use recon_guard_core::ErrorResponse;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

use crate::error::Result;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors
    #[default]
    Text,
    /// JSON for machine processing
    Json,
}

fn write_json<T: Serialize>(value: &T, out: &mut dyn Write) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Result of `check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub fields: usize,
    pub problems: Vec<String>,
}

impl CheckOutput {
    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
        match format {
            OutputFormat::Json => write_json(self, out),
            OutputFormat::Text => self.render_text(out),
        }
    }

    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        if self.valid {
            writeln!(
                out,
                "{} configuration valid ({} fields, {} mode)",
                "+".green(),
                self.fields,
                self.mode.as_deref().unwrap_or("unknown")
            )?;
            return Ok(());
        }

        writeln!(
            out,
            "{} configuration invalid ({} problems)",
            "x".red(),
            self.problems.len()
        )?;
        for problem in &self.problems {
            writeln!(out, "  {}", problem.red())?;
        }
        Ok(())
    }
}

/// Disclosed configuration for `show-config`
#[derive(Debug, Clone)]
pub struct ConfigOutput {
    pub mode: String,
    pub values: Value,
}

impl ConfigOutput {
    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
        match format {
            OutputFormat::Json => write_json(&self.values, out),
            OutputFormat::Text => {
                writeln!(out, "{} {}", "Mode:".cyan().bold(), self.mode)?;
                if let Value::Object(map) = &self.values {
                    let width = map.keys().map(String::len).max().unwrap_or(0);
                    for (name, value) in map {
                        let shown = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        writeln!(out, "  {:width$} = {}", name, shown, width = width)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Outcome of validating one field value
#[derive(Debug, Clone)]
pub enum FieldOutput {
    Valid { kind: String, value: Value },
    Invalid(ErrorResponse),
}

#[derive(Serialize)]
struct ValidRecord<'a> {
    valid: bool,
    kind: &'a str,
    value: &'a Value,
}

impl FieldOutput {
    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
        match (self, format) {
            (FieldOutput::Valid { kind, value }, OutputFormat::Json) => write_json(
                &ValidRecord {
                    valid: true,
                    kind,
                    value,
                },
                out,
            ),
            (FieldOutput::Invalid(response), OutputFormat::Json) => write_json(response, out),
            (FieldOutput::Valid { kind, value }, OutputFormat::Text) => {
                writeln!(out, "{} valid {}: {}", "+".green(), kind, value)?;
                Ok(())
            }
            (FieldOutput::Invalid(response), OutputFormat::Text) => {
                writeln!(
                    out,
                    "{} {} ({}): {}",
                    "x".red(),
                    response.kind,
                    response.status_code,
                    response.message.red()
                )?;
                if let Some(details) = &response.details {
                    writeln!(out, "  details: {}", details)?;
                }
                Ok(())
            }
        }
    }
}
