//! CLI module for recon-guard
//!
//! Command-line access to the startup configuration check, the masked
//! configuration dump, and individual field validators.

pub mod commands;
pub mod output;

pub use commands::{FieldKind, GuardCli, GuardCommands};
pub use output::OutputFormat;

use recon_guard_core::{EnvSource, ExecutionMode};
use std::io;

use crate::error::Result;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Configuration failed validation
    ConfigInvalid = 1,
    /// A field value was rejected
    ValidationFailed = 2,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Run the CLI against the process environment and stdout
pub fn run(cli: GuardCli) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    tracing::debug!(command = cli.command.name(), "running command");

    match cli.command {
        GuardCommands::Check { format } => commands::execute_check(&EnvSource, format, &mut out),
        GuardCommands::ShowConfig { format } => {
            commands::execute_show_config(&EnvSource, format, &mut out)
        }
        GuardCommands::Validate {
            kind,
            value,
            mode,
            format,
        } => commands::execute_validate(
            &EnvSource,
            kind,
            &value,
            ExecutionMode::from_env_name(&mode),
            format,
            &mut out,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::ConfigInvalid), 1);
        assert_eq!(i32::from(ExitCode::ValidationFailed), 2);
        assert_eq!(i32::from(ExitCode::InternalError), 10);
    }
}
