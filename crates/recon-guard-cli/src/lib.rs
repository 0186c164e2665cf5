//! Recon Guard CLI
//!
//! Operator tooling on top of `recon-guard-core`:
//!
//! ```bash
//! # Validate the current environment
//! recon-guard check
//!
//! # Print the configuration with secrets masked
//! recon-guard show-config --format json
//!
//! # Validate one field value as production would
//! recon-guard validate url http://10.0.0.1/ --mode production
//! ```

pub mod cli;
pub mod error;

pub use cli::{ExitCode, GuardCli, GuardCommands};
pub use error::{CliError, Result};

use colored::Colorize;
use recon_guard_core::{logging, ConfigSource, EnvSource, LogSettings};

/// Level selected by `-q` or `-v`, if either was given
fn flag_level(verbose: u8, quiet: bool) -> Option<&'static str> {
    match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("info"),
        (false, 2) => Some("debug"),
        (false, _) => Some("trace"),
    }
}

/// Log settings from `LOG_LEVEL` and `LOG_FORMAT`, with the verbosity flags
/// overriding the level
pub fn log_settings<S: ConfigSource + ?Sized>(source: &S, verbose: u8, quiet: bool) -> LogSettings {
    let mut settings = LogSettings::from_source(source);
    if let Some(level) = flag_level(verbose, quiet) {
        settings.level = level.to_string();
    }
    settings
}

/// Run the CLI and map failures to an exit code
pub fn run_cli(cli: GuardCli) -> ExitCode {
    if let Err(e) = logging::init(&log_settings(&EnvSource, cli.verbose, cli.quiet)) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::InternalError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use recon_guard_core::{keys, LogFormat};
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_log_settings_from_flags() {
        let empty = source(&[]);
        assert_eq!(log_settings(&empty, 0, false).level, "info");
        assert_eq!(log_settings(&empty, 2, false).level, "debug");
        assert_eq!(log_settings(&empty, 5, false).level, "trace");
        assert_eq!(log_settings(&empty, 3, true).level, "error");
    }

    #[test]
    fn test_log_settings_from_environment() {
        let env = source(&[(keys::LOG_LEVEL, "debug"), (keys::LOG_FORMAT, "json")]);
        let settings = log_settings(&env, 0, false);
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.format, LogFormat::Json);

        // Flags win over the level but keep the configured format
        let settings = log_settings(&env, 0, true);
        assert_eq!(settings.level, "error");
        assert_eq!(settings.format, LogFormat::Json);
    }
}
