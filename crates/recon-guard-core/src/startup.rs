//! Process-level startup and fatal-failure handling

use std::time::Duration;

use crate::config::{load_configuration, ConfigSource, Snapshot};
use crate::error::ConfigErrors;
use crate::schema::Schema;

/// Exit status when configuration is invalid at startup
pub const EXIT_CONFIG_INVALID: i32 = 1;

/// Exit status after an unhandled panic
pub const EXIT_FATAL: i32 = 70;

/// Delay before exiting from the panic hook, giving log writers time to flush
pub const DEFAULT_FATAL_GRACE: Duration = Duration::from_secs(1);

/// Operator-facing report printed when startup validation fails
pub fn render_failures(errors: &ConfigErrors) -> String {
    let mut out = String::from("Configuration validation failed:\n");
    for line in errors.lines() {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("Fix the settings above and restart.");
    out
}

/// Load configuration or terminate the process.
///
/// This is the only path that exits on invalid configuration; the full
/// problem list goes to stderr first.
pub fn load_or_exit<S: ConfigSource + ?Sized>(source: &S, schema: &Schema) -> Snapshot {
    match load_configuration(source, schema) {
        Ok(snapshot) => snapshot,
        Err(errors) => {
            eprintln!("{}", render_failures(&errors));
            std::process::exit(EXIT_CONFIG_INVALID);
        }
    }
}

/// Install a panic hook that logs at error level, waits `grace`, and exits.
///
/// Recovery from a panic that escaped every boundary is not attempted.
pub fn install_fatal_handlers(grace: Duration) {
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        tracing::error!(
            severity = "critical",
            location = %location,
            panic = %payload,
            "unhandled panic, shutting down"
        );
        eprintln!("fatal: {} at {}", payload, location);
        std::thread::sleep(grace);
        std::process::exit(EXIT_FATAL);
    }));
}
