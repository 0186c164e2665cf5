//! Recon Guard CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate the process environment against the application schema
//! recon-guard check
//!
//! # Print the configuration with secrets masked
//! recon-guard show-config --format json
//!
//! # Check a single request field value
//! recon-guard validate usernames "john,jane" --format json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Configuration invalid
//! - 2: Field value rejected
//! - 10: Internal error

use clap::Parser;
use recon_guard_cli::{run_cli, GuardCli};
use recon_guard_core::{install_fatal_handlers, startup::DEFAULT_FATAL_GRACE};

fn main() {
    install_fatal_handlers(DEFAULT_FATAL_GRACE);

    // Parse CLI arguments
    let cli = GuardCli::parse();

    // Run the CLI and exit with appropriate code
    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
