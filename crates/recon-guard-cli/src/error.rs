//! Error types for the recon-guard CLI

use recon_guard_core::SchemaError;
use thiserror::Error;

/// Errors that abort a CLI command before it can report a result
#[derive(Error, Debug)]
pub enum CliError {
    /// The built-in schema failed its own declaration checks
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing to the terminal failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
