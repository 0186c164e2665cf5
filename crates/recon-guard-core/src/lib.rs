//! Recon Guard Core
//!
//! Declarative validation and error handling for a service that accepts
//! untrusted input and runs with secrets in its environment.
//!
//! ## Features
//!
//! - **Rule Primitives**: Composable, ordered rule-sets that coerce raw strings into typed values
//! - **Config Schema Validation**: One-pass startup validation with aggregated failures
//! - **Field Validation**: Per-field request validators with an SSRF guard for URLs
//! - **Sanitization**: Control/bidi stripping and HTML entity substitution for display text
//! - **Secret Projection**: Idempotent masking of signing secrets, API keys, and URL credentials
//! - **Error Taxonomy**: A closed failure set rendered into non-leaking JSON responses
//!
//! ## Architecture
//!
//! 1. **Rules** (`rules`): value types, rule kinds, and rule-set evaluation.
//!
//! 2. **Schema** (`schema`): field declarations and the application schema.
//!
//! 3. **Config** (`config`): `load_configuration` and the immutable `Snapshot`.
//!
//! 4. **Fields** (`fields`, `sanitize`): request-time validators.
//!
//! 5. **Redact** (`redact`): disclosure-safe projection of a snapshot.
//!
//! 6. **Taxonomy** (`taxonomy`, `boundary`): classification, logging, and
//!    rendering of failures at the request boundary.
//!
//! ## Example
//!
//! ```rust,no_run
//! use recon_guard_core::{app_schema, load_or_exit, redact, EnvSource, InputValidator};
//! use serde_json::json;
//!
//! let schema = app_schema().expect("application schema is well formed");
//! let snapshot = load_or_exit(&EnvSource, &schema);
//!
//! println!("{}", redact::disclose(&snapshot));
//!
//! let validator = InputValidator::from_snapshot(&snapshot);
//! let names = validator.usernames(Some(&json!("john,jane"))).unwrap();
//! assert_eq!(names, vec!["john", "jane"]);
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod mode;
pub mod redact;
pub mod rules;
pub mod sanitize;
pub mod schema;
pub mod startup;
pub mod taxonomy;

pub use boundary::RequestContext;
pub use config::{load_configuration, ConfigSource, EnvSource, Snapshot};
pub use error::{ConfigError, ConfigErrors, FieldError, SchemaError};
pub use fields::{InputValidator, Limits, OutputFormat, ScanMode, ScanRequest};
pub use logging::{LogFormat, LogSettings, LoggingError};
pub use mode::ExecutionMode;
pub use rules::{ConfigValue, Rule, RuleSet, ValueType};
pub use sanitize::{escape_regex, sanitize_str, sanitize_text};
pub use schema::{app_schema, keys, FieldRole, FieldSpec, PathPolicy, Requirement, Schema};
pub use startup::{install_fatal_handlers, load_or_exit};
pub use taxonomy::{
    respond, AppError, ErrorKind, ErrorReporter, ErrorResponse, Failure, TransportFailure,
    Unclassified,
};
