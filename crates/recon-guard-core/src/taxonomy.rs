//! Error taxonomy and response builder
//!
//! Every failure that reaches a request boundary is a [`Failure`]. The
//! builder classifies it with one exhaustive match, in priority order:
//!
//! 1. validation failures (`validation_error`, 400, the caller-safe message)
//! 2. application errors (their own kind, status, and message)
//! 3. known transport failures (fixed kind, status, and message)
//! 4. anything else (`internal_error`, 500)
//!
//! In production mode an unclassified failure renders only
//! `"An error occurred"`. Stacks and details are emitted outside production
//! only.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::io;
use thiserror::Error;

use crate::boundary::RequestContext;
use crate::error::{ConfigErrors, FieldError};
use crate::mode::ExecutionMode;

/// Message rendered for unclassified failures in production
pub const GENERIC_MESSAGE: &str = "An error occurred";

/// Kind tag carried in the `type` field of an error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "validation_error")]
    Validation,
    #[serde(rename = "authentication_error")]
    Authentication,
    #[serde(rename = "authorization_error")]
    Authorization,
    #[serde(rename = "not_found")]
    NotFound,
    #[serde(rename = "rate_limit_exceeded")]
    RateLimit,
    #[serde(rename = "internal_error")]
    Internal,
    #[serde(rename = "configuration_error")]
    Configuration,
    #[serde(rename = "network_error")]
    Network,
    #[serde(rename = "timeout_error")]
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Authentication => "authentication_error",
            ErrorKind::Authorization => "authorization_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimit => "rate_limit_exceeded",
            ErrorKind::Internal => "internal_error",
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Network => "network_error",
            ErrorKind::Timeout => "timeout_error",
        }
    }

    /// Default HTTP status for the kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Authentication => 401,
            ErrorKind::Authorization => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::RateLimit => 429,
            ErrorKind::Internal | ErrorKind::Configuration => 500,
            ErrorKind::Network => 503,
            ErrorKind::Timeout => 504,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised deliberately by application code
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: u16,
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    /// Create an error with the kind's default status
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: kind.status_code(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach details, rendered outside production only
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }
}

/// Low-level failures with a fixed public rendering
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("connection refused")]
    ConnectionRefused,
    #[error("operation timed out")]
    TimedOut,
    #[error("resource missing")]
    ResourceMissing,
}

impl TransportFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportFailure::ConnectionRefused => ErrorKind::Network,
            TransportFailure::TimedOut => ErrorKind::Timeout,
            TransportFailure::ResourceMissing => ErrorKind::NotFound,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            TransportFailure::ConnectionRefused => "Service temporarily unavailable",
            TransportFailure::TimedOut => "The request timed out",
            TransportFailure::ResourceMissing => "Resource not found",
        }
    }
}

/// A failure nothing upstream classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{type_name}: {message}")]
pub struct Unclassified {
    /// Rust type name of the original error
    pub type_name: String,
    pub message: String,
    /// Source chain, plus a backtrace when capture is enabled
    pub stack: Option<String>,
}

impl Unclassified {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Capture an arbitrary error with its source chain
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let type_name = std::any::type_name::<E>();
        let mut stack = format!("{}: {}", type_name, err);
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            stack.push_str(&format!("\n{}", backtrace));
        }
        Self {
            type_name: type_name.to_string(),
            message: err.to_string(),
            stack: Some(stack),
        }
    }
}

/// Closed set of failures a request boundary can receive
#[derive(Error, Debug)]
pub enum Failure {
    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error(transparent)]
    Unclassified(#[from] Unclassified),
}

impl Failure {
    /// Wrap any error that has no classification of its own
    pub fn unexpected<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Failure::Unclassified(Unclassified::from_error(err))
    }

    /// Status code the failure renders with
    pub fn status_code(&self) -> u16 {
        match self {
            Failure::Validation(_) => ErrorKind::Validation.status_code(),
            Failure::App(err) => err.status_code,
            Failure::Transport(t) => t.kind().status_code(),
            Failure::Unclassified(_) => ErrorKind::Internal.status_code(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Failure::Validation(_) => ErrorKind::Validation,
            Failure::App(err) => err.kind,
            Failure::Transport(t) => t.kind(),
            Failure::Unclassified(_) => ErrorKind::Internal,
        }
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Failure::Transport(TransportFailure::ConnectionRefused),
            io::ErrorKind::TimedOut => Failure::Transport(TransportFailure::TimedOut),
            io::ErrorKind::NotFound => Failure::Transport(TransportFailure::ResourceMissing),
            _ => Failure::unexpected(&err),
        }
    }
}

impl From<ConfigErrors> for Failure {
    fn from(errors: ConfigErrors) -> Self {
        Failure::App(
            AppError::configuration("Configuration is invalid")
                .with_details(json!({ "problems": errors.lines() })),
        )
    }
}

/// Wire record returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ErrorResponse {
    /// Classify and render a failure for the given mode
    pub fn build(failure: Failure, mode: ExecutionMode) -> Self {
        let verbose = !mode.is_production();
        let now = rfc3339(Utc::now());

        match failure {
            Failure::Validation(err) => Self {
                error: true,
                message: err.user_message.clone(),
                kind: ErrorKind::Validation,
                timestamp: now,
                status_code: ErrorKind::Validation.status_code(),
                stack: None,
                details: verbose.then(|| json!({ "field": err.field, "reason": err.reason })),
            },
            Failure::App(err) => Self {
                error: true,
                message: err.message,
                kind: err.kind,
                timestamp: rfc3339(err.timestamp),
                status_code: err.status_code,
                stack: None,
                details: if verbose { err.details } else { None },
            },
            Failure::Transport(t) => Self {
                error: true,
                message: t.public_message().to_string(),
                kind: t.kind(),
                timestamp: now,
                status_code: t.kind().status_code(),
                stack: None,
                details: None,
            },
            Failure::Unclassified(u) if verbose => Self {
                error: true,
                message: u.message,
                kind: ErrorKind::Internal,
                timestamp: now,
                status_code: ErrorKind::Internal.status_code(),
                stack: u.stack,
                details: Some(json!({ "errorType": u.type_name })),
            },
            Failure::Unclassified(_) => Self {
                error: true,
                message: GENERIC_MESSAGE.to_string(),
                kind: ErrorKind::Internal,
                timestamp: now,
                status_code: ErrorKind::Internal.status_code(),
                stack: None,
                details: None,
            },
        }
    }
}

/// Logs and renders failures for one execution mode
#[derive(Debug, Clone, Copy)]
pub struct ErrorReporter {
    mode: ExecutionMode,
}

impl ErrorReporter {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Log the failure with request context, then render it
    pub fn report(&self, failure: Failure, context: Option<&RequestContext>) -> ErrorResponse {
        let status = failure.status_code();
        let kind = failure.kind();
        let ctx = context.cloned().unwrap_or_default();

        if status >= 500 {
            tracing::error!(
                kind = %kind,
                status,
                method = %ctx.method,
                path = %ctx.path,
                remote_addr = ctx.remote_addr.as_deref().unwrap_or("-"),
                user_agent = ctx.user_agent.as_deref().unwrap_or("-"),
                error = %failure,
                "Request failed"
            );
        } else {
            tracing::warn!(
                kind = %kind,
                status,
                method = %ctx.method,
                path = %ctx.path,
                remote_addr = ctx.remote_addr.as_deref().unwrap_or("-"),
                user_agent = ctx.user_agent.as_deref().unwrap_or("-"),
                error = %failure,
                "Request rejected"
            );
        }

        ErrorResponse::build(failure, self.mode)
    }
}

/// Log and render a failure without request context
pub fn respond(failure: impl Into<Failure>, mode: ExecutionMode) -> ErrorResponse {
    ErrorReporter::new(mode).report(failure.into(), None)
}
