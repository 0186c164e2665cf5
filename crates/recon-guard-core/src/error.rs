//! Error types for validation and configuration loading
//!
//! [`FieldError`] is the single validation failure shape shared by the rule
//! primitives, the config loader, and the request field validators. Its
//! `user_message` never echoes the offending input, so it is always safe to
//! disclose to a caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A validation failure on a single field
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field}: {reason}")]
pub struct FieldError {
    /// Name of the field that failed
    pub field: String,
    /// Human-readable reason
    pub reason: String,
    /// Message safe for direct disclosure to the caller
    pub user_message: String,
}

impl FieldError {
    /// Create a failure whose user message is derived from field and reason
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        let reason = reason.into();
        let user_message = format!("{} {}", field, reason);
        Self {
            field,
            reason,
            user_message,
        }
    }

    /// Override the disclosed message
    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = message.into();
        self
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }

    pub fn not_string(field: impl Into<String>) -> Self {
        Self::new(field, "must be a string")
    }

    pub fn not_integer(field: impl Into<String>) -> Self {
        Self::new(field, "must be an integer")
    }

    pub fn not_number(field: impl Into<String>) -> Self {
        Self::new(field, "must be a number")
    }

    pub fn too_short(field: impl Into<String>, min: usize) -> Self {
        Self::new(field, format!("must be at least {} characters", min))
    }

    pub fn too_long(field: impl Into<String>, max: usize) -> Self {
        Self::new(field, format!("must be at most {} characters", max))
    }

    pub fn out_of_range(field: impl Into<String>, bounds: impl fmt::Display) -> Self {
        Self::new(field, format!("must be {}", bounds))
    }

    /// Input does not match the expected character class or shape
    pub fn invalid_format(field: impl Into<String>, expected: impl fmt::Display) -> Self {
        Self::new(field, format!("must contain only {}", expected))
    }

    pub fn not_allowed(field: impl Into<String>, allowed: &[String]) -> Self {
        Self::new(field, format!("must be one of: {}", allowed.join(", ")))
    }

    /// Input contains a denylisted term; the term itself is not disclosed
    pub fn denied(field: impl Into<String>) -> Self {
        Self::new(field, "contains a forbidden keyword")
    }

    pub fn path_traversal(field: impl Into<String>) -> Self {
        Self::new(field, "must not contain path traversal sequences")
    }

    pub fn too_many(field: impl Into<String>, max: usize) -> Self {
        Self::new(field, format!("must contain at most {} entries", max))
    }

    /// Re-attribute an element-level failure to its 1-based position in a batch
    pub fn at_position(self, field: impl Into<String>, position: usize) -> Self {
        let field = field.into();
        let reason = format!("entry {} {}", position, self.reason);
        Self::new(field, reason)
    }
}

/// A single startup configuration problem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required field absent from the source
    #[error("{field} is required but was not set")]
    Missing { field: String },

    /// Field present but failed its rule-set
    #[error("{0}")]
    Invalid(#[from] FieldError),

    /// One or more must-exist paths are missing on disk
    #[error("required paths do not exist: {}", .paths.join(", "))]
    MissingPaths { paths: Vec<String> },

    /// Directory creation failed for a create-if-missing path
    #[error("{field}: could not create directory {path}: {reason}")]
    PathCreation {
        field: String,
        path: String,
        reason: String,
    },

    /// Signing secret empty in a mode that requires it
    #[error("{field} must be set when running in {mode} mode")]
    MissingSecret { field: String, mode: String },

    /// The system random source could not produce a secret
    #[error("{field}: failed to generate a random signing secret")]
    SecretGeneration { field: String },
}

impl ConfigError {
    /// Name of the field the problem relates to, if it is field-scoped
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { field }
            | ConfigError::PathCreation { field, .. }
            | ConfigError::MissingSecret { field, .. }
            | ConfigError::SecretGeneration { field } => Some(field),
            ConfigError::Invalid(err) => Some(&err.field),
            ConfigError::MissingPaths { .. } => None,
        }
    }
}

/// Every problem found in one configuration pass, in discovery order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(Vec<ConfigError>);

impl ConfigErrors {
    pub fn new(errors: Vec<ConfigError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ConfigError> {
        self.0
    }

    /// Operator-facing lines, one per problem, numbered from 1
    pub fn lines(&self) -> Vec<String> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, err)| format!("{}. {}", i + 1, err))
            .collect()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration invalid ({} problem", self.0.len())?;
        if self.0.len() != 1 {
            write!(f, "s")?;
        }
        write!(f, ")")?;
        for line in self.lines() {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}

/// Problems in a schema declaration itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field {0} is declared more than once")]
    DuplicateField(String),

    #[error("field name {0} must be an upper-case token")]
    InvalidFieldName(String),

    #[error("field {0} is optional but its type has no empty value; declare a default")]
    MissingDefault(String),

    #[error("schema declares more than one {0} field")]
    DuplicateRole(String),
}
