//! Execution mode flag

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary execution mode gating disclosure verbosity and SSRF checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Production,
    #[default]
    Development,
}

impl ExecutionMode {
    /// Map an environment name to a mode. Only `production` is production.
    pub fn from_env_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            ExecutionMode::Production
        } else {
            ExecutionMode::Development
        }
    }

    /// True only for production
    pub fn is_production(&self) -> bool {
        matches!(self, ExecutionMode::Production)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Production => write!(f, "production"),
            ExecutionMode::Development => write!(f, "development"),
        }
    }
}
