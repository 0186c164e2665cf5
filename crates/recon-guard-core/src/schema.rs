//! Static configuration schema
//!
//! A [`Schema`] is an ordered list of [`FieldSpec`]s. Each spec names an
//! upper-case field, its [`RuleSet`], a default, when it is required, and the
//! role it plays for the whole-snapshot checks and for secret projection.
//! [`app_schema`] declares the fields this service reads from its environment.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::error::SchemaError;
use crate::logging::LOG_LEVELS;
use crate::mode::ExecutionMode;
use crate::rules::{ConfigValue, RuleSet};

/// When a field must be present in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Always,
    InProduction,
}

impl Requirement {
    /// Whether an absent value is a failure under `mode`
    pub fn is_required(&self, mode: ExecutionMode) -> bool {
        match self {
            Requirement::Optional => false,
            Requirement::Always => true,
            Requirement::InProduction => mode.is_production(),
        }
    }
}

/// Filesystem policy for path-valued fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPolicy {
    Unchecked,
    /// The path must already exist
    MustExist,
    /// The directory is created when missing
    Create,
}

/// Special meaning a field carries beyond its rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Plain,
    /// Selects the execution mode
    Mode,
    /// Session signing secret; required in production, synthesized otherwise
    SigningSecret,
    /// Partially masked on disclosure
    ApiKey,
    /// URL that may embed credentials; userinfo hidden on disclosure
    CredentialedUrl,
}

/// Declaration of one configuration field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    description: String,
    rules: RuleSet,
    default: Option<ConfigValue>,
    requirement: Requirement,
    path_policy: PathPolicy,
    role: FieldRole,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, rules: RuleSet) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rules,
            default: None,
            requirement: Requirement::Optional,
            path_policy: PathPolicy::Unchecked,
            role: FieldRole::Plain,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_value(mut self, value: ConfigValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn default_str(self, value: impl Into<String>) -> Self {
        self.default_value(ConfigValue::String(value.into()))
    }

    pub fn default_int(self, value: i64) -> Self {
        self.default_value(ConfigValue::Integer(value))
    }

    /// Required in every mode
    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Always;
        self
    }

    /// Required only in production
    pub fn required_in_production(mut self) -> Self {
        self.requirement = Requirement::InProduction;
        self
    }

    pub fn path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    pub fn role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    pub fn policy(&self) -> PathPolicy {
        self.path_policy
    }

    pub fn field_role(&self) -> FieldRole {
        self.role
    }

    /// Declared default, or the empty value of the field's type
    pub fn resolved_default(&self) -> Option<ConfigValue> {
        self.default
            .clone()
            .or_else(|| self.rules.value_type().empty_value())
    }
}

/// Ordered, duplicate-free set of field declarations
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema, rejecting duplicate or malformed declarations
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        let mut roles = HashSet::new();
        for field in &fields {
            if !is_upper_token(&field.name) {
                return Err(SchemaError::InvalidFieldName(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if field.requirement != Requirement::Always && field.resolved_default().is_none() {
                return Err(SchemaError::MissingDefault(field.name.clone()));
            }
            let unique_role = matches!(field.role, FieldRole::Mode | FieldRole::SigningSecret);
            if unique_role && !roles.insert(field.role) {
                return Err(SchemaError::DuplicateRole(format!("{:?}", field.role)));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field with the given role, for single-instance roles
    pub fn field_with_role(&self, role: FieldRole) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.role == role)
    }
}

fn is_upper_token(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Field names of [`app_schema`]
pub mod keys {
    pub const APP_ENV: &str = "APP_ENV";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const LOG_DIR: &str = "LOG_DIR";
    pub const DATA_DIR: &str = "DATA_DIR";
    pub const SESSION_SECRET: &str = "SESSION_SECRET";
    pub const REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
    pub const MAX_CONCURRENT_REQUESTS: &str = "MAX_CONCURRENT_REQUESTS";
    pub const RATE_LIMIT_WINDOW_MS: &str = "RATE_LIMIT_WINDOW_MS";
    pub const RATE_LIMIT_MAX: &str = "RATE_LIMIT_MAX";
    pub const MAX_BATCH_USERNAMES: &str = "MAX_BATCH_USERNAMES";
    pub const MAX_USERNAME_LENGTH: &str = "MAX_USERNAME_LENGTH";
    pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
    pub const TRUST_PROXY: &str = "TRUST_PROXY";
    pub const PROXY_URL: &str = "PROXY_URL";
    pub const BREACH_API_KEY: &str = "BREACH_API_KEY";
}

/// Minimum signing secret length
pub const MIN_SECRET_LENGTH: usize = 32;

static HOST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.\-:\[\]]+$").expect("host pattern is valid"));

static ORIGIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.\-]+(:[0-9]{1,5})?$").expect("origin pattern is valid")
});

static API_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("api key pattern is valid"));

fn check_proxy_url(value: &ConfigValue) -> Result<(), String> {
    let Some(raw) = value.as_str() else {
        return Ok(());
    };
    let parsed = url::Url::parse(raw).map_err(|_| "must be a valid URL".to_string())?;
    if !matches!(parsed.scheme(), "http" | "https" | "socks5") {
        return Err("must use the http, https or socks5 scheme".to_string());
    }
    if parsed.host_str().is_none() {
        return Err("must include a host".to_string());
    }
    Ok(())
}

/// The schema this service validates its environment against
pub fn app_schema() -> Result<Schema, SchemaError> {
    use keys::*;

    Schema::new(vec![
        FieldSpec::new(
            APP_ENV,
            RuleSet::string().one_of_ignore_case(["development", "production", "test"]),
        )
        .default_str("development")
        .role(FieldRole::Mode)
        .describe("Execution environment"),
        FieldSpec::new(
            HOST,
            RuleSet::string()
                .max_length(253)
                .pattern(HOST_PATTERN.clone(), "host name or address characters"),
        )
        .default_str("127.0.0.1")
        .describe("Listen address"),
        FieldSpec::new(PORT, RuleSet::integer().range(1.0, 65535.0))
            .default_int(3000)
            .describe("Listen port"),
        FieldSpec::new(
            LOG_LEVEL,
            RuleSet::string().one_of_ignore_case(LOG_LEVELS.iter().copied()),
        )
        .default_str("info"),
        FieldSpec::new(LOG_FORMAT, RuleSet::string().one_of(["text", "json"])).default_str("text"),
        FieldSpec::new(LOG_DIR, RuleSet::path())
            .default_value(ConfigValue::Path("logs".into()))
            .path_policy(PathPolicy::Create)
            .describe("Directory for log files"),
        FieldSpec::new(DATA_DIR, RuleSet::path())
            .default_value(ConfigValue::Path("data".into()))
            .path_policy(PathPolicy::Create)
            .describe("Directory for scan results"),
        FieldSpec::new(SESSION_SECRET, RuleSet::secret().min_length(MIN_SECRET_LENGTH))
            .required_in_production()
            .role(FieldRole::SigningSecret)
            .describe("Session signing key"),
        FieldSpec::new(REQUEST_TIMEOUT_MS, RuleSet::integer().range(1000.0, 120_000.0))
            .default_int(30_000),
        FieldSpec::new(MAX_CONCURRENT_REQUESTS, RuleSet::integer().range(1.0, 100.0))
            .default_int(10),
        FieldSpec::new(
            RATE_LIMIT_WINDOW_MS,
            RuleSet::integer().range(1000.0, 3_600_000.0),
        )
        .default_int(900_000),
        FieldSpec::new(RATE_LIMIT_MAX, RuleSet::integer().range(1.0, 10_000.0)).default_int(100),
        FieldSpec::new(MAX_BATCH_USERNAMES, RuleSet::integer().range(1.0, 100.0))
            .default_int(10),
        FieldSpec::new(MAX_USERNAME_LENGTH, RuleSet::integer().range(1.0, 100.0))
            .default_int(50),
        FieldSpec::new(
            ALLOWED_ORIGINS,
            RuleSet::list(',')
                .max_length(32)
                .pattern(ORIGIN_PATTERN.clone(), "http(s) origins"),
        )
        .default_value(ConfigValue::List(vec!["http://localhost:3000".to_string()]))
        .describe("CORS origins"),
        FieldSpec::new(TRUST_PROXY, RuleSet::boolean()),
        FieldSpec::new(
            PROXY_URL,
            RuleSet::string()
                .max_length(2048)
                .custom("proxy url", check_proxy_url),
        )
        .role(FieldRole::CredentialedUrl)
        .describe("Outbound proxy, may embed credentials"),
        FieldSpec::new(
            BREACH_API_KEY,
            RuleSet::secret()
                .length(16, 128)
                .pattern(API_KEY_PATTERN.clone(), "letters, digits, '_' or '-'"),
        )
        .role(FieldRole::ApiKey)
        .describe("Breach lookup API key"),
    ])
}
