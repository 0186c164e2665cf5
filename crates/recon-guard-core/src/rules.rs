//! Rule primitives for single-field validation
//!
//! A [`RuleSet`] coerces a raw string into a [`ConfigValue`] and then runs its
//! rules in a fixed stage order: type, bounds (range and length), pattern,
//! enum, blacklist, custom. Rules are kept sorted by stage on insertion, so
//! the first failure reported for a given input never depends on the order
//! in which rules were declared.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FieldError;

/// A typed, coerced value
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
    Path(PathBuf),
    /// Sensitive string, wiped on drop and never printed by `Debug`
    Secret(SecretString),
}

impl ConfigValue {
    /// Wrap a string as a secret value
    pub fn secret(value: impl Into<String>) -> Self {
        ConfigValue::Secret(SecretString::new(value.into()))
    }

    /// String view for string-like values (`Path` is included; `Secret` is not)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            ConfigValue::Path(p) => p.to_str(),
            _ => None,
        }
    }

    /// Integer value; floats return `None`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(n) => Some(*n as f64),
            ConfigValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// List elements, in source order
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Path value; string values are not reinterpreted as paths
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ConfigValue::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Explicit access to a secret value
    pub fn expose_secret(&self) -> Option<&str> {
        match self {
            ConfigValue::Secret(s) => Some(s.expose_secret().as_str()),
            _ => None,
        }
    }

    /// True for the empty string, empty list, empty path, or empty secret
    pub fn is_empty(&self) -> bool {
        match self {
            ConfigValue::String(s) => s.is_empty(),
            ConfigValue::Secret(s) => s.expose_secret().is_empty(),
            ConfigValue::List(items) => items.is_empty(),
            ConfigValue::Path(p) => p.as_os_str().is_empty(),
            ConfigValue::Integer(_) | ConfigValue::Float(_) | ConfigValue::Boolean(_) => false,
        }
    }

    /// Text the string-shaped rules (length, pattern, enum, blacklist) inspect
    fn text(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            ConfigValue::Secret(s) => Some(s.expose_secret().as_str()),
            ConfigValue::Path(p) => p.to_str(),
            _ => None,
        }
    }

    /// Lower-case name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::Boolean(_) => "boolean",
            ConfigValue::List(_) => "list",
            ConfigValue::Path(_) => "path",
            ConfigValue::Secret(_) => "secret",
        }
    }
}

// `SecretString` is not `Clone`; each copy is a fresh secret, wiped on drop.
impl Clone for ConfigValue {
    fn clone(&self) -> Self {
        match self {
            ConfigValue::String(s) => ConfigValue::String(s.clone()),
            ConfigValue::Integer(n) => ConfigValue::Integer(*n),
            ConfigValue::Float(n) => ConfigValue::Float(*n),
            ConfigValue::Boolean(b) => ConfigValue::Boolean(*b),
            ConfigValue::List(items) => ConfigValue::List(items.clone()),
            ConfigValue::Path(p) => ConfigValue::Path(p.clone()),
            ConfigValue::Secret(s) => ConfigValue::secret(s.expose_secret().as_str()),
        }
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::String(a), ConfigValue::String(b)) => a == b,
            (ConfigValue::Integer(a), ConfigValue::Integer(b)) => a == b,
            (ConfigValue::Float(a), ConfigValue::Float(b)) => a == b,
            (ConfigValue::Boolean(a), ConfigValue::Boolean(b)) => a == b,
            (ConfigValue::List(a), ConfigValue::List(b)) => a == b,
            (ConfigValue::Path(a), ConfigValue::Path(b)) => a == b,
            (ConfigValue::Secret(a), ConfigValue::Secret(b)) => {
                a.expose_secret() == b.expose_secret()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.debug_tuple("String").field(s).finish(),
            ConfigValue::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            ConfigValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            ConfigValue::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            ConfigValue::List(items) => f.debug_tuple("List").field(items).finish(),
            ConfigValue::Path(p) => f.debug_tuple("Path").field(p).finish(),
            ConfigValue::Secret(_) => f.write_str("Secret([REDACTED])"),
        }
    }
}

/// Target type a raw string is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Float,
    /// Case-insensitive `true` or `1`; anything else is `false`
    Boolean,
    /// Split on the separator, segments trimmed, empty segments dropped
    List { separator: char },
    Path,
    Secret,
}

impl ValueType {
    /// Coerce a raw value. Only numeric types can fail.
    pub fn coerce(&self, field: &str, raw: &str) -> Result<ConfigValue, FieldError> {
        let trimmed = raw.trim();
        match self {
            ValueType::String => Ok(ConfigValue::String(trimmed.to_string())),
            ValueType::Integer => trimmed
                .parse::<i64>()
                .map(ConfigValue::Integer)
                .map_err(|_| FieldError::not_integer(field)),
            ValueType::Float => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(ConfigValue::Float(n)),
                _ => Err(FieldError::not_number(field)),
            },
            ValueType::Boolean => Ok(ConfigValue::Boolean(
                trimmed.eq_ignore_ascii_case("true") || trimmed == "1",
            )),
            ValueType::List { separator } => Ok(ConfigValue::List(
                trimmed
                    .split(*separator)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            ValueType::Path => Ok(ConfigValue::Path(PathBuf::from(trimmed))),
            ValueType::Secret => Ok(ConfigValue::secret(trimmed)),
        }
    }

    /// Value used for an optional field left unset, when the type has one
    pub fn empty_value(&self) -> Option<ConfigValue> {
        match self {
            ValueType::String => Some(ConfigValue::String(String::new())),
            ValueType::Boolean => Some(ConfigValue::Boolean(false)),
            ValueType::List { .. } => Some(ConfigValue::List(Vec::new())),
            ValueType::Path => Some(ConfigValue::Path(PathBuf::new())),
            ValueType::Secret => Some(ConfigValue::secret(String::new())),
            ValueType::Integer | ValueType::Float => None,
        }
    }
}

/// Evaluation stage of a rule; lower stages run first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Bounds,
    Pattern,
    Enum,
    Blacklist,
    Custom,
}

/// Predicate used by [`Rule::Custom`]; returns the failure reason on rejection
pub type CustomCheck = Arc<dyn Fn(&ConfigValue) -> Result<(), String> + Send + Sync>;

/// A single constraint on a coerced value
#[derive(Clone)]
pub enum Rule {
    /// Inclusive numeric bounds
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive character-count bounds; for lists, element-count bounds
    Length { min: Option<usize>, max: Option<usize> },
    /// Full-value regex match; `description` names the accepted shape
    Pattern { regex: Regex, description: String },
    /// Allowed values
    OneOf {
        allowed: Vec<String>,
        case_insensitive: bool,
    },
    /// Case-insensitive forbidden substrings
    Blacklist { terms: Vec<String> },
    Custom { name: String, check: CustomCheck },
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Rule::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Rule::Pattern { regex, .. } => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Rule::OneOf { allowed, .. } => f.debug_tuple("OneOf").field(allowed).finish(),
            Rule::Blacklist { terms } => f
                .debug_struct("Blacklist")
                .field("terms", &terms.len())
                .finish(),
            Rule::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
        }
    }
}

impl Rule {
    pub fn stage(&self) -> Stage {
        match self {
            Rule::Range { .. } | Rule::Length { .. } => Stage::Bounds,
            Rule::Pattern { .. } => Stage::Pattern,
            Rule::OneOf { .. } => Stage::Enum,
            Rule::Blacklist { .. } => Stage::Blacklist,
            Rule::Custom { .. } => Stage::Custom,
        }
    }

    /// Check a coerced value. Rules that do not apply to the value's shape pass.
    pub fn check(&self, field: &str, value: &ConfigValue) -> Result<(), FieldError> {
        match self {
            Rule::Range { min, max } => {
                let Some(n) = value.as_f64() else {
                    return Ok(());
                };
                let below = min.is_some_and(|m| n < m);
                let above = max.is_some_and(|m| n > m);
                if below || above {
                    return Err(FieldError::out_of_range(field, describe_range(*min, *max)));
                }
                Ok(())
            }
            Rule::Length { min, max } => {
                let len = match value {
                    ConfigValue::List(items) => {
                        if let Some(max) = max {
                            if items.len() > *max {
                                return Err(FieldError::too_many(field, *max));
                            }
                        }
                        if let Some(min) = min {
                            if items.len() < *min {
                                return Err(FieldError::new(
                                    field,
                                    format!("must contain at least {} entries", min),
                                ));
                            }
                        }
                        return Ok(());
                    }
                    other => match other.text() {
                        Some(text) => text.chars().count(),
                        None => return Ok(()),
                    },
                };
                if let Some(min) = min {
                    if len < *min {
                        return Err(FieldError::too_short(field, *min));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(FieldError::too_long(field, *max));
                    }
                }
                Ok(())
            }
            Rule::Pattern { regex, description } => for_each_text(value, |text| {
                if regex.is_match(text) {
                    Ok(())
                } else {
                    Err(FieldError::invalid_format(field, description))
                }
            }),
            Rule::OneOf {
                allowed,
                case_insensitive,
            } => for_each_text(value, |text| {
                let found = if *case_insensitive {
                    allowed.iter().any(|a| a.eq_ignore_ascii_case(text))
                } else {
                    allowed.iter().any(|a| a == text)
                };
                if found {
                    Ok(())
                } else {
                    Err(FieldError::not_allowed(field, allowed))
                }
            }),
            Rule::Blacklist { terms } => for_each_text(value, |text| {
                let lower = text.to_lowercase();
                if terms.iter().any(|t| lower.contains(t.as_str())) {
                    Err(FieldError::denied(field))
                } else {
                    Ok(())
                }
            }),
            Rule::Custom { check, .. } => {
                (check.as_ref())(value).map_err(|reason| FieldError::new(field, reason))
            }
        }
    }
}

/// Apply a text check to a scalar, or to every element of a list
fn for_each_text<F>(value: &ConfigValue, mut check: F) -> Result<(), FieldError>
where
    F: FnMut(&str) -> Result<(), FieldError>,
{
    match value {
        ConfigValue::List(items) => items.iter().try_for_each(|item| check(item)),
        other => match other.text() {
            Some(text) => check(text),
            None => Ok(()),
        },
    }
}

fn describe_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("between {} and {}", min, max),
        (Some(min), None) => format!("at least {}", min),
        (None, Some(max)) => format!("at most {}", max),
        (None, None) => "a number".to_string(),
    }
}

/// Coercion plus an ordered list of rules for one field
#[derive(Debug, Clone)]
pub struct RuleSet {
    value_type: ValueType,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            rules: Vec::new(),
        }
    }

    /// Trimmed string
    pub fn string() -> Self {
        Self::new(ValueType::String)
    }

    /// Signed 64-bit integer
    pub fn integer() -> Self {
        Self::new(ValueType::Integer)
    }

    /// Finite float
    pub fn float() -> Self {
        Self::new(ValueType::Float)
    }

    /// Boolean; never fails coercion
    pub fn boolean() -> Self {
        Self::new(ValueType::Boolean)
    }

    /// List split on `separator`
    pub fn list(separator: char) -> Self {
        Self::new(ValueType::List { separator })
    }

    /// Filesystem path, not checked for existence
    pub fn path() -> Self {
        Self::new(ValueType::Path)
    }

    /// Secret string, redacted in `Debug` and on disclosure
    pub fn secret() -> Self {
        Self::new(ValueType::Secret)
    }

    /// Coercion target
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Insert a rule after every rule of the same or an earlier stage
    pub fn rule(mut self, rule: Rule) -> Self {
        let stage = rule.stage();
        let pos = self.rules.partition_point(|r| r.stage() <= stage);
        self.rules.insert(pos, rule);
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.rule(Rule::Range {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.rule(Rule::Length {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(Rule::Length {
            min: Some(min),
            max: None,
        })
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(Rule::Length {
            min: None,
            max: Some(max),
        })
    }

    pub fn pattern(self, regex: Regex, description: impl Into<String>) -> Self {
        self.rule(Rule::Pattern {
            regex,
            description: description.into(),
        })
    }

    pub fn one_of<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            case_insensitive: false,
        })
    }

    pub fn one_of_ignore_case<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            case_insensitive: true,
        })
    }

    pub fn blacklist<I, S>(self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::Blacklist {
            terms: terms
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .collect(),
        })
    }

    pub fn custom<F>(self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ConfigValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rule(Rule::Custom {
            name: name.into(),
            check: Arc::new(check),
        })
    }

    /// Coerce `raw` and run every rule, stopping at the first failure
    pub fn evaluate(&self, field: &str, raw: &str) -> Result<ConfigValue, FieldError> {
        let value = self.value_type.coerce(field, raw)?;
        for rule in &self.rules {
            rule.check(field, &value)?;
        }
        Ok(value)
    }
}
