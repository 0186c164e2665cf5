//! Startup configuration loading
//!
//! [`load_configuration`] applies a [`Schema`] to an untyped string source in
//! one pass, aggregating every problem it finds, and produces an immutable
//! [`Snapshot`]. The snapshot has no mutating API; share it behind an `Arc`.

use ring::rand::{SecureRandom, SystemRandom};
use secrecy::SecretString;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

use crate::error::{ConfigError, ConfigErrors};
use crate::mode::ExecutionMode;
use crate::rules::ConfigValue;
use crate::schema::{FieldRole, FieldSpec, PathPolicy, Schema};

/// Untyped string-keyed configuration input
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// The process environment, read at query time
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        // Non-UTF-8 values are treated as unset.
        std::env::var(key).ok()
    }
}

struct Entry {
    name: String,
    role: FieldRole,
    value: ConfigValue,
}

/// Fully resolved, immutable configuration.
///
/// Not `Clone`: the signing secret lives in exactly one place.
pub struct Snapshot {
    mode: ExecutionMode,
    entries: Vec<Entry>,
}

impl Snapshot {
    /// Execution mode resolved at load time
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Typed value of a field, by schema name
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// String or path value; secrets are not returned here
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ConfigValue::as_str)
    }

    /// Integer value
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ConfigValue::as_i64)
    }

    /// Integer value, if present and non-negative
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get_i64(name).and_then(|n| u64::try_from(n).ok())
    }

    /// Boolean value
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ConfigValue::as_bool)
    }

    /// List value
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(ConfigValue::as_list)
    }

    /// Path value
    pub fn get_path(&self, name: &str) -> Option<&Path> {
        self.get(name).and_then(ConfigValue::as_path)
    }

    /// Explicit access to a secret field
    pub fn expose_secret(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ConfigValue::expose_secret)
    }

    /// Role the schema assigned to a field
    pub fn role_of(&self, name: &str) -> Option<FieldRole> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.role)
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldRole, &ConfigValue)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.role, &e.value))
    }

    /// Number of resolved fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New snapshot with every value passed through `f`
    pub(crate) fn map_values<F>(&self, f: F) -> Snapshot
    where
        F: Fn(FieldRole, &ConfigValue) -> ConfigValue,
    {
        Snapshot {
            mode: self.mode,
            entries: self
                .entries
                .iter()
                .map(|e| Entry {
                    name: e.name.clone(),
                    role: e.role,
                    value: f(e.role, &e.value),
                })
                .collect(),
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("mode", &self.mode)
            .field("fields", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Raw value for a field, treating blank strings as absent
fn raw_value<S: ConfigSource + ?Sized>(source: &S, name: &str) -> Option<String> {
    source.get(name).filter(|v| !v.trim().is_empty())
}

/// Resolve one field: rule-set for present values, default otherwise.
/// `None` means the field failed and a problem was recorded.
fn resolve_field<S: ConfigSource + ?Sized>(
    source: &S,
    spec: &FieldSpec,
    mode: ExecutionMode,
    problems: &mut Vec<ConfigError>,
) -> Option<ConfigValue> {
    match raw_value(source, spec.name()) {
        Some(raw) => match spec.rules().evaluate(spec.name(), &raw) {
            Ok(value) => Some(value),
            Err(err) => {
                problems.push(ConfigError::Invalid(err));
                None
            }
        },
        None => {
            // The signing secret's requirement is enforced after the field pass.
            let enforce = spec.field_role() != FieldRole::SigningSecret;
            if enforce && spec.requirement().is_required(mode) {
                problems.push(ConfigError::Missing {
                    field: spec.name().to_string(),
                });
                return None;
            }
            tracing::debug!(field = spec.name(), "using default value");
            spec.resolved_default()
        }
    }
}

/// Resolve the execution mode from the schema's mode field.
/// An invalid mode value is recorded and treated as production.
fn resolve_mode<S: ConfigSource + ?Sized>(
    source: &S,
    schema: &Schema,
    problems: &mut Vec<ConfigError>,
) -> (ExecutionMode, Option<ConfigValue>) {
    let Some(spec) = schema.field_with_role(FieldRole::Mode) else {
        return (ExecutionMode::default(), None);
    };
    match resolve_field(source, spec, ExecutionMode::Development, problems) {
        Some(value) => {
            let mode = value
                .as_str()
                .map(ExecutionMode::from_env_name)
                .unwrap_or_default();
            (mode, Some(value))
        }
        None => (ExecutionMode::Production, None),
    }
}

fn check_paths(schema: &Schema, resolved: &[(String, ConfigValue)], problems: &mut Vec<ConfigError>) {
    let mut missing = Vec::new();
    for (name, value) in resolved {
        let Some(spec) = schema.field(name) else {
            continue;
        };
        let Some(path) = value.as_path().filter(|p| !p.as_os_str().is_empty()) else {
            continue;
        };
        match spec.policy() {
            PathPolicy::Unchecked => {}
            PathPolicy::MustExist => {
                if !path.exists() {
                    missing.push(format!("{} ({})", path.display(), name));
                }
            }
            PathPolicy::Create => {
                if let Err(err) = std::fs::create_dir_all(path) {
                    problems.push(ConfigError::PathCreation {
                        field: name.clone(),
                        path: path.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
    if !missing.is_empty() {
        problems.push(ConfigError::MissingPaths { paths: missing });
    }
}

/// 32 random bytes, hex encoded. The raw bytes are wiped before returning.
fn generate_secret() -> Result<SecretString, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    let mut bytes = Zeroizing::new([0u8; 32]);
    rng.fill(&mut bytes[..])?;
    Ok(SecretString::new(hex::encode(&bytes[..])))
}

fn check_signing_secret(
    schema: &Schema,
    mode: ExecutionMode,
    resolved: &mut [(String, ConfigValue)],
    problems: &mut Vec<ConfigError>,
) {
    let Some(spec) = schema.field_with_role(FieldRole::SigningSecret) else {
        return;
    };
    let Some((_, value)) = resolved.iter_mut().find(|(name, _)| name == spec.name()) else {
        // The field failed its own rules; that problem is already recorded.
        return;
    };
    if !value.is_empty() {
        return;
    }
    // Production always needs a real secret, on top of whatever the field declares.
    if mode.is_production() || spec.requirement().is_required(mode) {
        problems.push(ConfigError::MissingSecret {
            field: spec.name().to_string(),
            mode: mode.to_string(),
        });
        return;
    }
    match generate_secret() {
        Ok(secret) => {
            tracing::warn!(
                field = spec.name(),
                "signing secret not set; generated an ephemeral one for this process"
            );
            *value = ConfigValue::Secret(secret);
        }
        Err(_) => problems.push(ConfigError::SecretGeneration {
            field: spec.name().to_string(),
        }),
    }
}

/// Validate `source` against `schema`.
///
/// Every field is evaluated even after failures, then the path and signing
/// secret checks run over the resolved values. Any problem yields the full
/// ordered list and no snapshot.
pub fn load_configuration<S: ConfigSource + ?Sized>(
    source: &S,
    schema: &Schema,
) -> Result<Snapshot, ConfigErrors> {
    let mut problems = Vec::new();
    let (mode, mode_value) = resolve_mode(source, schema, &mut problems);

    let mut resolved: Vec<(String, ConfigValue)> = Vec::with_capacity(schema.fields().len());
    for spec in schema.fields() {
        let value = if spec.field_role() == FieldRole::Mode {
            mode_value.clone()
        } else {
            resolve_field(source, spec, mode, &mut problems)
        };
        if let Some(value) = value {
            resolved.push((spec.name().to_string(), value));
        }
    }

    check_paths(schema, &resolved, &mut problems);
    check_signing_secret(schema, mode, &mut resolved, &mut problems);

    if !problems.is_empty() {
        tracing::error!(
            mode = %mode,
            problems = problems.len(),
            "configuration validation failed"
        );
        return Err(ConfigErrors::new(problems));
    }

    let entries = resolved
        .into_iter()
        .filter_map(|(name, value)| {
            let role = schema.field(&name)?.field_role();
            Some(Entry { name, role, value })
        })
        .collect::<Vec<_>>();

    tracing::info!(mode = %mode, fields = entries.len(), "configuration loaded");
    Ok(Snapshot { mode, entries })
}
