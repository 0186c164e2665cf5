//! Request-time field validation
//!
//! [`InputValidator`] holds the execution mode and the bounds read from the
//! configuration snapshot, plus pre-built rule-sets for each field kind. It
//! is immutable, `Send + Sync`, and every method is a pure function of its
//! input: no shared state is written and nothing blocks.
//!
//! Identifier-like fields (usernames, tokens, API keys) accept ASCII only,
//! so confusable and bidirectional-control characters are rejected by the
//! character class. Free text is normalized instead; see [`crate::sanitize`].

use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use url::{Host, Url};
use zeroize::Zeroizing;

use crate::config::Snapshot;
use crate::error::FieldError;
use crate::mode::ExecutionMode;
use crate::rules::{ConfigValue, RuleSet};
use crate::sanitize::sanitize_str;
use crate::schema::keys;

/// Keyword substrings rejected in identifiers, case-insensitively.
///
/// Nothing downstream builds SQL or HTML from identifiers; this list is a
/// deliberately conservative filter and will also reject some legitimate
/// names (for example anything containing "drop").
pub const IDENTIFIER_DENYLIST: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "union", "exec", "script", "--", "/*", "*/",
];

pub const DEFAULT_MAX_USERNAME_LENGTH: usize = 50;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;
pub const MAX_TEXT_LENGTH: usize = 500;
pub const MAX_URL_LENGTH: usize = 2048;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("username pattern is valid"));

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("token pattern is valid"));

/// Hostnames treated as local regardless of resolution
const INTERNAL_HOSTNAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
    "metadata.google.internal",
];

/// Private, loopback, link-local, CGNAT, unspecified, and broadcast ranges
const BLOCKED_V4: &[(Ipv4Addr, u32)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
];

/// Loopback, unspecified, unique-local, and link-local ranges
const BLOCKED_V6: &[(Ipv6Addr, u32)] = &[
    (Ipv6Addr::LOCALHOST, 128),
    (Ipv6Addr::UNSPECIFIED, 128),
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
];

fn in_cidr_v4(ip: Ipv4Addr, net: Ipv4Addr, prefix: u32) -> bool {
    let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    (u32::from(ip) & mask) == (u32::from(net) & mask)
}

fn in_cidr_v6(ip: Ipv6Addr, net: Ipv6Addr, prefix: u32) -> bool {
    let mask = u128::MAX.checked_shl(128 - prefix).unwrap_or(0);
    (u128::from(ip) & mask) == (u128::from(net) & mask)
}

/// True if an address falls in a private, loopback, or link-local range
pub fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => BLOCKED_V4
            .iter()
            .any(|(net, prefix)| in_cidr_v4(v4, *net, *prefix)),
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_internal_ip(IpAddr::V4(mapped));
            }
            BLOCKED_V6
                .iter()
                .any(|(net, prefix)| in_cidr_v6(v6, *net, *prefix))
        }
    }
}

/// True for local hostnames and internal addresses. No DNS lookup is made.
pub fn is_internal_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            INTERNAL_HOSTNAMES.contains(&domain.as_str()) || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_internal_ip(IpAddr::V4(*ip)),
        Host::Ipv6(ip) => is_internal_ip(IpAddr::V6(*ip)),
    }
}

/// Request-time bounds derived from the configuration snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_username_length: usize,
    pub max_batch_size: usize,
    pub max_text_length: usize,
    pub max_url_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_username_length: DEFAULT_MAX_USERNAME_LENGTH,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_text_length: MAX_TEXT_LENGTH,
            max_url_length: MAX_URL_LENGTH,
        }
    }
}

impl Limits {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let read = |key: &str, fallback: usize| {
            snapshot
                .get_u64(key)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(fallback)
        };
        Self {
            max_username_length: read(keys::MAX_USERNAME_LENGTH, DEFAULT_MAX_USERNAME_LENGTH),
            max_batch_size: read(keys::MAX_BATCH_USERNAMES, DEFAULT_MAX_BATCH_SIZE),
            ..Self::default()
        }
    }
}

/// Depth of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl ScanMode {
    pub const ALL: [&'static str; 3] = ["quick", "standard", "deep"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Quick => "quick",
            ScanMode::Standard => "standard",
            ScanMode::Deep => "deep",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "quick" => Some(ScanMode::Quick),
            "standard" => Some(ScanMode::Standard),
            "deep" => Some(ScanMode::Deep),
            _ => None,
        }
    }
}

/// Result export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Html,
    Txt,
}

impl OutputFormat {
    pub const ALL: [&'static str; 4] = ["json", "csv", "html", "txt"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Html => "html",
            OutputFormat::Txt => "txt",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "html" => Some(OutputFormat::Html),
            "txt" => Some(OutputFormat::Txt),
            _ => None,
        }
    }
}

/// A validated scan request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub usernames: Vec<String>,
    pub mode: ScanMode,
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub label: String,
}

/// String content of an untyped value.
///
/// Absent, null, and blank strings are "absent"; any other non-string is
/// rejected. The returned string is untrimmed; rule-sets trim.
fn require_string(field: &str, value: Option<&Value>, required: bool) -> Result<Option<String>, FieldError> {
    match value {
        None | Some(Value::Null) => {
            if required {
                Err(FieldError::required(field))
            } else {
                Ok(None)
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            if required {
                Err(FieldError::required(field))
            } else {
                Ok(None)
            }
        }
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(FieldError::not_string(field)),
    }
}

fn into_string(value: ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => s,
        other => other.as_str().unwrap_or_default().to_string(),
    }
}

/// Validators for each request field kind
#[derive(Debug, Clone)]
pub struct InputValidator {
    mode: ExecutionMode,
    limits: Limits,
    username: RuleSet,
    token: RuleSet,
    api_key: RuleSet,
    scan_mode: RuleSet,
    format: RuleSet,
}

impl InputValidator {
    pub fn new(mode: ExecutionMode, limits: Limits) -> Self {
        let username = RuleSet::string()
            .length(1, limits.max_username_length)
            .pattern(USERNAME_PATTERN.clone(), "letters, digits, '.', '_' or '-'")
            .blacklist(IDENTIFIER_DENYLIST.iter().copied());
        let token = RuleSet::string()
            .length(8, 128)
            .pattern(TOKEN_PATTERN.clone(), "letters, digits, '_' or '-'");
        let api_key = RuleSet::secret()
            .length(16, 128)
            .pattern(TOKEN_PATTERN.clone(), "letters, digits, '_' or '-'");
        let scan_mode = RuleSet::string()
            .max_length(16)
            .one_of_ignore_case(ScanMode::ALL);
        let format = RuleSet::string()
            .max_length(16)
            .one_of_ignore_case(OutputFormat::ALL);

        Self {
            mode,
            limits,
            username,
            token,
            api_key,
            scan_mode,
            format,
        }
    }

    /// Validator bound to a snapshot's mode and limits
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::new(snapshot.mode(), Limits::from_snapshot(snapshot))
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Rule-set check, then the traversal check, which runs last
    fn check_username(&self, field: &str, raw: &str) -> Result<String, FieldError> {
        let name = into_string(self.username.evaluate(field, raw)?);
        if name.contains("..") {
            return Err(FieldError::path_traversal(field));
        }
        Ok(name)
    }

    fn check_token(&self, field: &str, raw: &str) -> Result<String, FieldError> {
        self.token.evaluate(field, raw).map(into_string)
    }

    fn check_url(&self, field: &str, raw: &str) -> Result<Url, FieldError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > self.limits.max_url_length {
            return Err(FieldError::too_long(field, self.limits.max_url_length));
        }
        let parsed = Url::parse(trimmed).map_err(|_| FieldError::new(field, "must be a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FieldError::new(field, "must use the http or https scheme"));
        }
        let host = parsed
            .host()
            .ok_or_else(|| FieldError::new(field, "must include a host"))?;
        if self.mode.is_production() && is_internal_host(&host) {
            return Err(FieldError::new(
                field,
                "must not point to a private or local network address",
            ));
        }
        Ok(parsed)
    }

    fn check_text(&self, field: &str, raw: &str) -> Result<String, FieldError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > self.limits.max_text_length {
            return Err(FieldError::too_long(field, self.limits.max_text_length));
        }
        Ok(sanitize_str(trimmed))
    }

    /// A single username; returns the trimmed value
    pub fn username(&self, value: Option<&Value>) -> Result<String, FieldError> {
        let raw = require_string("username", value, true)?.unwrap_or_default();
        self.check_username("username", &raw)
    }

    /// Comma-separated usernames.
    ///
    /// The element count is checked before any element is validated; the
    /// first failing element is reported with its 1-based position.
    pub fn usernames(&self, value: Option<&Value>) -> Result<Vec<String>, FieldError> {
        let raw = require_string("usernames", value, true)?.unwrap_or_default();
        let items: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            return Err(FieldError::required("usernames"));
        }
        if items.len() > self.limits.max_batch_size {
            return Err(FieldError::too_many("usernames", self.limits.max_batch_size));
        }
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.check_username("username", item)
                    .map_err(|err| err.at_position("usernames", i + 1))
            })
            .collect()
    }

    /// Opaque correlation token such as a request or scan id
    pub fn token(&self, value: Option<&Value>) -> Result<String, FieldError> {
        let raw = require_string("token", value, true)?.unwrap_or_default();
        self.check_token("token", &raw)
    }

    /// An http(s) URL. In production, local and private hosts are rejected.
    pub fn url(&self, value: Option<&Value>) -> Result<Url, FieldError> {
        let raw = require_string("url", value, true)?.unwrap_or_default();
        self.check_url("url", &raw)
    }

    /// Scan mode; absent means the default mode
    pub fn scan_mode(&self, value: Option<&Value>) -> Result<ScanMode, FieldError> {
        let Some(raw) = require_string("mode", value, false)? else {
            return Ok(ScanMode::default());
        };
        let checked = into_string(self.scan_mode.evaluate("mode", &raw)?);
        ScanMode::from_name(&checked).ok_or_else(|| FieldError::new("mode", "is not a known scan mode"))
    }

    /// Output format; absent means the default format
    pub fn output_format(&self, value: Option<&Value>) -> Result<OutputFormat, FieldError> {
        let Some(raw) = require_string("format", value, false)? else {
            return Ok(OutputFormat::default());
        };
        let checked = into_string(self.format.evaluate("format", &raw)?);
        OutputFormat::from_name(&checked)
            .ok_or_else(|| FieldError::new("format", "is not a known output format"))
    }

    /// Optional display text, length-checked then sanitized
    pub fn display_text(&self, value: Option<&Value>) -> Result<String, FieldError> {
        let Some(raw) = require_string("text", value, false)? else {
            return Ok(String::new());
        };
        self.check_text("text", &raw)
    }

    /// Credential string such as a third-party API key
    pub fn api_key(&self, value: Option<&Value>) -> Result<SecretString, FieldError> {
        let raw = Zeroizing::new(require_string("apiKey", value, true)?.unwrap_or_default());
        match self.api_key.evaluate("apiKey", &raw)? {
            ConfigValue::Secret(secret) => Ok(secret),
            other => Ok(SecretString::new(into_string(other))),
        }
    }

    /// Validate a scan request body field by field, stopping at the first failure.
    ///
    /// Failures name the body key. Optional keys that are null or blank are
    /// treated as absent.
    pub fn scan_request(&self, body: &Map<String, Value>) -> Result<ScanRequest, FieldError> {
        let usernames = self.usernames(body.get("usernames"))?;
        let mode = self.scan_mode(body.get("mode"))?;
        let format = self.output_format(body.get("format"))?;
        let request_id = require_string("requestId", body.get("requestId"), false)?
            .map(|raw| self.check_token("requestId", &raw))
            .transpose()?;
        let callback_url = require_string("callbackUrl", body.get("callbackUrl"), false)?
            .map(|raw| self.check_url("callbackUrl", &raw).map(|url| url.to_string()))
            .transpose()?;
        let label = require_string("label", body.get("label"), false)?
            .map(|raw| self.check_text("label", &raw))
            .transpose()?
            .unwrap_or_default();

        Ok(ScanRequest {
            usernames,
            mode,
            format,
            request_id,
            callback_url,
            label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn dev() -> InputValidator {
        InputValidator::new(ExecutionMode::Development, Limits::default())
    }

    fn prod() -> InputValidator {
        InputValidator::new(ExecutionMode::Production, Limits::default())
    }

    #[test]
    fn test_username_trimmed() {
        assert_eq!(dev().username(Some(&json!("  john_doe  "))).unwrap(), "john_doe");
    }

    #[test]
    fn test_username_rejections() {
        let v = dev();
        assert_eq!(v.username(None).unwrap_err().reason, "is required");
        assert_eq!(v.username(Some(&json!("   "))).unwrap_err().reason, "is required");
        assert_eq!(v.username(Some(&json!(42))).unwrap_err().reason, "must be a string");
        assert!(v.username(Some(&json!("john doe"))).is_err());
        assert!(v.username(Some(&json!("jöhn"))).is_err());
        assert!(v.username(Some(&json!("a\u{202E}b"))).is_err());
        assert_eq!(
            v.username(Some(&json!("DropTable"))).unwrap_err().reason,
            "contains a forbidden keyword"
        );
        assert_eq!(
            v.username(Some(&json!("a..b"))).unwrap_err().reason,
            "must not contain path traversal sequences"
        );
        let long = "a".repeat(DEFAULT_MAX_USERNAME_LENGTH + 1);
        assert_eq!(
            v.username(Some(&json!(long))).unwrap_err().reason,
            "must be at most 50 characters"
        );
    }

    #[test]
    fn test_batch_usernames() {
        let names = dev().usernames(Some(&json!("john,jane,bob"))).unwrap();
        assert_eq!(names, vec!["john", "jane", "bob"]);

        let names = dev().usernames(Some(&json!(" john , ,jane,"))).unwrap();
        assert_eq!(names, vec!["john", "jane"]);
    }

    #[test]
    fn test_batch_position_reported() {
        let err = dev().usernames(Some(&json!("john,bad name,bob"))).unwrap_err();
        assert_eq!(err.field, "usernames");
        assert!(err.reason.starts_with("entry 2 "));
    }

    #[test]
    fn test_batch_limit_checked_first() {
        let limits = Limits {
            max_batch_size: 2,
            ..Limits::default()
        };
        let v = InputValidator::new(ExecutionMode::Development, limits);
        // The invalid first element is never reached.
        let err = v.usernames(Some(&json!("bad name,b,c"))).unwrap_err();
        assert_eq!(err.reason, "must contain at most 2 entries");
    }

    #[test]
    fn test_batch_of_separators_is_empty() {
        assert_eq!(
            dev().usernames(Some(&json!(" , ,"))).unwrap_err().reason,
            "is required"
        );
    }

    #[test]
    fn test_url_scheme() {
        for v in [dev(), prod()] {
            assert!(v.url(Some(&json!("javascript:alert(1)"))).is_err());
            assert!(v.url(Some(&json!("ftp://example.com/file"))).is_err());
            assert!(v.url(Some(&json!("https://example.com/path?q=1"))).is_ok());
        }
    }

    #[test]
    fn test_url_private_hosts_gated_by_mode() {
        let hosts = [
            "http://127.0.0.1",
            "http://localhost:8080",
            "http://10.1.2.3",
            "http://172.20.0.1",
            "http://192.168.1.1",
            "http://169.254.169.254/latest/meta-data",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://[fe80::1]/",
            "http://[::ffff:127.0.0.1]/",
            "http://0.0.0.0",
            "http://2130706433/",
            "http://app.localhost/",
        ];
        for host in hosts {
            assert!(dev().url(Some(&json!(host))).is_ok(), "dev should accept {}", host);
            assert!(prod().url(Some(&json!(host))).is_err(), "prod should reject {}", host);
        }
        assert!(prod().url(Some(&json!("http://172.32.0.1"))).is_ok());
        assert!(prod().url(Some(&json!("http://8.8.8.8"))).is_ok());
    }

    #[test]
    fn test_url_too_long() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(dev().url(Some(&json!(long))).is_err());
    }

    #[test]
    fn test_scan_mode_and_format() {
        let v = dev();
        assert_eq!(v.scan_mode(None).unwrap(), ScanMode::Standard);
        assert_eq!(v.scan_mode(Some(&json!("DEEP"))).unwrap(), ScanMode::Deep);
        assert!(v.scan_mode(Some(&json!("turbo"))).is_err());
        assert!(v.scan_mode(Some(&json!(true))).is_err());
        assert_eq!(v.output_format(Some(&json!("csv"))).unwrap(), OutputFormat::Csv);
        assert_eq!(v.output_format(Some(&json!(""))).unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_token_and_api_key() {
        let v = dev();
        assert_eq!(
            v.token(Some(&json!("550e8400-e29b-41d4-a716-446655440000"))).unwrap(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert!(v.token(Some(&json!("short"))).is_err());
        assert!(v.token(Some(&json!("has space inside"))).is_err());
        let key = v.api_key(Some(&json!(" sk_live_0123456789abcdef "))).unwrap();
        assert_eq!(key.expose_secret(), "sk_live_0123456789abcdef");
        assert!(v.api_key(Some(&json!("tooshort"))).is_err());
    }

    #[test]
    fn test_display_text() {
        let v = dev();
        assert_eq!(v.display_text(None).unwrap(), "");
        assert_eq!(v.display_text(Some(&json!(" <b>hi</b> "))).unwrap(), "&lt;b&gt;hi&lt;&#x2F;b&gt;");
        assert!(v.display_text(Some(&json!(["x"]))).is_err());
        assert!(v.display_text(Some(&json!("x".repeat(MAX_TEXT_LENGTH + 1)))).is_err());
    }

    #[test]
    fn test_scan_request() {
        let body = json!({
            "usernames": "john,jane",
            "mode": "quick",
            "requestId": "req-12345678",
            "label": "nightly <run>",
        });
        let request = dev().scan_request(body.as_object().unwrap()).unwrap();
        assert_eq!(request.usernames, vec!["john", "jane"]);
        assert_eq!(request.mode, ScanMode::Quick);
        assert_eq!(request.format, OutputFormat::Json);
        assert_eq!(request.request_id.as_deref(), Some("req-12345678"));
        assert_eq!(request.label, "nightly &lt;run&gt;");

        let body = json!({ "usernames": "john", "callbackUrl": "http://10.0.0.5/hook" });
        let err = prod().scan_request(body.as_object().unwrap()).unwrap_err();
        assert_eq!(err.field, "callbackUrl");
        assert_eq!(err.user_message, "callbackUrl must not point to a private or local network address");
    }

    #[test]
    fn test_scan_request_errors_name_body_keys() {
        let v = dev();
        let body = json!({ "usernames": "john", "requestId": "x" });
        let err = v.scan_request(body.as_object().unwrap()).unwrap_err();
        assert_eq!(err.field, "requestId");
        assert_eq!(err.reason, "must be at least 8 characters");

        let body = json!({ "usernames": "john", "label": "x".repeat(MAX_TEXT_LENGTH + 1) });
        let err = v.scan_request(body.as_object().unwrap()).unwrap_err();
        assert_eq!(err.field, "label");

        let body = json!({ "usernames": "john", "callbackUrl": 7 });
        let err = v.scan_request(body.as_object().unwrap()).unwrap_err();
        assert_eq!(err.field, "callbackUrl");
        assert_eq!(err.reason, "must be a string");
    }

    #[test]
    fn test_scan_request_blank_optionals_are_absent() {
        let body = json!({ "usernames": "john", "callbackUrl": "", "requestId": "  ", "label": null });
        let request = prod().scan_request(body.as_object().unwrap()).unwrap();
        assert_eq!(request.callback_url, None);
        assert_eq!(request.request_id, None);
        assert_eq!(request.label, "");
    }

    #[test]
    fn test_cidr() {
        assert!(in_cidr_v4(Ipv4Addr::new(172, 31, 255, 255), Ipv4Addr::new(172, 16, 0, 0), 12));
        assert!(!in_cidr_v4(Ipv4Addr::new(172, 32, 0, 0), Ipv4Addr::new(172, 16, 0, 0), 12));
        assert!(in_cidr_v4(Ipv4Addr::new(1, 2, 3, 4), Ipv4Addr::new(0, 0, 0, 0), 0));
    }
}
