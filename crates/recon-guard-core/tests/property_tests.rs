//! Property tests for field validation, sanitization, and error rendering.

use proptest::prelude::*;
use recon_guard_core::fields::IDENTIFIER_DENYLIST;
use recon_guard_core::redact::{mask_api_key, mask_url_credentials};
use recon_guard_core::{
    sanitize_str, ErrorKind, ErrorResponse, ExecutionMode, Failure, InputValidator, Limits,
    Unclassified,
};
use serde_json::json;

fn validator() -> InputValidator {
    InputValidator::new(ExecutionMode::Development, Limits::default())
}

fn contains_denied(s: &str) -> bool {
    let lower = s.to_lowercase();
    IDENTIFIER_DENYLIST.iter().any(|t| lower.contains(t))
}

proptest! {
    /// Valid identifiers come back trimmed and otherwise unchanged
    #[test]
    fn proptest_valid_username_roundtrip(
        name in prop::string::string_regex("[A-Za-z0-9_-][A-Za-z0-9._-]{0,48}").unwrap(),
        pad in prop::string::string_regex(" {0,3}").unwrap(),
    ) {
        prop_assume!(!name.contains(".."));
        prop_assume!(!contains_denied(&name));
        let input = format!("{}{}{}", pad, name, pad);
        prop_assert_eq!(validator().username(Some(&json!(input))).unwrap(), name);
    }

    /// Any out-of-class character is rejected
    #[test]
    fn proptest_out_of_class_rejected(
        prefix in prop::string::string_regex("[a-z]{1,10}").unwrap(),
        bad in prop::sample::select(vec![' ', '<', '>', '\'', '"', ';', '/', '\u{202E}', '\u{200B}', 'é']),
    ) {
        let input = format!("{}{}x", prefix, bad);
        let err = validator().username(Some(&json!(input))).unwrap_err();
        prop_assert_eq!(err.field, "username");
    }

    /// Over-count batches fail regardless of element content
    #[test]
    fn proptest_batch_over_limit(extra in 1usize..20) {
        let count = Limits::default().max_batch_size + extra;
        let batch = vec!["bad name"; count].join(",");
        let err = validator().usernames(Some(&json!(batch))).unwrap_err();
        prop_assert!(err.reason.contains("at most"));
    }

    /// Sanitized output never carries markup-significant characters
    #[test]
    fn proptest_sanitizer_output_is_inert(input in any::<String>()) {
        let out = sanitize_str(&input);
        prop_assert!(!out.contains('<'));
        prop_assert!(!out.contains('>'));
        prop_assert!(!out.contains('"'));
        prop_assert!(!out.contains('\''));
        prop_assert!(!out.chars().any(char::is_control));
    }

    /// Masking is idempotent
    #[test]
    fn proptest_masking_idempotent(
        key in prop::string::string_regex("[A-Za-z0-9_-]{0,64}").unwrap(),
        user in prop::string::string_regex("[a-z]{1,8}").unwrap(),
        pass in prop::string::string_regex("[a-z0-9]{1,8}").unwrap(),
    ) {
        let once = mask_api_key(&key);
        prop_assert_eq!(mask_api_key(&once), once.clone());

        let url = format!("http://{}:{}@proxy.example:8080/path", user, pass);
        let masked = mask_url_credentials(&url);
        prop_assert_eq!(mask_url_credentials(&masked), masked.clone());
        let needle = format!(":{}@", pass);
        prop_assert!(!masked.contains(&needle));
    }

    /// Unclassified failures never reveal their message in production
    #[test]
    fn proptest_unclassified_production_is_generic(
        message in prop::string::string_regex("[a-z/._:0-9 ]{8,40}").unwrap(),
    ) {
        let failure = Failure::Unclassified(Unclassified::new("SomeError", message.clone()));
        let response = ErrorResponse::build(failure, ExecutionMode::Production);
        prop_assert_eq!(response.kind, ErrorKind::Internal);
        prop_assert_eq!(response.message.as_str(), "An error occurred");
        prop_assert!(response.stack.is_none());
        prop_assert!(response.details.is_none());
    }
}
