//! Free-text sanitization
//!
//! Sanitizers never fail: absent or non-string input becomes an empty
//! string. Control characters, bidirectional overrides/isolates, and
//! zero-width characters are stripped before HTML-significant characters
//! are replaced with entities.

use serde_json::Value;

/// Characters removed before entity substitution
pub fn is_stripped(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{200B}'..='\u{200D}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
        )
}

/// Entity for an HTML-significant character.
///
/// `&` is handled in the same pass as the others, so existing entities in
/// the input are escaped exactly once, as ordered substitution starting with
/// `&` would do.
fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#x27;"),
        '/' => Some("&#x2F;"),
        _ => None,
    }
}

/// Sanitize a string for display
pub fn sanitize_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars().filter(|c| !is_stripped(*c)) {
        match entity(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Sanitize an untyped request value; anything but a string yields `""`
pub fn sanitize_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => sanitize_str(s),
        _ => String::new(),
    }
}

/// Escape regex metacharacters so `input` matches only itself
pub fn escape_regex(input: &str) -> String {
    regex::escape(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_tag_neutralized() {
        let out = sanitize_str(r#"<script>alert("x")</script>"#);
        assert_eq!(
            out,
            "&lt;script&gt;alert(&quot;x&quot;)&lt;&#x2F;script&gt;"
        );
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('"'));
    }

    #[test]
    fn test_ampersand_escaped_once() {
        assert_eq!(sanitize_str("a & b &lt;"), "a &amp; b &amp;lt;");
    }

    #[test]
    fn test_control_and_bidi_stripped() {
        assert_eq!(sanitize_str("ab\u{0000}c\u{202E}d\u{200B}e\n"), "abcde");
    }

    #[test]
    fn test_non_string_input() {
        assert_eq!(sanitize_text(None), "");
        assert_eq!(sanitize_text(Some(&json!(42))), "");
        assert_eq!(sanitize_text(Some(&json!(null))), "");
        assert_eq!(sanitize_text(Some(&json!("it's"))), "it&#x27;s");
    }

    #[test]
    fn test_escape_regex() {
        let escaped = escape_regex("a.b*c(d)");
        let re = regex::Regex::new(&format!("^{}$", escaped)).unwrap();
        assert!(re.is_match("a.b*c(d)"));
        assert!(!re.is_match("aXbbc(d)"));
    }
}
