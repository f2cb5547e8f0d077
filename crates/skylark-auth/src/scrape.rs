//! Hidden-form-field extraction.
//!
//! The identity service renders state the client needs (the anti-forgery
//! token, the post-submission ticket) as hidden `<input>` fields in HTML.
//! All scraping goes through the single extractor below; callers see only
//! "first matching value or nothing" and never the pattern details.

use regex::Regex;

/// Extract the value of the first hidden `<input>` field with the given
/// `name` attribute. Returns `None` when no such field exists; an empty
/// `value` attribute yields `Some("")` so callers can distinguish a
/// missing field from an empty one.
pub fn hidden_field(html: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"(?s)<input[^>]*?name="{}"[^>]*?value="([^"]*)""#,
        regex::escape(name)
    );
    // The pattern is well-formed for any escaped name; compiled per call
    // since scraping happens twice per login.
    let re = Regex::new(&pattern).ok()?;
    re.captures(html).map(|caps| caps[1].to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
