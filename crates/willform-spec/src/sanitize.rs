//! Scrubbing applied to answer text before it is printed into a document.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::interpolate::strip_placeholders;

/// Resolved values longer than this are treated as payloads, not prose.
pub const MAX_RESOLVED_LEN: usize = 10_000;

/// Upper bound on a single exported clause.
pub const MAX_EXPORT_TEXT_LEN: usize = 5_000;

static OVERFLOW_EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+\.?\d*[eE][+-]?2\d+").expect("valid overflow pattern"));
static FLOAT_MAX_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)-?1\.8\d*e[+-]?\d+").expect("valid float max pattern")
});
static EXPONENT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+\.?\d*[eE][+-]?\d+").expect("valid exponent pattern"));

/// Data URIs (signatures, images) and oversized strings never belong in clause text.
pub fn is_binary_payload(text: &str) -> bool {
    text.starts_with("data:") || text.chars().count() > MAX_RESOLVED_LEN
}

/// Removes exponent-notation numbers that only appear when a numeric widget
/// overflowed, then caps the length of the text. Removing a number can
/// splice placeholder syntax back together, so both passes repeat until
/// neither changes the text.
pub fn sanitize_text(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_placeholders(&strip_overflowed_numbers(&current));
        if next == current {
            break;
        }
        current = next;
    }
    current.chars().take(MAX_EXPORT_TEXT_LEN).collect()
}

fn strip_overflowed_numbers(text: &str) -> String {
    let stripped = OVERFLOW_EXPONENT.replace_all(text, "");
    let stripped = FLOAT_MAX_PREFIX.replace_all(&stripped, "");
    EXPONENT_NUMBER
        .replace_all(&stripped, |caps: &Captures| {
            let matched = &caps[0];
            match matched.parse::<f64>() {
                Ok(number) if number.is_finite() && number.abs() < 1e10 => matched.to_string(),
                _ => String::new(),
            }
        })
        .into_owned()
}
