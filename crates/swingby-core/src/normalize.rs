//! Text canonicalization for title comparison and key generation.
//!
//! All bibliographic comparisons go through [`normalize`] first, so that
//! punctuation, casing, and spacing differences between providers never
//! cause a spurious mismatch.

use std::sync::LazyLock;

use regex::Regex;
use similar::TextDiff;

/// Default similarity ratio above which two titles count as the same work.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));

/// Lower-case, collapse all non-alphanumeric runs to single spaces, trim.
///
/// Alphanumeric means ASCII here: accented and non-Latin characters act as
/// separators, which keeps generated keys stable across providers that
/// transliterate names differently. Empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    NON_ALNUM
        .replace_all(text, " ")
        .trim()
        .to_ascii_lowercase()
}

/// Exact equality of normalized forms.
pub fn is_equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Fuzzy equality of normalized forms using a sequence-similarity ratio.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return true;
    }
    TextDiff::from_chars(a.as_str(), b.as_str()).ratio() as f64 >= threshold
}

/// Extract the surname from a full name.
///
/// Names in "Last, First" form split on the comma; otherwise the last
/// whitespace-delimited token is taken. Empty input yields an empty string.
pub fn extract_surname(full_name: &str) -> String {
    if let Some((last, _)) = full_name.split_once(',') {
        return last.trim().to_string();
    }
    full_name
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_string()
}

/// First element of a list-or-scalar value.
///
/// Bibliographic providers disagree on whether fields like `title` and
/// `author` are strings or one-element lists; this flattens both.
pub fn first_string(values: &[String]) -> Option<&str> {
    values.first().map(String::as_str)
}
