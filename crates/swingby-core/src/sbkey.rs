//! SBKey generation: the fixed-width deduplication identity.
//!
//! An SBKey packs four segments into 32 characters:
//!
//! ```text
//! surname(6) + year(4) + first title word(6) + title initials(16)
//! ```
//!
//! Each segment is normalized, dot-padded or truncated to its width, and
//! has internal spaces replaced by dots. Missing author or year degrade to
//! the `.` sentinel; generation never fails. The same (title, author, year)
//! triple always yields the same key, which is the sole join key across the
//! knowledge store.

use crate::normalize::{extract_surname, normalize};

/// Width of the surname segment.
const SURNAME_WIDTH: usize = 6;
/// Width of the year segment.
const YEAR_WIDTH: usize = 4;
/// Width of the first-title-word segment.
const TITLE_WORD_WIDTH: usize = 6;
/// Width of the title-initials segment.
const INITIALS_WIDTH: usize = 16;

/// Total key width.
pub const SBKEY_WIDTH: usize = SURNAME_WIDTH + YEAR_WIDTH + TITLE_WORD_WIDTH + INITIALS_WIDTH;

/// Pad character used for truncated fields and missing-value sentinels.
const PAD: char = '.';

fn format_segment(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(PAD);
    }
    out.replace(' ', ".")
}

/// Generate the deterministic SBKey for a (title, author, year) triple.
///
/// Missing author and missing year degrade to sentinel-padded segments; an
/// empty or unnormalizable title degrades both title segments the same way.
pub fn generate_sbkey(title: &str, author: Option<&str>, year: Option<i32>) -> String {
    let surname = author
        .map(extract_surname)
        .map(|s| normalize(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PAD.to_string());
    let surname = format_segment(&surname, SURNAME_WIDTH);

    let year = year
        .map(|y| y.to_string())
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or_else(|| PAD.to_string());
    let year = format_segment(&year, YEAR_WIDTH);

    let normalized_title = normalize(title);
    let words: Vec<&str> = normalized_title.split_whitespace().collect();

    let first_word = words.first().copied().unwrap_or(".");
    let first_word = format_segment(first_word, TITLE_WORD_WIDTH);

    let initials: String = words
        .iter()
        .filter_map(|w| w.chars().next())
        .collect();
    let initials = if initials.is_empty() {
        PAD.to_string()
    } else {
        initials
    };
    let initials = format_segment(&initials, INITIALS_WIDTH);

    format!("{surname}{year}{first_word}{initials}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbkey_worked_example() {
        let key = generate_sbkey("The Test Title", Some("Test, Author"), Some(2099));
        assert_eq!(key, "test..2099the...ttt.............");
        assert_eq!(key.len(), SBKEY_WIDTH);
    }

    #[test]
    fn test_sbkey_long_title_truncates_segments() {
        let key = generate_sbkey(
            "LongerFirst a a a a a a a a a a a a a a a",
            Some("LongTest, Author"),
            Some(2099),
        );
        assert_eq!(key, "longte2099longerlaaaaaaaaaaaaaaa");
    }

    #[test]
    fn test_sbkey_is_deterministic() {
        let a = generate_sbkey("Dark Matter Halos", Some("Smith, J."), Some(2020));
        let b = generate_sbkey("Dark Matter Halos", Some("Smith, J."), Some(2020));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sbkey_missing_author_uses_sentinel() {
        let key = generate_sbkey("The Test Title", None, Some(2099));
        assert!(key.starts_with("......2099"));
        assert_eq!(key.len(), SBKEY_WIDTH);
    }

    #[test]
    fn test_sbkey_missing_year_uses_sentinel() {
        let key = generate_sbkey("The Test Title", Some("Test, Author"), None);
        assert!(key.starts_with("test......"));
        assert_eq!(key.len(), SBKEY_WIDTH);
    }

    #[test]
    fn test_sbkey_empty_title_never_panics() {
        let key = generate_sbkey("", Some("Test, Author"), Some(2020));
        assert_eq!(key.len(), SBKEY_WIDTH);
        assert!(key.ends_with("................"));
    }

    #[test]
    fn test_sbkey_multiword_surname_gets_dots() {
        let key = generate_sbkey("A Title", Some("van der Berg, A."), Some(2001));
        assert!(key.starts_with("van.de2001"));
    }

    #[test]
    fn test_sbkey_changes_with_each_field() {
        let base = generate_sbkey("The Test Title", Some("Test, Author"), Some(2099));
        assert_ne!(
            base,
            generate_sbkey("Another Test Title", Some("Test, Author"), Some(2099))
        );
        assert_ne!(
            base,
            generate_sbkey("The Test Title", Some("Other, Author"), Some(2099))
        );
        assert_ne!(
            base,
            generate_sbkey("The Test Title", Some("Test, Author"), Some(2100))
        );
    }
}
