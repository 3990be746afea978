//! Numeric token scanning.
//!
//! A numeric token is a run of four or more digits, optionally written with
//! thousands separators (`1,000`, `123456`, `12,345,678`).

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d{1,3}(?:,\d{3})+|\d{4,})\b").expect("valid regex"));

/// A numeric token found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericToken {
    /// Value with separators stripped
    pub value: u64,
    /// Byte offset of the token in the scanned text
    pub start: usize,
}

/// All numeric tokens in `text`, in order of appearance.
///
/// Tokens too large for `u64` are skipped.
pub fn scan_numbers(text: &str) -> Vec<NumericToken> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| {
            let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse().ok().map(|value| NumericToken {
                value,
                start: m.start(),
            })
        })
        .collect()
}

/// Values of the numeric tokens in `text`.
pub fn scan_values(text: &str) -> Vec<u64> {
    scan_numbers(text).into_iter().map(|t| t.value).collect()
}
