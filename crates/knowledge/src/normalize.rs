//! Text normalization ahead of chunking.

/// Lowercase `raw` and drop every character outside `[a-z0-9 \t\n$%,.]`.
///
/// Currency, percentage and decimal punctuation survive so the numeric
/// post-processor can still read figures out of the context.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| is_kept(*c))
        .collect()
}

fn is_kept(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | ' ' | '\t' | '\n' | '$' | '%' | ',' | '.')
}
