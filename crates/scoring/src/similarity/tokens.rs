//! Title normalisation shared by the name-based factors.

use std::collections::HashSet;

/// Lowercase, drop everything that is not alphanumeric or whitespace, and
/// collapse runs of whitespace to a single space.
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct title tokens, without single characters and stopwords.
pub fn title_tokens(title: &str, stopwords: &[String]) -> HashSet<String> {
    normalize_title(title)
        .split(' ')
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !stopwords.iter().any(|s| s == token))
        .map(str::to_string)
        .collect()
}
