//! Token-order-insensitive name similarity.
//!
//! Provider display-name ordering is inconsistent ("Smith John" vs
//! "John Smith", "de Bruyne, Kevin" vs "Kevin De Bruyne"), so the
//! scorer sorts whitespace tokens before applying a character-level
//! edit-distance ratio. Punctuation is stripped during tokenization;
//! it carries no identity signal.

use crate::normalize::normalize;
use strsim::normalized_levenshtein;

/// Tokenize a name for scoring: normalize, drop non-alphanumeric
/// characters, split on whitespace.
fn tokenize(s: &str) -> Vec<String> {
    normalize(s)
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Similarity between two display names as an integer in [0, 100].
///
/// Tokens from both names are sorted and rejoined before the
/// Levenshtein ratio, so word order never affects the score.
/// Identical names score 100; either side empty after tokenization
/// scores 0.
pub fn token_sort_score(a: &str, b: &str) -> u8 {
    let mut tokens_a = tokenize(a);
    let mut tokens_b = tokenize(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    tokens_a.sort();
    tokens_b.sort();

    let joined_a = tokens_a.join(" ");
    let joined_b = tokens_b.join(" ");

    (normalized_levenshtein(&joined_a, &joined_b) * 100.0).round() as u8
}
