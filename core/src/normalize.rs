//! Name normalization for cross-provider comparison.
//!
//! Providers disagree on casing, whitespace, and diacritics
//! ("André Onana" vs "Andre Onana", "Estêvão" vs "Estevao"), so all
//! comparisons run on a normalized form that folds those differences
//! away. The normalized form is derived on demand and never persisted.

/// Normalize a display name into its comparison form.
///
/// Lowercases, trims, collapses internal whitespace runs to single
/// spaces, and folds accented Latin letters to their unaccented base.
/// Total and idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fold one accented Latin character to its base letter.
///
/// Covers the Western-European set plus the Slavic/Turkish letters
/// that show up in Premier League rosters. Anything unknown passes
/// through unchanged.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'ı' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ý' => 'y',
        'ñ' => 'n',
        'ç' | 'ć' | 'č' => 'c',
        'š' | 'ş' => 's',
        'ž' => 'z',
        'đ' => 'd',
        'ğ' => 'g',
        other => other,
    }
}
