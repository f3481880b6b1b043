//! Text normalization for label lookup keys.
//!
//! [`normalize`] is the single place a free-text label becomes a lookup key.
//! The alias index applies it to catalog aliases and the row parser applies it
//! to observation labels; if the two sides ever diverged, resolution would
//! silently miss.

use unicode_normalization::UnicodeNormalization;

/// Canonicalizes `s` into a comparable lowercase key.
///
/// Steps: NFKC, then NBSP/soft hyphen to space, en dash/em dash/minus sign to
/// `-`, curly apostrophes to `'`, lowercase, trim, and collapse whitespace runs
/// to a single space. Empty input yields an empty string.
///
/// ```
/// use whale_sync::normalize::normalize;
///
/// assert_eq!(normalize("  Risso\u{2019}s\u{00A0}  Dolphin "), "risso's dolphin");
/// assert_eq!(normalize("White\u{2013}sided"), "white-sided");
/// ```
pub fn normalize(s: &str) -> String {
    let mapped: String = s
        .nfkc()
        .map(|c| match c {
            '\u{00A0}' | '\u{00AD}' => ' ',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    mapped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
