//! Tokenizer for the free-text "mammals viewed" column.
//!
//! The cell is a comma-separated list of `<count> <label>` items, e.g.
//! `"4 Fin Whales, 1 Mola Mola, 5,130 Common Dolphin"`. A comma only separates
//! items when the character right before it is not a digit and the next
//! non-space character is one, so `5,130` stays a single number.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{normalize::normalize, report::ParsedObservation, species::AliasIndex};

use super::ParseStats;

static SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([\d,]+)\s+(.+)$").expect("valid regex"));

/// Splits `text` into item segments. Separator whitespace is trimmed.
pub fn split_segments(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if c == ','
            && !prev.is_some_and(|p| p.is_ascii_digit())
            && text[i + 1..]
                .trim_start()
                .starts_with(|n: char| n.is_ascii_digit())
        {
            out.push(text[start..i].trim());
            start = i + 1;
        }
        prev = Some(c);
    }
    out.push(text[start..].trim());
    out
}

/// Splits one segment into its count and label. `None` if the shape is wrong
/// or the count does not fit.
pub fn parse_segment(segment: &str) -> Option<(u32, &str)> {
    let caps = SEGMENT.captures(segment)?;
    let digits: String = caps[1].chars().filter(|c| *c != ',').collect();
    let count = digits
        .parse::<u32>()
        .ok()
        .filter(|n| i32::try_from(*n).is_ok())?;
    let label = caps
        .get(2)?
        .as_str()
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim_end();
    Some((count, label))
}

/// Tokenizes a detail cell and resolves every label through `index`.
///
/// Segments that do not parse or whose label the index does not know are
/// dropped and counted in `stats`.
pub fn parse_observations(
    detail: &str,
    index: &AliasIndex,
    stats: &mut ParseStats,
) -> Vec<ParsedObservation> {
    let text = normalize(detail);
    if text.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for segment in split_segments(&text) {
        if segment.is_empty() {
            continue;
        }
        let Some((count, label)) = parse_segment(segment) else {
            tracing::debug!(segment, "dropping malformed observation segment");
            stats.malformed_segments += 1;
            continue;
        };
        match index.resolve(label) {
            Some(species_id) => out.push(ParsedObservation::new(species_id, count)),
            None => {
                tracing::debug!(label, "dropping observation with unknown species");
                stats.unresolved_labels += 1;
                stats.unresolved.insert(label.to_string());
            }
        }
    }
    out
}
