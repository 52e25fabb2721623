//! Resolve detected character names against the comic's roster.
//!
//! Matching is deliberately loose: a roster name matches a detected name
//! when either one contains the other, ignoring case. That lets "the
//! knight" find "Sir Knight", at the cost of "Ann" also matching "Anna".

use crate::model::{Character, CharacterReference};

/// Symmetric, case-insensitive containment.
pub fn name_matches(roster_name: &str, detected_name: &str) -> bool {
    let roster = roster_name.to_lowercase();
    let detected = detected_name.to_lowercase();
    roster.contains(&detected) || detected.contains(&roster)
}

/// Roster characters whose name matches any detected name, in roster order.
///
/// Ignores whether the character has a reference image.
pub fn matched_characters<'a>(
    detected_names: &[String],
    roster: &'a [Character],
) -> Vec<&'a Character> {
    roster
        .iter()
        .filter(|c| detected_names.iter().any(|d| name_matches(&c.name, d)))
        .collect()
}

/// Matched characters that can serve as visual references.
///
/// Characters without a stored reference image are skipped even when
/// their name matches.
pub fn resolve_references(
    detected_names: &[String],
    roster: &[Character],
) -> Vec<CharacterReference> {
    matched_characters(detected_names, roster)
        .into_iter()
        .filter_map(|c| {
            c.reference().map(|image| CharacterReference {
                name: c.name.clone(),
                image: image.clone(),
            })
        })
        .collect()
}
