//! Relevance scoring of sections against a keyword set
//!
//! Scoring is plain substring counting: no stemming, no semantics. Longer
//! keywords are weighted higher because they are more specific, and a
//! keyword appearing in a section's header earns a flat bonus on top of its
//! occurrences.

use crate::{KeywordSet, ScoredSection, Section};

/// Flat bonus per keyword found in the header line
pub const HEADER_BONUS: f64 = 10.0;

/// Characters per unit of keyword weight
const WEIGHT_DIVISOR: f64 = 5.0;

/// Score a section against a keyword set
///
/// For each keyword: case-insensitive, non-overlapping occurrence count
/// multiplied by `chars(keyword) / 5`. Each keyword present in the header
/// line adds [`HEADER_BONUS`] once, regardless of how often it occurs.
/// A section with no keyword match scores exactly `0.0`.
///
/// # Examples
///
/// ```
/// use lectern_domain::{score, KeywordSet, Section};
///
/// let keywords = KeywordSet::from_terms(["joins"]);
/// let section = Section::new(0, "JOINS\nTwo joins later");
/// // two occurrences * (5 / 5) + header bonus
/// assert_eq!(score(&section, &keywords), 12.0);
/// ```
pub fn score(section: &Section, keywords: &KeywordSet) -> f64 {
    let body = section.text.to_lowercase();
    let header = section.header().to_lowercase();

    let mut total = 0.0;
    for keyword in keywords.iter().filter(|k| !k.is_empty()) {
        let count = body.matches(keyword).count() as f64;
        let weight = keyword.chars().count() as f64 / WEIGHT_DIVISOR;
        total += count * weight;

        if header.contains(keyword) {
            total += HEADER_BONUS;
        }
    }

    total
}

/// Score every section and keep only those that matched at all
///
/// The result stays in document order; ranking is the selector's job.
pub fn score_sections(sections: &[Section], keywords: &KeywordSet) -> Vec<ScoredSection> {
    sections
        .iter()
        .filter_map(|section| {
            let value = score(section, keywords);
            (value > 0.0).then(|| ScoredSection::new(value, section.clone()))
        })
        .collect()
}
