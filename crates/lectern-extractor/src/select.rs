//! Budgeted selection of relevant sections
//!
//! # Algorithm
//!
//! 1. Rank positive-score sections by descending score (ties keep document order)
//! 2. Append whole sections, separated by blank lines, while they fit the budget
//! 3. If the first overflowing section arrives while less than
//!    `truncation_eligibility` of the budget is used, append as much of it as
//!    fits together with a `...` marker, then stop
//! 4. If the result is shorter than `min_viable_chars`, use the head of the
//!    document instead
//!
//! All lengths are counted in characters.

use crate::segment::segment;
use crate::ExtractorConfig;
use lectern_domain::{score_sections, KeywordSet, ScoredSection};
use tracing::debug;

const SEPARATOR: &str = "\n\n";
const ELLIPSIS: &str = "...";

/// Extract the part of `document` most relevant to `topic`
///
/// Never fails: an empty document yields an empty string, and a blank topic
/// (no keywords) yields the head of the document.
///
/// # Examples
///
/// ```
/// use lectern_extractor::{extract_relevant, ExtractorConfig};
///
/// let doc = "INTRO\nHello.\nJOINS\nAn INNER JOIN combines rows.";
/// let config = ExtractorConfig::default().with_budget(40);
/// let content = extract_relevant(doc, "joins", &config);
/// assert!(content.chars().count() <= 40);
/// ```
pub fn extract_relevant(document: &str, topic: &str, config: &ExtractorConfig) -> String {
    if document.is_empty() {
        return String::new();
    }

    let keywords = KeywordSet::from_topic(topic);
    let sections = segment(document);
    let scored = score_sections(&sections, &keywords);

    debug!(
        "Topic '{}': {} keywords, {} of {} sections relevant",
        topic.trim(),
        keywords.len(),
        scored.len(),
        sections.len()
    );

    select(&scored, document, config)
}

/// Assemble at most `config.budget_chars` characters from scored sections
pub fn select(scored: &[ScoredSection], document: &str, config: &ExtractorConfig) -> String {
    let budget = config.budget_chars;

    let mut ranked: Vec<&ScoredSection> = scored.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut content = String::new();
    let mut used = 0usize;

    for candidate in ranked {
        let section_len = candidate.section.char_len();

        if used + section_len <= budget {
            content.push_str(&candidate.section.text);
            content.push_str(SEPARATOR);
            used += section_len + SEPARATOR.len();
            continue;
        }

        if (used as f64) < config.truncation_eligibility * budget as f64 {
            let remaining = budget.saturating_sub(used);
            if remaining > ELLIPSIS.len() {
                let keep = remaining - ELLIPSIS.len();
                content.extend(candidate.section.text.chars().take(keep));
                content.push_str(ELLIPSIS);
                debug!(
                    "Truncated section {} to {} of {} chars",
                    candidate.section.index, keep, section_len
                );
            }
        }
        break;
    }

    let content = content.trim();
    let content_len = content.chars().count();

    if content.is_empty() || content_len < config.min_viable_chars {
        debug!(
            "Selected content too short ({} chars), using document head",
            content_len
        );
        return document.chars().take(budget).collect();
    }

    debug!("Selected {} chars (budget {})", content_len, budget);
    content.to_string()
}
