//! Extract a named chapter or unit from a document

use crate::segment::segment;
use crate::select::extract_relevant;
use crate::ExtractorConfig;
use tracing::debug;

/// Header words that announce a new chapter
pub const CHAPTER_MARKERS: &[&str] = &["chapter", "unit", "section", "part"];

/// How far into a section the start keywords are looked for (characters)
const START_WINDOW_CHARS: usize = 200;

/// Extract the contiguous run of sections belonging to one chapter
///
/// The chapter starts at the first section whose opening characters mention
/// any of `chapter_keywords` (case-insensitive) and runs until a later
/// section whose header carries a chapter marker but none of the keywords.
/// Without a match, falls back to [`extract_relevant`] on the joined keywords.
pub fn extract_chapter(
    document: &str,
    chapter_keywords: &[&str],
    config: &ExtractorConfig,
) -> String {
    let keywords: Vec<String> = chapter_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let mentions_keyword = |text: &str| keywords.iter().any(|k| text.contains(k.as_str()));

    let mut chapter: Vec<String> = Vec::new();

    if !keywords.is_empty() {
        for section in segment(document) {
            if chapter.is_empty() {
                let opening: String = section
                    .text
                    .chars()
                    .take(START_WINDOW_CHARS)
                    .collect::<String>()
                    .to_lowercase();
                if mentions_keyword(&opening) {
                    debug!("Chapter starts at section {}", section.index);
                    chapter.push(section.text);
                }
                continue;
            }

            let header = section.header().to_lowercase();
            let is_new_chapter = CHAPTER_MARKERS.iter().any(|m| header.contains(m));
            if is_new_chapter && !mentions_keyword(&header) {
                debug!("Chapter ends before section {}", section.index);
                break;
            }
            chapter.push(section.text);
        }
    }

    if chapter.is_empty() {
        debug!("No chapter matched, falling back to relevance extraction");
        return extract_relevant(document, &chapter_keywords.join(" "), config);
    }

    chapter.join("\n\n")
}
