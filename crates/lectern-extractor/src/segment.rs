//! Split documents into header-delimited sections

use lectern_domain::Section;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Markdown, numbered and all-caps headings
static HEADER_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^#{1,6}\s+.+$").expect("static regex is valid"),
        Regex::new(r"^\d+\.\s+[A-Z].+$").expect("static regex is valid"),
        Regex::new(r"^[A-Z][A-Z\s]+$").expect("static regex is valid"),
    ]
});

/// Whether a single line looks like a section heading
pub fn is_header(line: &str) -> bool {
    HEADER_PATTERNS.iter().any(|pattern| pattern.is_match(line))
}

/// Split a document into ordered, non-overlapping, trimmed sections
///
/// A header line closes the section being accumulated (if it has any
/// non-blank content) and opens a new one. When this yields one section or
/// fewer, the document is split into blank-line separated paragraphs instead.
pub fn segment(document: &str) -> Vec<Section> {
    let mut texts: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in document.split('\n') {
        if is_header(line) && !current.trim().is_empty() {
            texts.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        texts.push(current.trim().to_string());
    }

    if texts.len() <= 1 {
        texts = document
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(str::to_string)
            .collect();
        debug!("No headings found, split into {} paragraphs", texts.len());
    } else {
        debug!("Split document into {} sections", texts.len());
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Section::new(index, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sections: &[Section]) -> Vec<&str> {
        sections.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_header_patterns() {
        assert!(is_header("# Title"));
        assert!(is_header("###### Deep"));
        assert!(is_header("3. Transactions"));
        assert!(is_header("JOINS"));
        assert!(is_header("NORMAL FORMS"));

        assert!(!is_header("#NoSpace"));
        assert!(!is_header("3. lowercase start"));
        assert!(!is_header("Joins are useful"));
        assert!(!is_header("A"));
        assert!(!is_header(""));
    }

    #[test]
    fn test_splits_on_all_caps_headers() {
        let doc = "INTRO\nWelcome.\nJOINS\nAn INNER JOIN combines rows.\n\nOTHER\nUnrelated text.";
        let sections = segment(doc);

        assert_eq!(
            texts(&sections),
            vec![
                "INTRO\nWelcome.",
                "JOINS\nAn INNER JOIN combines rows.",
                "OTHER\nUnrelated text."
            ]
        );
        assert_eq!(sections[2].index, 2);
        assert_eq!(sections[1].header(), "JOINS");
    }

    #[test]
    fn test_splits_on_markdown_headers() {
        let doc = "# One\nalpha\n## Two\nbeta\n";
        let sections = segment(doc);
        assert_eq!(texts(&sections), vec!["# One\nalpha", "## Two\nbeta"]);
    }

    #[test]
    fn test_leading_header_does_not_create_empty_section() {
        let doc = "\n\n1. Basics\nfirst\n2. Advanced\nsecond";
        let sections = segment(doc);
        assert_eq!(texts(&sections), vec!["1. Basics\nfirst", "2. Advanced\nsecond"]);
    }

    #[test]
    fn test_falls_back_to_paragraphs() {
        let doc = "first paragraph\nstill first\n\nsecond paragraph\n\n\n\nthird";
        let sections = segment(doc);
        assert_eq!(
            texts(&sections),
            vec!["first paragraph\nstill first", "second paragraph", "third"]
        );
    }

    #[test]
    fn test_single_paragraph_document() {
        let sections = segment("  just one thing  ");
        assert_eq!(texts(&sections), vec!["just one thing"]);
    }

    #[test]
    fn test_empty_and_blank_documents() {
        assert!(segment("").is_empty());
        assert!(segment("  \n\n \n").is_empty());
    }

    #[test]
    fn test_sections_reconstruct_document() {
        let doc = "PREFACE\nSome words here.\n\nCHAPTER ONE\nMore words.\n# Notes\nEnd.";
        let joined: String = segment(doc)
            .iter()
            .flat_map(|s| s.text.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");
        let original: String = doc.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(joined, original);
    }
}
