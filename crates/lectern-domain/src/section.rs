//! Section module - header-delimited chunks of a document

/// A contiguous, trimmed chunk of a document
///
/// The first line is treated as the section's header. Sections remember
/// their position in the source document so that ranking can fall back to
/// document order on ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Zero-based position of the section in the document
    pub index: usize,

    /// Section text, trimmed of surrounding whitespace
    pub text: String,
}

impl Section {
    /// Create a new section
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// The first line of the section
    pub fn header(&self) -> &str {
        self.text.split('\n').next().unwrap_or("")
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A section paired with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection {
    /// Relevance score (always positive once produced by the scorer)
    pub score: f64,

    /// The scored section
    pub section: Section,
}

impl ScoredSection {
    /// Pair a section with a score
    pub fn new(score: f64, section: Section) -> Self {
        Self { score, section }
    }
}
