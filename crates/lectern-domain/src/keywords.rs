//! Keyword module - normalised search terms derived from a topic

/// Words too common to say anything about relevance
pub const STOP_WORDS: &[&str] = &[
    "in", "the", "a", "an", "and", "or", "of", "to", "for", "with", "on", "at",
];

/// Minimum token length (exclusive) for a word to count as a keyword
const MIN_TOKEN_CHARS: usize = 2;

/// Keywords used to score document sections against a topic
///
/// Built from a topic string: every lowercase word token longer than two
/// characters that is not a stop word, followed by the whole lowercased
/// topic phrase. Order and duplicates are preserved, so a one-word topic
/// contributes its word twice (once as a token, once as the phrase).
///
/// # Examples
///
/// ```
/// use lectern_domain::KeywordSet;
///
/// let keywords = KeywordSet::from_topic("Transactions in DBMS");
/// assert_eq!(
///     keywords.as_slice(),
///     &["transactions", "dbms", "transactions in dbms"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Derive the keyword set for a topic
    pub fn from_topic(topic: &str) -> Self {
        let phrase = topic.trim().to_lowercase();

        let mut keywords: Vec<String> = phrase
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
            .filter(|word| !STOP_WORDS.contains(word))
            .map(str::to_string)
            .collect();

        if !phrase.is_empty() {
            keywords.push(phrase);
        }

        Self { keywords }
    }

    /// Build a keyword set from explicit, already-chosen terms
    ///
    /// Terms are lowercased and trimmed; blank terms are dropped.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { keywords }
    }

    /// Iterate over the keywords in derivation order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// The keywords as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    /// Number of keywords (duplicates included)
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// True when the topic produced no usable keyword
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_and_short_tokens_removed() {
        let keywords = KeywordSet::from_topic("Joins in SQL and the ER model");
        assert_eq!(
            keywords.as_slice(),
            &["joins", "sql", "model", "joins in sql and the er model"]
        );
    }

    #[test]
    fn test_single_word_topic_appears_twice() {
        let keywords = KeywordSet::from_topic("Joins");
        assert_eq!(keywords.as_slice(), &["joins", "joins"]);
    }

    #[test]
    fn test_blank_topic_is_empty() {
        assert!(KeywordSet::from_topic("").is_empty());
        assert!(KeywordSet::from_topic("   \n").is_empty());
    }

    #[test]
    fn test_short_topic_keeps_phrase_only() {
        let keywords = KeywordSet::from_topic("ER");
        assert_eq!(keywords.as_slice(), &["er"]);
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let keywords = KeywordSet::from_topic("B-Trees, hashing");
        assert_eq!(
            keywords.as_slice(),
            &["trees", "hashing", "b-trees, hashing"]
        );
    }

    #[test]
    fn test_from_terms_normalises() {
        let keywords = KeywordSet::from_terms(["  Chapter 5 ", "", "UNIT"]);
        assert_eq!(keywords.as_slice(), &["chapter 5", "unit"]);
        assert_eq!(keywords.len(), 2);
    }
}
