//! Search contexts - normalized run identifiers
//!
//! A search phrase is reduced to its non-stopword terms. The result names the
//! run everywhere: the staging directory, the index entry, the search query
//! and the `search_meta` tag on graph vertices.

use serde::{Deserialize, Serialize};

/// English stopwords removed from search phrases.
pub const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it",
    "it's", "its", "itself", "they", "them", "their", "theirs", "themselves",
    "what", "which", "who", "whom", "this", "that", "that'll", "these", "those",
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if",
    "or", "because", "as", "until", "while", "of", "at", "by", "for", "with",
    "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on",
    "off", "over", "under", "again", "further", "then", "once", "here", "there",
    "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same",
    "so", "than", "too", "very", "s", "t", "can", "will", "just", "don", "don't",
    "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
    "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't",
    "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren",
    "weren't", "won", "won't", "wouldn", "wouldn't",
];

/// Check whether a single word is a stopword (exact, case-sensitive match)
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// A normalized search phrase identifying one scraping run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchContext(String);

impl SearchContext {
    /// Normalize a raw search phrase, dropping stopwords and keeping word order
    pub fn from_phrase(phrase: &str) -> Self {
        let words: Vec<&str> = phrase
            .split_whitespace()
            .filter(|word| !is_stopword(word))
            .collect();
        Self(words.join(" "))
    }

    /// The space-joined terms
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Individual terms of the context
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    /// Underscore-joined form used for directory names and index rows
    pub fn dir_name(&self) -> String {
        self.terms().collect::<Vec<_>>().join("_")
    }

    /// Plus-joined form used in the search query string
    pub fn query_terms(&self) -> String {
        self.terms().collect::<Vec<_>>().join("+")
    }

    /// True when every word of the phrase was a stopword
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SearchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_stopwords() {
        let ctx = SearchContext::from_phrase("the data science");
        assert_eq!(ctx.as_str(), "data science");
        assert_eq!(ctx.dir_name(), "data_science");
        assert_eq!(ctx.query_terms(), "data+science");
    }

    #[test]
    fn test_preserves_order_and_drops_every_stopword() {
        let phrase = "a tool for parsing of the yaml and toml files in rust";
        let ctx = SearchContext::from_phrase(phrase);

        for term in ctx.terms() {
            assert!(!is_stopword(term), "{term} should have been removed");
        }
        assert_eq!(ctx.as_str(), "tool parsing yaml toml files rust");
    }

    #[test]
    fn test_collapses_whitespace() {
        let ctx = SearchContext::from_phrase("  web   scraping\tframework ");
        assert_eq!(ctx.as_str(), "web scraping framework");
    }

    #[test]
    fn test_all_stopwords_is_empty() {
        let ctx = SearchContext::from_phrase("the and of");
        assert!(ctx.is_empty());
        assert_eq!(ctx.dir_name(), "");
    }

    #[test]
    fn test_case_sensitive_match() {
        // The stopword list is lowercase, capitalized words are kept
        let ctx = SearchContext::from_phrase("The data");
        assert_eq!(ctx.as_str(), "The data");
    }
}
