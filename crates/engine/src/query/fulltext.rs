//! `$fulltext` relevance scoring
//!
//! Query text is split on whitespace; tokens shorter than
//! `min_token_len` characters and stopwords are dropped. The document field
//! is split the same way but keeps every token. The score is the number of
//! (field token, query token) pairs that are equal ignoring case, divided by
//! the number of field tokens.

use crate::config::FullTextConfig;
use shelfdb_core::Value;

/// Lowercased query tokens with short words and stopwords removed
pub fn tokenize_query(text: &str, config: &FullTextConfig) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| t.chars().count() >= config.min_token_len)
        .filter(|t| !config.is_stopword(t))
        .map(str::to_lowercase)
        .collect()
}

/// Lowercased field tokens, nothing removed
pub fn tokenize_field(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Fractional relevance of `field` for `query`; 0.0 for non-strings
pub fn score(query: &str, field: &Value, config: &FullTextConfig) -> f64 {
    let Some(text) = field.as_str() else {
        return 0.0;
    };
    let words = tokenize_field(text);
    if words.is_empty() {
        return 0.0;
    }
    let terms = tokenize_query(query, config);
    let overlap = words
        .iter()
        .map(|w| terms.iter().filter(|t| *t == w).count())
        .sum::<usize>();
    overlap as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_query_drops_stopwords_and_short_tokens() {
        let config = FullTextConfig::default();
        assert_eq!(tokenize_query("test is a", &config), vec!["test"]);
        assert_eq!(
            tokenize_query("The Quick x brown", &config),
            vec!["quick", "brown"]
        );
    }

    #[test]
    fn test_tokenize_field_keeps_everything() {
        assert_eq!(
            tokenize_field("this is  a Test"),
            vec!["this", "is", "a", "test"]
        );
    }

    #[test]
    fn test_score_is_overlap_over_field_length() {
        let config = FullTextConfig::default();
        let one = score("test is a", &Value::from("this is a test"), &config);
        assert!((one - 0.25).abs() < 1e-12);

        let two = score("test is a", &Value::from("this is a test of a test"), &config);
        assert!((two - 2.0 / 7.0).abs() < 1e-12);
        assert!(two > one);
    }

    #[test]
    fn test_score_is_case_insensitive() {
        let config = FullTextConfig::default();
        assert!(score("RUST", &Value::from("rust Rust"), &config) > 0.99);
    }

    #[test]
    fn test_score_zero_cases() {
        let config = FullTextConfig::default();
        assert_eq!(score("test", &Value::Int(3), &config), 0.0);
        assert_eq!(score("test", &Value::from(""), &config), 0.0);
        assert_eq!(score("the a", &Value::from("the a"), &config), 0.0);
        assert_eq!(score("missing", &Value::from("nothing here"), &config), 0.0);
    }
}
