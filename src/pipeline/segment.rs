//! Topic segmentation and technical-term candidate selection.
//!
//! Both are deterministic string rules with no I/O. Topics are whatever
//! sits between blank lines; candidate terms are whitespace-delimited
//! tokens that are entirely alphabetic and entirely uppercase (acronyms,
//! in practice). The term filter deliberately over-selects shouted words
//! and misses mixed-case jargon; the definition prompt downstream is what
//! gives the survivors their context.

use std::collections::HashSet;

/// Split extracted text into topics on blank-line boundaries.
///
/// `k` separators yield exactly `k + 1` topics, order preserved. Empty
/// chunks are kept: an empty topic still flows through the pipeline and
/// produces a (trivial) summary, which keeps topic indices aligned with
/// the source text.
pub fn split_topics(text: &str) -> Vec<String> {
    text.split("\n\n").map(str::to_string).collect()
}

/// Pick candidate technical terms out of one topic.
///
/// A token qualifies when every character is alphabetic and uppercase.
/// Duplicates are dropped; first appearance wins, so definition order is
/// deterministic and follows the source text.
pub fn technical_terms(topic: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for token in topic.split_whitespace() {
        let qualifies = !token.is_empty()
            && token.chars().all(|c| c.is_alphabetic())
            && token.chars().all(|c| c.is_uppercase());
        if qualifies && seen.insert(token) {
            terms.push(token.to_string());
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines_preserving_order() {
        assert_eq!(split_topics("A\n\nB\n\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn keeps_empty_chunks() {
        assert_eq!(split_topics("A\n\n\n\nB"), vec!["A", "", "B"]);
        assert_eq!(split_topics(""), vec![""]);
        assert_eq!(split_topics("A\n\n"), vec!["A", ""]);
    }

    #[test]
    fn single_newlines_do_not_split() {
        assert_eq!(split_topics("A\nB"), vec!["A\nB"]);
    }

    #[test]
    fn selects_uppercase_alphabetic_tokens() {
        assert_eq!(
            technical_terms("The GPU and CPU run ML models"),
            vec!["GPU", "CPU", "ML"]
        );
    }

    #[test]
    fn excludes_tokens_with_non_alphabetic_characters() {
        assert!(technical_terms("AI-powered systems").is_empty());
        assert!(technical_terms("GPT4 and L2 caches").is_empty());
    }

    #[test]
    fn excludes_mixed_case_tokens() {
        assert!(technical_terms("GPUs and Transformers").is_empty());
    }

    #[test]
    fn dedupes_keeping_first_appearance() {
        assert_eq!(
            technical_terms("ML beats GPU beats ML beats GPU"),
            vec!["ML", "GPU"]
        );
    }

    #[test]
    fn empty_topic_has_no_terms() {
        assert!(technical_terms("").is_empty());
        assert!(technical_terms("   \n  ").is_empty());
    }
}
