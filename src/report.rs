//! The typed report: what the pipeline hands to the renderer.
//!
//! The orchestrator produces a sequence of tagged [`ReportBlock`]s (summaries
//! and term definitions) and the PDF renderer consumes them directly.
//! The older flat-text report format (`Summary:` / `Technical Terms and
//! Definitions:` markers separated by blank lines) survives as a
//! *serialization* of that sequence:
//!
//! * [`Report::to_text`] writes it, byte-for-byte compatible with the
//!   historical output, and
//! * [`Report::parse`] reads it back, using the same blank-line splitting
//!   and marker matching the old renderer used.
//!
//! Keeping the markers out of the pipeline proper means a summary that
//! happens to contain a blank line or a `Summary:` prefix can no longer be
//! mis-attributed between orchestrator and renderer. The flat format still
//! has those collisions; `parse` exists for compatibility, not fidelity.

use serde::{Deserialize, Serialize};

use crate::output::TopicResult;

/// Marker line prefix for a summary chunk in the flat format.
const SUMMARY_MARKER: &str = "Summary:";
/// Marker line for a term-definitions chunk in the flat format.
const TERMS_MARKER: &str = "Technical Terms and Definitions:";

/// One block of the report, in render order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportBlock {
    /// A topic summary, exactly as the model returned it (untrimmed).
    Summary { text: String },
    /// One defined technical term.
    Term { term: String, definition: String },
    /// Body text the flat format could not attribute to either marker.
    /// Produced only by [`Report::parse`]; the pipeline never emits it.
    Paragraph { text: String },
}

/// An ordered sequence of report blocks.
///
/// Within a run of consecutive [`ReportBlock::Term`]s the renderer emits a
/// single "Technical Terms and Definitions" section; runs are always
/// delimited by the next topic's summary block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub blocks: Vec<ReportBlock>,
}

impl Report {
    /// Assemble the report from per-topic results, preserving topic order
    /// and, within a topic, candidate term order.
    pub fn from_topics(topics: &[TopicResult]) -> Self {
        let mut blocks = Vec::new();
        for topic in topics {
            blocks.push(ReportBlock::Summary {
                text: topic.summary.clone(),
            });
            for entry in &topic.terms {
                blocks.push(ReportBlock::Term {
                    term: entry.term.clone(),
                    definition: entry.definition.clone(),
                });
            }
        }
        Self { blocks }
    }

    /// Serialize to the flat report format.
    ///
    /// Each summary becomes `Summary:\n{text}\n\n`; each run of terms becomes
    /// `Technical Terms and Definitions:\n` followed by one
    /// `{term}: {definition}\n` line per term and a closing blank line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut in_terms = false;
        for block in &self.blocks {
            if in_terms && !matches!(block, ReportBlock::Term { .. }) {
                out.push('\n');
                in_terms = false;
            }
            match block {
                ReportBlock::Summary { text } => {
                    out.push_str(SUMMARY_MARKER);
                    out.push('\n');
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                ReportBlock::Term { term, definition } => {
                    if !in_terms {
                        out.push_str(TERMS_MARKER);
                        out.push('\n');
                        in_terms = true;
                    }
                    out.push_str(term);
                    out.push_str(": ");
                    out.push_str(definition);
                    out.push('\n');
                }
                ReportBlock::Paragraph { text } => {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
            }
        }
        if in_terms {
            out.push('\n');
        }
        out
    }

    /// Parse a flat report back into typed blocks.
    ///
    /// Mirrors the historical renderer: split on blank lines, then match each
    /// chunk against the two markers. A chunk starting with `Summary:` keeps
    /// the remainder after the colon, trimmed. A chunk containing the terms
    /// marker yields one term per following line, split at the first colon.
    /// Anything else non-empty becomes a [`ReportBlock::Paragraph`].
    pub fn parse(text: &str) -> Self {
        let mut blocks = Vec::new();
        for chunk in text.split("\n\n") {
            if let Some(rest) = chunk.strip_prefix(SUMMARY_MARKER) {
                blocks.push(ReportBlock::Summary {
                    text: rest.trim().to_string(),
                });
            } else if chunk.contains(TERMS_MARKER) {
                for line in chunk.lines().skip(1) {
                    let (term, definition) = match line.split_once(':') {
                        Some((t, d)) => (t.to_string(), d.trim().to_string()),
                        None => (line.to_string(), String::new()),
                    };
                    blocks.push(ReportBlock::Term { term, definition });
                }
            } else if !chunk.trim().is_empty() {
                blocks.push(ReportBlock::Paragraph {
                    text: chunk.to_string(),
                });
            }
        }
        Self { blocks }
    }

    /// Number of summary blocks (one per topic).
    pub fn summary_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, ReportBlock::Summary { .. }))
            .count()
    }

    /// Number of term blocks across all topics.
    pub fn term_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, ReportBlock::Term { .. }))
            .count()
    }

    /// Number of term *sections* (runs of consecutive term blocks), which is
    /// what the renderer draws one heading for.
    pub fn term_section_count(&self) -> usize {
        let mut sections = 0;
        let mut prev_was_term = false;
        for block in &self.blocks {
            let is_term = matches!(block, ReportBlock::Term { .. });
            if is_term && !prev_was_term {
                sections += 1;
            }
            prev_was_term = is_term;
        }
        sections
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TermEntry;

    fn topic(num: usize, summary: &str, terms: &[(&str, &str)]) -> TopicResult {
        TopicResult {
            topic_num: num,
            summary: summary.to_string(),
            terms: terms
                .iter()
                .map(|(t, d)| TermEntry {
                    term: t.to_string(),
                    definition: d.to_string(),
                })
                .collect(),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 0,
            errors: vec![],
        }
    }

    #[test]
    fn to_text_topic_with_terms_exact_format() {
        let report = Report::from_topics(&[topic(
            1,
            "GPUs accelerate training.",
            &[("GPU", "a graphics processing unit")],
        )]);
        assert_eq!(
            report.to_text(),
            "Summary:\nGPUs accelerate training.\n\n\
             Technical Terms and Definitions:\nGPU: a graphics processing unit\n\n"
        );
    }

    #[test]
    fn to_text_topic_without_terms() {
        let report = Report::from_topics(&[topic(1, "Plain prose.", &[])]);
        assert_eq!(report.to_text(), "Summary:\nPlain prose.\n\n");
    }

    #[test]
    fn to_text_terms_then_next_summary_are_blank_line_separated() {
        let report = Report::from_topics(&[
            topic(1, "First.", &[("ML", "machine learning")]),
            topic(2, "Second.", &[]),
        ]);
        assert_eq!(
            report.to_text(),
            "Summary:\nFirst.\n\n\
             Technical Terms and Definitions:\nML: machine learning\n\n\
             Summary:\nSecond.\n\n"
        );
    }

    #[test]
    fn parse_round_trip_preserves_counts() {
        let report = Report::from_topics(&[
            topic(1, "First topic.", &[("GPU", "def one"), ("CPU", "def two")]),
            topic(2, "Second topic.", &[]),
            topic(3, "Third topic.", &[("ML", "def three")]),
        ]);
        let reparsed = Report::parse(&report.to_text());

        assert_eq!(reparsed.summary_count(), 3);
        assert_eq!(reparsed.term_count(), 3);
        assert_eq!(reparsed.term_section_count(), 2);
        assert_eq!(report.term_section_count(), 2);
    }

    #[test]
    fn parse_trims_summary_after_the_marker() {
        let report = Report::parse("Summary:\n  spaced out  \n\n");
        assert_eq!(
            report.blocks,
            vec![ReportBlock::Summary {
                text: "spaced out".to_string()
            }]
        );
    }

    #[test]
    fn parse_splits_term_lines_at_first_colon() {
        let text = "Technical Terms and Definitions:\nHTTP: a protocol: stateless\n\n";
        let report = Report::parse(text);
        assert_eq!(
            report.blocks,
            vec![ReportBlock::Term {
                term: "HTTP".to_string(),
                definition: "a protocol: stateless".to_string()
            }]
        );
    }

    #[test]
    fn parse_keeps_unattributed_chunks_as_paragraphs() {
        let report = Report::parse("just some text\n\n");
        assert_eq!(
            report.blocks,
            vec![ReportBlock::Paragraph {
                text: "just some text".to_string()
            }]
        );
    }

    #[test]
    fn flat_format_splits_summaries_containing_blank_lines() {
        // The known collision of the flat format: a blank line inside a
        // summary severs it into a summary plus a paragraph on re-parse. The
        // typed blocks carry it intact.
        let report = Report::from_topics(&[topic(1, "part one\n\npart two", &[])]);
        assert_eq!(report.summary_count(), 1);

        let reparsed = Report::parse(&report.to_text());
        assert_eq!(reparsed.summary_count(), 1);
        assert_eq!(
            reparsed.blocks[1],
            ReportBlock::Paragraph {
                text: "part two".to_string()
            }
        );
    }

    #[test]
    fn empty_report_serializes_to_empty_text() {
        assert_eq!(Report::default().to_text(), "");
        assert!(Report::parse("").is_empty());
    }
}
