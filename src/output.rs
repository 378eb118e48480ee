//! Result types produced by a summarization run.
//!
//! [`SummaryOutput`] is what the `summarize*` functions return: the typed
//! [`Report`], the per-topic results (including any degraded calls), and
//! aggregate [`SummaryStats`]. Everything here is serde-serializable so the
//! CLI can dump a run as JSON.

use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::report::Report;

/// One defined technical term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    /// The all-caps candidate as it appeared in the topic.
    pub term: String,
    /// Trimmed definition text, or the degradation placeholder
    /// (`Definition not found due to an error: ...`).
    pub definition: String,
}

/// Outcome of processing one topic: its summary plus term definitions.
///
/// Always present for every topic, even when calls failed; failures degrade
/// to placeholder text and leave a [`CallError`] in `errors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResult {
    /// 1-indexed topic number, in document order.
    pub topic_num: usize,
    /// Completion content exactly as returned (no trimming), or the
    /// degradation placeholder (`An error occurred: ...`).
    pub summary: String,
    /// Defined candidate terms in first-appearance order.
    pub terms: Vec<TermEntry>,
    /// Prompt tokens across this topic's calls (0 when the API omits usage).
    pub input_tokens: u32,
    /// Completion tokens across this topic's calls.
    pub output_tokens: u32,
    /// Wall-clock time spent on this topic's calls.
    pub duration_ms: u64,
    /// One entry per call that exhausted its attempts. Empty = clean topic.
    pub errors: Vec<CallError>,
}

impl TopicResult {
    /// True when every chat call for this topic succeeded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Aggregate statistics for a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Topics the segmenter produced (summaries in the report).
    pub total_topics: usize,
    /// Topics with no degraded calls.
    pub clean_topics: usize,
    /// Chat calls that fell back to placeholder text.
    pub degraded_calls: usize,
    /// Term definitions in the report (degraded ones included).
    pub defined_terms: usize,
    /// Pages in the source PDF.
    pub source_pages: usize,
    /// Prompt tokens across all calls.
    pub total_input_tokens: u64,
    /// Completion tokens across all calls.
    pub total_output_tokens: u64,
    /// Time spent parsing the PDF and extracting text.
    pub extract_duration_ms: u64,
    /// Time spent in chat calls (includes retries and backoff).
    pub llm_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// Everything a summarization run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// Typed report blocks, ready for [`crate::render_pdf`].
    pub report: Report,
    /// Per-topic results in document order.
    pub topics: Vec<TopicResult>,
    /// Aggregates over `topics`.
    pub stats: SummaryStats,
}

impl SummaryOutput {
    /// The legacy flat report text (`Summary:` / `Technical Terms and
    /// Definitions:` markers). Equivalent to `self.report.to_text()`.
    pub fn report_text(&self) -> String {
        self.report.to_text()
    }

    /// True when at least one call degraded to placeholder text.
    pub fn has_degraded_calls(&self) -> bool {
        self.stats.degraded_calls > 0
    }
}
