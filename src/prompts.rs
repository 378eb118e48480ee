//! Prompts for topic summarization and technical-term definition.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the report format downstream depends on
//!    the model being asked for exactly these things; changing the wording
//!    happens in exactly one place.
//!
//! 2. **Testability** — unit tests can assert the exact messages a call will
//!    send without spinning up a real chat API.
//!
//! The user prompts embed the topic/term verbatim; no escaping or truncation
//! is applied before the text reaches the model.

/// System prompt for the per-topic summary call.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert summarizer and technical writer \
who provides concise and clear summaries of topics, and defines any technical terms with \
relevance to the context.";

/// System prompt for the per-term definition call.
pub const DEFINITION_SYSTEM_PROMPT: &str = "You are an expert in AI and machine learning. \
Provide clear and contextually relevant definitions for technical terms.";

/// Build the user message for summarizing one topic.
pub fn summary_prompt(topic: &str) -> String {
    format!(
        "Summarize the following text and define any technical terms used. \
Provide clear and contextually relevant definitions for the terms, especially those \
related to AI and machine learning:\n\n{}",
        topic
    )
}

/// Build the user message for defining one technical term.
pub fn definition_prompt(term: &str) -> String {
    format!(
        "Define the technical term '{}' in the context of AI and machine learning.",
        term
    )
}
