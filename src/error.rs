//! Error types for the pdf-summarizer library.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`SummarizeError`] — **Fatal**: the run cannot proceed at all (bad input
//!   file, encrypted PDF, missing credentials, render/write failure).
//!   Returned as `Err(SummarizeError)` from the top-level `summarize*`
//!   functions.
//!
//! * [`CallError`] — **Non-fatal**: a single chat-completion call gave up.
//!   The call's output degrades to a placeholder string inside the report
//!   ("An error occurred: ..." / "Definition not found due to an error: ...")
//!   and the error is stored on [`crate::output::TopicResult`] so callers can
//!   inspect what went wrong without losing the rest of the document.
//!
//! * [`ApiError`] — what a [`crate::ChatProvider`] implementation returns.
//!   Its display string is the `{detail}` embedded in the placeholders above.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SummarizeError>;

/// All fatal errors returned by the pdf-summarizer library.
///
/// Per-call failures use [`CallError`] and are stored in
/// [`crate::output::TopicResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum SummarizeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}\nTry repairing with: qpdf input.pdf repaired.pdf")]
    InvalidPdf { detail: String },

    /// The document is encrypted; the native text layer is unreadable.
    #[error(
        "PDF is encrypted.\nDecrypt it first, e.g.: qpdf --decrypt input.pdf decrypted.pdf"
    )]
    EncryptedPdf,

    /// The text layer of a specific page could not be decoded.
    #[error("Text extraction failed on page {page}: {detail}")]
    ExtractionFailed { page: u32, detail: String },

    // ── Provider errors ───────────────────────────────────────────────────
    /// No chat provider could be resolved (missing API key etc.).
    #[error(
        "No chat API credentials configured.\n\n\
Either:\n\
  • Set the environment variable:  export GROQ_API_KEY=gsk_...\n\
  • Pass a key in code:            SummaryConfig::builder().api_key(\"gsk_...\")\n\
  • Inject a client:               SummaryConfig::builder().provider(client)\n"
    )]
    ApiKeyMissing,

    // ── Output errors ─────────────────────────────────────────────────────
    /// The report could not be rendered into a PDF document.
    #[error("Failed to render the summary PDF: {detail}")]
    RenderFailed { detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single chat-completion call.
///
/// Stored alongside [`crate::output::TopicResult`] when a call fails.
/// The run continues; the report carries the placeholder text instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum CallError {
    /// The summary call for a topic failed after all attempts.
    #[error("Topic {topic}: summary call failed after {retries} retries: {detail}")]
    SummaryFailed {
        topic: usize,
        retries: u32,
        detail: String,
    },

    /// The definition call for a candidate term failed after all attempts.
    #[error("Term '{term}': definition call failed after {retries} retries: {detail}")]
    DefinitionFailed {
        term: String,
        retries: u32,
        detail: String,
    },
}

/// Errors surfaced by a [`crate::ChatProvider`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API answered with a non-success status code.
    #[error("HTTP {status} from chat API: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a usable response (DNS, TLS, timeout, bad body).
    #[error("chat API request failed: {reason}")]
    Network { reason: String },

    /// A well-formed response with an empty `choices` array.
    #[error("chat API returned no choices")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_missing_names_every_option() {
        let msg = SummarizeError::ApiKeyMissing.to_string();
        assert!(msg.contains("GROQ_API_KEY"), "got: {msg}");
        assert!(msg.contains("api_key"));
        assert!(msg.contains("provider"));
    }

    #[test]
    fn not_a_pdf_shows_magic_bytes() {
        let e = SummarizeError::NotAPdf {
            path: PathBuf::from("/tmp/archive.zip"),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("archive.zip"));
        assert!(msg.contains("80"), "magic bytes should be listed, got: {msg}");
    }

    #[test]
    fn extraction_failed_names_the_page() {
        let e = SummarizeError::ExtractionFailed {
            page: 7,
            detail: "unsupported encoding".into(),
        };
        assert!(e.to_string().contains("page 7"));
    }

    #[test]
    fn summary_call_error_display() {
        let e = CallError::SummaryFailed {
            topic: 3,
            retries: 0,
            detail: "HTTP 500 from chat API: boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Topic 3"), "got: {msg}");
        assert!(msg.contains("boom"));
    }

    #[test]
    fn definition_call_error_display() {
        let e = CallError::DefinitionFailed {
            term: "GPU".into(),
            retries: 2,
            detail: "chat API returned no choices".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'GPU'"));
        assert!(msg.contains("2 retries"));
    }

    #[test]
    fn api_error_display_is_placeholder_friendly() {
        let e = ApiError::Http {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(e.to_string(), "HTTP 429 from chat API: rate limited");
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = SummarizeError::OutputWriteFailed {
            path: PathBuf::from("/tmp/summary_output.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.source().is_some());
    }
}
