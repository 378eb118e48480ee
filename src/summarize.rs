//! Full-document summarization entry points.
//!
//! ## Shape of a run
//!
//! One call to [`summarize_bytes`] drives the whole pipeline: extract text,
//! split it into topics, summarize each topic and define its candidate
//! terms, then assemble the typed [`Report`]. Topics are processed in
//! order; within a topic the term definitions fan out concurrently (bounded
//! by `config.concurrency`) and are re-sorted into first-appearance order,
//! so output is deterministic regardless of completion order.
//!
//! Failed chat calls never fail the run. They degrade to placeholder text
//! in the report and are recorded in `output.stats.degraded_calls`; only
//! input problems (unreadable file, invalid PDF) and rendering problems
//! are fatal.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::config::SummaryConfig;
use crate::error::{Result, SummarizeError};
use crate::output::{SummaryOutput, SummaryStats, TermEntry, TopicResult};
use crate::pipeline::{extract, llm, render, segment};
use crate::provider::{ChatProvider, GroqClient};
use crate::report::Report;

/// Summarize a PDF given its raw bytes.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(SummaryOutput)` on success, even if some chat calls failed
/// (check `output.stats.degraded_calls`).
///
/// # Errors
/// Returns `Err(SummarizeError)` only for fatal errors:
/// - No API credential and no injected provider
/// - Bytes that are not a valid PDF, or an encrypted PDF
/// - A page whose text layer cannot be read
///
/// # Example
/// ```rust,no_run
/// use pdf_summarizer::{summarize_bytes, SummaryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("paper.pdf")?;
/// let config = SummaryConfig::default();
/// let output = summarize_bytes(&bytes, &config).await?;
/// println!("{}", output.report_text());
/// # Ok(())
/// # }
/// ```
pub async fn summarize_bytes(bytes: &[u8], config: &SummaryConfig) -> Result<SummaryOutput> {
    let total_start = Instant::now();
    info!("Starting summarization: {} byte PDF", bytes.len());

    // ── Step 1: Resolve provider ─────────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 2: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let extracted = extract::extract_text(bytes.to_vec()).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} chars from {} pages in {}ms",
        extracted.text.len(),
        extracted.page_count,
        extract_duration_ms
    );

    // ── Step 3: Segment into topics ──────────────────────────────────────
    let topics = segment::split_topics(&extracted.text);
    debug!("Segmented into {} topics", topics.len());

    // Fire on_run_start once the topic count is known.
    if let Some(ref hook) = config.progress {
        hook.on_run_start(topics.len());
    }

    // ── Step 4: Summarize topics, define terms ───────────────────────────
    let llm_start = Instant::now();
    let mut results = Vec::with_capacity(topics.len());
    for (idx, topic) in topics.iter().enumerate() {
        let topic_num = idx + 1;
        if let Some(ref hook) = config.progress {
            hook.on_topic_start(topic_num, topics.len());
        }

        let result = process_topic(&provider, topic_num, topic, config).await;

        if let Some(ref hook) = config.progress {
            for err in &result.errors {
                hook.on_call_degraded(topic_num, err.to_string());
            }
            hook.on_topic_complete(topic_num, topics.len(), result.terms.len());
        }
        results.push(result);
    }
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 5: Assemble the report ──────────────────────────────────────
    let report = Report::from_topics(&results);

    // ── Step 6: Compute stats ────────────────────────────────────────────
    let clean = results.iter().filter(|t| t.is_clean()).count();
    let stats = SummaryStats {
        total_topics: results.len(),
        clean_topics: clean,
        degraded_calls: results.iter().map(|t| t.errors.len()).sum(),
        defined_terms: results.iter().map(|t| t.terms.len()).sum(),
        source_pages: extracted.page_count,
        total_input_tokens: results.iter().map(|t| t.input_tokens as u64).sum(),
        total_output_tokens: results.iter().map(|t| t.output_tokens as u64).sum(),
        extract_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Summarization complete: {}/{} topics clean, {} terms defined, {}ms total",
        clean, stats.total_topics, stats.defined_terms, stats.total_duration_ms
    );

    if let Some(ref hook) = config.progress {
        hook.on_run_complete(stats.total_topics, clean);
    }

    Ok(SummaryOutput {
        report,
        topics: results,
        stats,
    })
}

/// Summarize a PDF file on disk.
///
/// Checks existence and the `%PDF` magic before reading the whole file
/// into memory, so obvious mistakes fail with a specific error instead of
/// a parser complaint.
pub async fn summarize_file(
    path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryOutput> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SummarizeError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => SummarizeError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => SummarizeError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => SummarizeError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    check_pdf_magic(&bytes, path)?;
    summarize_bytes(&bytes, config).await
}

/// Summarize a PDF file and write the rendered summary PDF to disk.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn summarize_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryStats> {
    let output = summarize_file(input_path, config).await?;
    let pdf = render::render_pdf(&output.report)?;
    let path = output_path.as_ref();

    // Atomic write: write to temp, then rename
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SummarizeError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &pdf)
        .await
        .map_err(|e| SummarizeError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| SummarizeError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote {} bytes to '{}'", pdf.len(), path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`summarize_bytes`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(bytes: &[u8], config: &SummaryConfig) -> Result<SummaryOutput> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummarizeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize_bytes(bytes, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Summarize one topic and define its candidate terms.
///
/// The summary call runs first; definitions then fan out with bounded
/// concurrency and are re-sorted into first-appearance order.
async fn process_topic(
    provider: &Arc<dyn ChatProvider>,
    topic_num: usize,
    topic: &str,
    config: &SummaryConfig,
) -> TopicResult {
    let start = Instant::now();
    let mut errors = Vec::new();

    let summary = llm::summarize_topic(provider, topic_num, topic, config).await;
    let mut input_tokens = summary.input_tokens;
    let mut output_tokens = summary.output_tokens;
    if let Some(err) = summary.error {
        errors.push(err);
    }

    let candidates = segment::technical_terms(topic);
    debug!("Topic {}: {} candidate terms", topic_num, candidates.len());

    let mut defined: Vec<(usize, String, llm::CallOutcome)> =
        stream::iter(candidates.into_iter().enumerate().map(|(order, term)| {
            let provider = Arc::clone(provider);
            let config = config.clone();
            async move {
                let outcome = llm::define_term(&provider, &term, &config).await;
                (order, term, outcome)
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;
    defined.sort_by_key(|(order, _, _)| *order);

    let mut terms = Vec::with_capacity(defined.len());
    for (_, term, outcome) in defined {
        input_tokens += outcome.input_tokens;
        output_tokens += outcome.output_tokens;
        if let Some(err) = outcome.error {
            errors.push(err);
        }
        terms.push(TermEntry {
            term,
            definition: outcome.text,
        });
    }

    TopicResult {
        topic_num,
        summary: summary.text,
        terms,
        input_tokens,
        output_tokens,
        duration_ms: start.elapsed().as_millis() as u64,
        errors,
    }
}

/// Resolve the chat provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    the client entirely; we use it as-is. This is the seam tests and
///    embedders use to supply mocks or clients with custom middleware.
/// 2. **Configured key** (`config.api_key`) — an explicit credential.
/// 3. **`GROQ_API_KEY`** — credential from the environment, the common
///    path for the CLI and server.
///
/// With no credential anywhere, fails with [`SummarizeError::ApiKeyMissing`]
/// before any PDF work happens.
fn resolve_provider(config: &SummaryConfig) -> Result<Arc<dyn ChatProvider>> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let key = match config.api_key.clone() {
        Some(key) if !key.is_empty() => key,
        _ => match std::env::var("GROQ_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => return Err(SummarizeError::ApiKeyMissing),
        },
    };

    let client = GroqClient::with_base_url(key, &config.api_base)
        .timeout(Duration::from_secs(config.api_timeout_secs));
    Ok(Arc::new(client))
}

/// Front-door check before parsing: a PDF starts with `%PDF`.
fn check_pdf_magic(bytes: &[u8], path: &Path) -> Result<()> {
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    if &magic != b"%PDF" {
        return Err(SummarizeError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::provider::{ChatCompletion, ChatRequest};
    use async_trait::async_trait;

    struct DummyProvider;

    #[async_trait]
    impl ChatProvider for DummyProvider {
        async fn chat(
            &self,
            _request: &ChatRequest,
        ) -> std::result::Result<ChatCompletion, ApiError> {
            Ok(ChatCompletion::default())
        }

        fn name(&self) -> &str {
            "dummy"
        }
    }

    #[test]
    fn resolve_prefers_injected_provider() {
        let config = SummaryConfig::builder()
            .provider(Arc::new(DummyProvider))
            .build()
            .unwrap();
        let provider = resolve_provider(&config).unwrap();
        assert_eq!(provider.name(), "dummy");
    }

    #[test]
    fn magic_check_accepts_pdf_headers() {
        assert!(check_pdf_magic(b"%PDF-1.7\n...", Path::new("a.pdf")).is_ok());
    }

    #[test]
    fn magic_check_rejects_other_files() {
        let err = check_pdf_magic(b"PK\x03\x04zipzip", Path::new("a.pdf")).unwrap_err();
        assert!(matches!(err, SummarizeError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }

    #[test]
    fn magic_check_handles_short_input() {
        let err = check_pdf_magic(b"%P", Path::new("a.pdf")).unwrap_err();
        assert!(matches!(err, SummarizeError::NotAPdf { .. }));
    }
}
