//! # pdf-summarizer
//!
//! Summarize PDF documents with an LLM, defining the technical terms they
//! use, and render the result as a new, styled PDF.
//!
//! ## Why this crate?
//!
//! Skimming a dense technical document means constantly stopping at
//! acronyms and jargon. This crate splits the document into topics, asks a
//! chat model for a summary of each, asks it again for a definition of
//! every ALL-CAPS term the topic mentions, and lays the whole thing out as
//! a downloadable PDF: one summary section per topic, with definitions
//! inline beneath it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   per-page text layer via lopdf (CPU-bound, spawn_blocking)
//!  ├─ 2. Segment   blank-line topics + ALL-CAPS term candidates
//!  ├─ 3. Summarize one chat call per topic (Groq, llama-3.1-70b-versatile)
//!  ├─ 4. Define    bounded-concurrent chat calls, one per candidate term
//!  └─ 5. Render    styled summary PDF + per-topic stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_summarizer::{summarize_bytes, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from GROQ_API_KEY
//!     let bytes = std::fs::read("paper.pdf")?;
//!     let config = SummaryConfig::default();
//!     let output = summarize_bytes(&bytes, &config).await?;
//!     println!("{}", output.report_text());
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.total_input_tokens,
//!         output.stats.total_output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Serving the upload UI
//!
//! The [`server`] module exposes the single-page upload form and the
//! `/summarize` endpoint:
//!
//! ```rust,no_run
//! use pdf_summarizer::{server, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let state = server::AppState::new(SummaryConfig::default());
//!     server::serve("127.0.0.1:8080", state).await
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsum` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf-summarizer = { version = "0.2", default-features = false }
//! ```
//!
//! ## Choosing a Model
//!
//! Any chat model reachable through an OpenAI-compatible endpoint works;
//! the defaults target Groq:
//!
//! | Model | Best for |
//! |-------|----------|
//! | `llama-3.1-70b-versatile` | Default — strong summaries and definitions |
//! | `llama-3.1-8b-instant`    | Faster and cheaper, terser definitions |
//! | `mixtral-8x7b-32768`      | Very long topics (32k context) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod report;
pub mod server;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder, DEFAULT_MODEL};
pub use error::{ApiError, CallError, SummarizeError};
pub use output::{SummaryOutput, SummaryStats, TermEntry, TopicResult};
pub use pipeline::render::render_pdf;
pub use progress::{NoopProgress, ProgressHook, SummaryProgress};
pub use provider::{ChatCompletion, ChatMessage, ChatProvider, ChatRequest, GroqClient};
pub use report::{Report, ReportBlock};
pub use summarize::{summarize_bytes, summarize_file, summarize_sync, summarize_to_file};
