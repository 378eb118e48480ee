//! Pipeline stages for PDF summarization.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch PDF backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ segment ──▶ llm ──▶ render
//! (lopdf)    (topics/terms) (chat API) (lopdf)
//! ```
//!
//! 1. [`extract`] — pull plain text out of the source PDF; runs in
//!    `spawn_blocking` because parsing large documents is CPU-bound
//! 2. [`segment`] — split the text into topics and pick candidate technical
//!    terms; pure string work, no I/O
//! 3. [`llm`]     — drive the summary and definition calls with
//!    retry/backoff; the only stage with network I/O
//! 4. [`render`]  — lay the finished [`Report`](crate::report::Report) out
//!    as a new PDF

pub mod extract;
pub mod llm;
pub mod render;
pub mod segment;
