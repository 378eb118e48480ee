//! Progress-observer trait for per-topic pipeline events.
//!
//! Inject an [`Arc<dyn SummaryProgress>`] via
//! [`crate::config::SummaryConfigBuilder::progress`] to receive real-time
//! events as the pipeline works through the document's topics.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it keeps working if topic
//! processing is ever spawned onto other tasks.
//!
//! # Example
//!
//! ```rust
//! use pdf_summarizer::{SummaryProgress, SummaryConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingProgress {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl SummaryProgress for CountingProgress {
//!     fn on_topic_complete(&self, topic_num: usize, total_topics: usize, term_count: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Topic {}/{} done ({} terms)", topic_num, total_topics, term_count);
//!     }
//! }
//!
//! let counter = Arc::new(CountingProgress {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = SummaryConfig::builder()
//!     .progress(counter as Arc<dyn SummaryProgress>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it works through the document's topics.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The summary/definition calls for one topic may run
/// concurrently, so implementations must protect shared mutable state
/// (e.g. `Mutex`, `AtomicUsize`).
pub trait SummaryProgress: Send + Sync {
    /// Called once after segmentation, before any chat call.
    ///
    /// # Arguments
    /// * `total_topics` — number of topics that will be processed
    fn on_run_start(&self, total_topics: usize) {
        let _ = total_topics;
    }

    /// Called just before a topic's summary call is sent.
    ///
    /// # Arguments
    /// * `topic_num`    — 1-indexed topic number
    /// * `total_topics` — total topics in the document
    fn on_topic_start(&self, topic_num: usize, total_topics: usize) {
        let _ = (topic_num, total_topics);
    }

    /// Called when a chat call for a topic gave up and its output degraded
    /// to placeholder text.
    ///
    /// # Arguments
    /// * `topic_num` — 1-indexed topic number
    /// * `detail`    — human-readable error description
    fn on_call_degraded(&self, topic_num: usize, detail: String) {
        let _ = (topic_num, detail);
    }

    /// Called when a topic's summary and all its definitions are in.
    ///
    /// # Arguments
    /// * `topic_num`    — 1-indexed topic number
    /// * `total_topics` — total topics
    /// * `term_count`   — number of technical terms defined for this topic
    fn on_topic_complete(&self, topic_num: usize, total_topics: usize, term_count: usize) {
        let _ = (topic_num, total_topics, term_count);
    }

    /// Called once after every topic has been attempted.
    ///
    /// # Arguments
    /// * `total_topics` — total topics in the document
    /// * `clean_topics` — topics whose calls all succeeded
    fn on_run_complete(&self, total_topics: usize, clean_topics: usize) {
        let _ = (total_topics, clean_topics);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no observer is configured.
pub struct NoopProgress;

impl SummaryProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressHook = Arc<dyn SummaryProgress>;
