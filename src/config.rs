//! Configuration types for PDF summarization.
//!
//! All run behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across handlers and threads, and to diff two runs
//! to understand why their reports differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest; `build()` validates the result.

use std::fmt;
use std::sync::Arc;

use crate::error::SummarizeError;
use crate::progress::ProgressHook;
use crate::provider::{ChatProvider, DEFAULT_API_BASE};

/// Default chat model identifier (hosted by Groq under this id).
pub const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";

/// Configuration for a summarization run.
///
/// Built via [`SummaryConfig::builder()`] or using
/// [`SummaryConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_summarizer::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .model("llama-3.1-70b-versatile")
///     .concurrency(4)
///     .max_retries(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Chat model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// OpenAI-compatible endpoint base URL. Default: Groq's
    /// `https://api.groq.com/openai/v1`.
    pub api_base: String,

    /// Explicit API key. If `None`, the `GROQ_API_KEY` environment variable
    /// is consulted when the provider is resolved.
    pub api_key: Option<String>,

    /// Pre-constructed chat provider. Takes precedence over `api_key` and the
    /// environment; this is the seam tests use to inject scripted providers.
    pub provider: Option<Arc<dyn ChatProvider>>,

    /// Number of concurrent definition calls per topic. Default: 4.
    ///
    /// Definitions within one topic are independent, so they are fanned out
    /// with bounded parallelism and re-ordered afterwards. Summaries stay
    /// sequential: the report reads in document order either way, and the
    /// summary calls are the large ones. Lower this if the API rate-limits
    /// you; raise it for documents dense with all-caps terminology.
    pub concurrency: usize,

    /// Maximum retry attempts on a failed chat call. Default: 0.
    ///
    /// With 0 every call is made exactly once and a failure degrades straight
    /// to its placeholder text in the report. Raise it for flaky networks;
    /// retries back off exponentially starting at `retry_backoff_ms`.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles per attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-chat-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Progress observer for UIs and CLIs. Default: `None` (no reporting).
    pub progress: Option<ProgressHook>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            provider: None,
            concurrency: 4,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            progress: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider.as_ref().map(|_| "<dyn ChatProvider>"))
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn SummaryProgress>"))
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, hook: ProgressHook) -> Self {
        self.config.progress = Some(hook);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SummarizeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(SummarizeError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if c.api_base.trim().is_empty() {
            return Err(SummarizeError::InvalidConfig(
                "API base URL must not be empty".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(SummarizeError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
