//! Chat-model interaction: summarize one topic, define one term.
//!
//! This module converts a topic or a candidate term into a chat API call.
//! It is intentionally thin. All prompt wording lives in [`crate::prompts`]
//! so it can be changed without touching retry or error-handling logic here.
//!
//! ## Degradation Policy
//!
//! Neither operation ever returns an error. A call that fails after all
//! retries produces a [`CallOutcome`] whose text is a human-readable
//! placeholder (`An error occurred: ...` for summaries, `Definition not
//! found due to an error: ...` for terms) and whose `error` field carries
//! the structured cause. One bad call degrades one block of the report;
//! it never aborts the run.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 from chat APIs are transient and frequent under
//! concurrent load. Exponential backoff (doubling from `retry_backoff_ms`)
//! avoids thundering-herd: with 500 ms base and 3 retries the wait
//! sequence is 500 ms → 1 s → 2 s. Retries default to 0, in which case a
//! failing call degrades immediately.

use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::SummaryConfig;
use crate::error::CallError;
use crate::prompts::{
    definition_prompt, summary_prompt, DEFINITION_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT,
};
use crate::provider::{ChatCompletion, ChatMessage, ChatProvider, ChatRequest};

/// Result of one summary or definition call.
///
/// `text` always holds something renderable: the completion on success,
/// the placeholder string on failure. Callers check `error` to tell the
/// two apart.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub retries: u32,
    pub error: Option<CallError>,
}

/// Summarize one topic.
///
/// The completion text is kept exactly as returned, untrimmed; summaries
/// flow into the report verbatim.
pub async fn summarize_topic(
    provider: &Arc<dyn ChatProvider>,
    topic_num: usize,
    topic: &str,
    config: &SummaryConfig,
) -> CallOutcome {
    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(summary_prompt(topic)),
        ],
    };
    let label = format!("Topic {}", topic_num);

    match chat_with_retry(provider, &request, &label, config).await {
        Ok((completion, retries)) => CallOutcome {
            text: completion.content,
            input_tokens: completion.prompt_tokens,
            output_tokens: completion.completion_tokens,
            retries,
            error: None,
        },
        Err(detail) => CallOutcome {
            text: format!("An error occurred: {}", detail),
            input_tokens: 0,
            output_tokens: 0,
            retries: config.max_retries,
            error: Some(CallError::SummaryFailed {
                topic: topic_num,
                retries: config.max_retries,
                detail,
            }),
        },
    }
}

/// Define one technical term.
///
/// Unlike summaries, the definition text is trimmed; it is rendered inline
/// after the term on a single line.
pub async fn define_term(
    provider: &Arc<dyn ChatProvider>,
    term: &str,
    config: &SummaryConfig,
) -> CallOutcome {
    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(DEFINITION_SYSTEM_PROMPT),
            ChatMessage::user(definition_prompt(term)),
        ],
    };
    let label = format!("Term '{}'", term);

    match chat_with_retry(provider, &request, &label, config).await {
        Ok((completion, retries)) => CallOutcome {
            text: completion.content.trim().to_string(),
            input_tokens: completion.prompt_tokens,
            output_tokens: completion.completion_tokens,
            retries,
            error: None,
        },
        Err(detail) => CallOutcome {
            text: format!("Definition not found due to an error: {}", detail),
            input_tokens: 0,
            output_tokens: 0,
            retries: config.max_retries,
            error: Some(CallError::DefinitionFailed {
                term: term.to_string(),
                retries: config.max_retries,
                detail,
            }),
        },
    }
}

/// Drive one request through the provider with exponential backoff.
///
/// Returns the completion and the number of retries it took, or the last
/// error's message once `max_retries` is exhausted.
async fn chat_with_retry(
    provider: &Arc<dyn ChatProvider>,
    request: &ChatRequest,
    label: &str,
    config: &SummaryConfig,
) -> std::result::Result<(ChatCompletion, u32), String> {
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "{}: retry {}/{} after {}ms",
                label, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.chat(request).await {
            Ok(completion) => {
                debug!(
                    "{}: {} input tokens, {} output tokens",
                    label, completion.prompt_tokens, completion.completion_tokens
                );
                return Ok((completion, attempt));
            }
            Err(e) => {
                let err_msg = e.to_string();
                warn!("{}: attempt {} failed: {}", label, attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| "Unknown error".to_string()))
}
