//! Model interaction: turn a [`Prompt`] into text via a [`TextGenerator`].
//!
//! Prompt text lives in [`crate::prompts`] and output repair in
//! [`super::repair`]; this module only runs the call.
//!
//! ## Retry Strategy
//!
//! Transient provider failures (5xx, connection resets) are retried with
//! exponential backoff (`retry_backoff_ms * 2^attempt`, capped at
//! [`MAX_BACKOFF_MS`]). Rate-limit failures
//! are *not* retried: they are reported as [`DeckGenError::RateLimited`] at
//! once and the caller decides when to try again.

use crate::config::{CallSettings, GenerationConfig};
use crate::error::{DeckGenError, GenerationFailure};
use crate::prompts::{Prompt, Role};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Upper bound on a single retry delay.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Anything that can answer a role-tagged prompt with plain text.
///
/// [`LlmGenerator`] adapts an `edgequake-llm` provider; tests and callers with
/// custom middleware (caching, quotas) plug in their own implementation.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a Prompt,
        settings: CallSettings,
    ) -> BoxFuture<'a, Result<String, GenerationFailure>>;
}

/// [`TextGenerator`] backed by an `edgequake-llm` provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

impl TextGenerator for LlmGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a Prompt,
        settings: CallSettings,
    ) -> BoxFuture<'a, Result<String, GenerationFailure>> {
        Box::pin(async move {
            let start = Instant::now();
            let messages = to_chat_messages(prompt);
            let options = build_options(settings);
            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| GenerationFailure::classify(e.to_string()))?;
            debug!(
                "{:?} call: {} input tokens, {} output tokens, {:?}",
                prompt.kind,
                response.prompt_tokens,
                response.completion_tokens,
                start.elapsed()
            );
            Ok(response.content)
        })
    }
}

/// Run one model call with retry, returning non-empty text.
///
/// # Errors
/// - [`DeckGenError::RateLimited`] on the first rate-limit signal
/// - [`DeckGenError::NoContent`] when the model answers with blank text
/// - [`DeckGenError::Internal`] when every attempt failed
pub async fn complete(
    generator: &dyn TextGenerator,
    prompt: &Prompt,
    settings: CallSettings,
    config: &GenerationConfig,
) -> Result<String, DeckGenError> {
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "{:?} call: retry {}/{} after {}ms",
                prompt.kind, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match generator.generate(prompt, settings).await {
            Ok(text) if text.trim().is_empty() => return Err(DeckGenError::NoContent),
            Ok(text) => return Ok(text),
            Err(GenerationFailure::RateLimited(detail)) => {
                warn!("{:?} call: rate limited: {}", prompt.kind, detail);
                return Err(DeckGenError::RateLimited { detail });
            }
            Err(GenerationFailure::Failed(detail)) => {
                warn!(
                    "{:?} call: attempt {} failed: {}",
                    prompt.kind,
                    attempt + 1,
                    detail
                );
                last_err = Some(detail);
            }
        }
    }

    Err(DeckGenError::Internal(format!(
        "model call failed after {} retries: {}",
        config.max_retries,
        last_err.unwrap_or_else(|| "Unknown error".to_string())
    )))
}

/// Delay before retry number `attempt` (1-based).
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_BACKOFF_MS)
}

fn to_chat_messages(prompt: &Prompt) -> Vec<ChatMessage> {
    prompt
        .messages
        .iter()
        .map(|m| match m.role {
            Role::System => ChatMessage::system(m.text.clone()),
            Role::User => ChatMessage::user(m.text.clone()),
        })
        .collect()
}

/// Build `CompletionOptions` from per-call settings.
fn build_options(settings: CallSettings) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(settings.temperature),
        max_tokens: Some(settings.max_tokens),
        ..Default::default()
    }
}
