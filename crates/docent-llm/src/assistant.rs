//! Answer assembly: prompt construction, caching, rate limiting, usage accounting.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::error::LlmError;
use crate::provider::{ChatProvider, Message, Role};
use crate::rate::RateGate;

const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant specializing in technical documentation and programming.";

const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Snapshot of one completed chat call, for usage accounting.
#[derive(Clone, Copy, Debug)]
pub struct UsageEvent<'a> {
    pub model: &'a str,
    pub query: &'a str,
    pub context_length: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub response_length: usize,
}

/// Sink for per-call usage events. Implementations must absorb their own
/// failures; recording never interrupts the request path.
pub trait UsageRecorder: Send + Sync {
    fn record(&self, event: &UsageEvent<'_>);
}

/// Answers documentation questions through a chat provider, with optional
/// response caching and usage recording.
pub struct Assistant<P: ChatProvider> {
    provider: P,
    model: String,
    cache: Option<ResponseCache>,
    gate: RateGate,
    recorder: Option<Arc<dyn UsageRecorder>>,
}

impl<P: ChatProvider> fmt::Debug for Assistant<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("cache", &self.cache.is_some())
            .field("recorder", &self.recorder.is_some())
            .finish_non_exhaustive()
    }
}

impl<P: ChatProvider> Assistant<P> {
    #[must_use]
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            cache: None,
            gate: RateGate::new(DEFAULT_MIN_INTERVAL),
            recorder: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_rate_gate(mut self, gate: RateGate) -> Self {
        self.gate = gate;
        self
    }

    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn UsageRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Answers `query`, optionally grounded in user-selected `context` text.
    ///
    /// Consults the cache first; on a miss, waits out the rate gate, calls
    /// the provider, records usage, and caches the answer.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the chat call fails.
    pub async fn ask(&self, query: &str, context: Option<&str>) -> Result<String, LlmError> {
        let query = query.trim();
        let context = context.map(str::trim).filter(|c| !c.is_empty());
        let context_key = context.unwrap_or("");

        if let Some(cache) = &self.cache
            && let Some(answer) = cache.get(query, context_key)
        {
            tracing::info!(query_len = query.len(), "response cache hit");
            return Ok(answer);
        }

        self.gate.wait().await;

        tracing::info!(
            provider = self.provider.name(),
            query_len = query.len(),
            has_context = context.is_some(),
            "requesting completion"
        );

        let messages = build_messages(query, context);
        let outcome = self.provider.chat(&messages).await?;

        if let Some(recorder) = &self.recorder {
            recorder.record(&UsageEvent {
                model: &self.model,
                query,
                context_length: context.map_or(0, str::len),
                input_tokens: outcome.prompt_tokens,
                output_tokens: outcome.completion_tokens,
                response_length: outcome.content.len(),
            });
        }

        if let Some(cache) = &self.cache {
            cache.insert(query, context_key, outcome.content.clone());
        }

        Ok(outcome.content)
    }
}

fn build_messages(query: &str, context: Option<&str>) -> Vec<Message> {
    let prompt = match context {
        Some(context) => format!(
            "You are a helpful AI assistant for a technical documentation book. \
             The user has selected this text: \"{context}\"\n\n\
             Based on this context, please answer their question: \"{query}\"\n\n\
             Provide a clear, helpful response that relates to the selected content. \
             If the question isn't directly related to the context, use your general \
             knowledge but reference that you don't see direct connection to the \
             selected text."
        ),
        None => format!(
            "You are a helpful AI assistant for a technical documentation book. \
             Please answer this question: \"{query}\"\n\n\
             Provide a clear, helpful response. Since no specific text was selected, \
             draw from your general knowledge while keeping the response relevant to \
             technical documentation."
        ),
    };

    vec![
        Message::new(Role::System, SYSTEM_PROMPT),
        Message::new(Role::User, prompt),
    ]
}
