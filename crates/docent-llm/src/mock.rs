//! Test-only mock chat provider.

use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{ChatOutcome, ChatProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub fail_chat: bool,
    calls: Arc<Mutex<usize>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            prompt_tokens: 10,
            completion_tokens: 5,
            fail_chat: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_usage(mut self, prompt_tokens: usize, completion_tokens: usize) -> Self {
        self.prompt_tokens = prompt_tokens;
        self.completion_tokens = completion_tokens;
        self
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ChatProvider for MockProvider {
    async fn chat(&self, _messages: &[Message]) -> Result<ChatOutcome, LlmError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail_chat {
            return Err(LlmError::Other("mock chat error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        let content = if responses.is_empty() {
            self.default_response.clone()
        } else {
            responses.remove(0)
        };
        Ok(ChatOutcome {
            content,
            prompt_tokens: self.prompt_tokens,
            completion_tokens: self.completion_tokens,
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}
