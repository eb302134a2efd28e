//! Mock AI Provider for testing and offline runs.
//!
//! Provides a configurable implementation of the AIProvider port so the
//! pipeline can run without calling a real model.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Rules keyed by a substring of the prompt, for concurrent batches where
//!   call order is not fixed
//! - A scripted fallback that derives a reply from the prompt
//! - Simulated delays and error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_rule(persona_id.to_string(), MockResponse::text("DECISION: MAYBE"))
//!     .with_default_response("DECISION: ADOPT\nCONFIDENCE: 0.8\nREASONING: Fits\nKEY_FACTORS: speed");
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Builds a reply from the prompt text.
pub type ScriptFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Mock AI provider.
#[derive(Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order when no rule matches).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Prompt-keyed responses.
    rules: Arc<Mutex<Vec<MockRule>>>,
    /// Reply used when neither a rule nor the queue applies.
    fallback: Option<ScriptFn>,
    default_content: String,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    /// Return an error.
    Error(MockError),
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContextTooLong { tokens: u32, max: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong { tokens, max } => AIError::context_too_long(tokens, max),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

#[derive(Debug, Clone)]
struct MockRule {
    pattern: String,
    response: MockResponse,
    /// `None` repeats forever.
    remaining: Option<usize>,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockAIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockAIProvider")
            .field("info", &self.info)
            .field("delay", &self.delay)
            .field("scripted", &self.fallback.is_some())
            .finish()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            fallback: None,
            default_content: "Mock response".to_string(),
            info: ProviderInfo::new("mock", "mock-model-1", 128000),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::text(content));
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Answers every prompt containing `pattern` with `response`.
    pub fn with_rule(self, pattern: impl Into<String>, response: MockResponse) -> Self {
        self.push_rule(pattern.into(), response, None)
    }

    /// Answers the next `times` prompts containing `pattern` with `response`.
    ///
    /// Rules match in insertion order.
    pub fn with_rule_times(
        self,
        pattern: impl Into<String>,
        response: MockResponse,
        times: usize,
    ) -> Self {
        self.push_rule(pattern.into(), response, Some(times))
    }

    /// Sets a reply derived from the prompt, used when nothing else matches.
    pub fn with_script(mut self, script: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.fallback = Some(Arc::new(script));
        self
    }

    /// Sets the reply used when nothing else matches.
    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.default_content = content.into();
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls whose prompt contained `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.last_user_message().is_some_and(|m| m.contains(pattern)))
            .count()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push_rule(self, pattern: String, response: MockResponse, remaining: Option<usize>) -> Self {
        self.rules.lock().unwrap().push(MockRule {
            pattern,
            response,
            remaining,
        });
        self
    }

    fn next_response(&self, prompt: &str) -> MockResponse {
        {
            let mut rules = self.rules.lock().unwrap();
            let matched = rules
                .iter_mut()
                .find(|rule| rule.remaining != Some(0) && prompt.contains(&rule.pattern));
            if let Some(rule) = matched {
                if let Some(remaining) = rule.remaining.as_mut() {
                    *remaining -= 1;
                }
                return rule.response.clone();
            }
        }

        if let Some(queued) = self.responses.lock().unwrap().pop_front() {
            return queued;
        }

        match &self.fallback {
            Some(script) => MockResponse::text(script(prompt)),
            None => MockResponse::text(self.default_content.clone()),
        }
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let prompt = request.last_user_message().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(&prompt) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
