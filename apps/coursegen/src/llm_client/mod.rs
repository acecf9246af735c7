/// LLM Client: the single point of entry for all model calls in coursegen.
///
/// ARCHITECTURAL RULE: syllabus extraction, content generation and evaluation
/// all dispatch through one `LlmClient` so they draw from one token budget.
///
/// Dispatch order: credential check → token gate (one bounded back-off) → backend.
/// Every failure comes back as a `CallResult` variant, never as an `Err`.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;

pub mod backend;
pub mod gate;
pub mod prompts;
pub mod recovery;

pub use backend::{BackendError, Completion, GeminiBackend, GenerationConfig, LlmBackend, MODEL};
pub use gate::TokenGate;
pub use recovery::{extract_structured, StructuredPayload};

/// Returned to text callers when no API key is configured.
pub const DEMO_PLACEHOLDER: &str = "This is a placeholder for generated content. \
    Configure Gemini API key to enable real generation.";

/// `ServiceError` message for a response that carried no text.
pub const EMPTY_RESPONSE: &str = "No text in response";

/// Wait before the single Gate retry.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(60);

/// Temperature used when the call site does not pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Rough sub-word overhead: 1.3 tokens per whitespace-separated word.
pub fn estimate_cost(prompt: &str, max_output_tokens: u32) -> u64 {
    let words = prompt.split_whitespace().count() as u64;
    words * 13 / 10 + u64::from(max_output_tokens)
}

/// One prospective model call. Built per dispatch and dropped afterwards.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub prompt: String,
    pub estimated_cost: u64,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl CallRequest {
    pub fn new(prompt: impl Into<String>, max_output_tokens: u32, temperature: f32) -> Self {
        let prompt = prompt.into();
        let estimated_cost = estimate_cost(&prompt, max_output_tokens);
        Self {
            prompt,
            estimated_cost,
            max_output_tokens,
            temperature,
        }
    }
}

/// Outcome of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Success(String),
    RateLimited,
    ServiceError(String),
    /// No credential configured. Carries the demo-mode placeholder text.
    ConfigurationMissing(String),
}

impl CallResult {
    pub fn kind(&self) -> &'static str {
        match self {
            CallResult::Success(_) => "success",
            CallResult::RateLimited => "rate_limited",
            CallResult::ServiceError(_) => "service_error",
            CallResult::ConfigurationMissing(_) => "configuration_missing",
        }
    }
}

#[derive(Debug, Default)]
struct DispatchMetrics {
    success: AtomicU64,
    rate_limited: AtomicU64,
    service_error: AtomicU64,
    configuration_missing: AtomicU64,
}

impl DispatchMetrics {
    fn record(&self, result: &CallResult) {
        let counter = match result {
            CallResult::Success(_) => &self.success,
            CallResult::RateLimited => &self.rate_limited,
            CallResult::ServiceError(_) => &self.service_error,
            CallResult::ConfigurationMissing(_) => &self.configuration_missing,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DispatchCounts {
        DispatchCounts {
            success: self.success.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            service_error: self.service_error.load(Ordering::Relaxed),
            configuration_missing: self.configuration_missing.load(Ordering::Relaxed),
        }
    }
}

/// Dispatch totals per outcome kind since the client was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchCounts {
    pub success: u64,
    pub rate_limited: u64,
    pub service_error: u64,
    pub configuration_missing: u64,
}

/// The single LLM client used by every call site.
/// Clones share the backend, the token gate and the dispatch counters.
#[derive(Clone)]
pub struct LlmClient {
    backend: Option<Arc<dyn LlmBackend>>,
    gate: TokenGate,
    backoff: Duration,
    metrics: Arc<DispatchMetrics>,
}

impl LlmClient {
    /// `backend: None` puts the client in demo mode.
    pub fn new(backend: Option<Arc<dyn LlmBackend>>, gate: TokenGate, backoff: Duration) -> Self {
        Self {
            backend,
            gate,
            backoff,
            metrics: Arc::new(DispatchMetrics::default()),
        }
    }

    /// Builds a Gemini-backed client, or a demo-mode client when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let backend: Option<Arc<dyn LlmBackend>> = match &config.api_key {
            Some(key) => {
                let key = SecretString::from(key.expose_secret().to_owned());
                Some(Arc::new(GeminiBackend::new(key, config.llm_timeout)?))
            }
            None => None,
        };
        Ok(Self::new(
            backend,
            TokenGate::new(config.tokens_per_minute),
            config.rate_limit_backoff,
        ))
    }

    pub fn is_demo_mode(&self) -> bool {
        self.backend.is_none()
    }

    pub fn gate(&self) -> &TokenGate {
        &self.gate
    }

    pub fn counts(&self) -> DispatchCounts {
        self.metrics.snapshot()
    }

    /// Dispatches at the default temperature.
    pub async fn dispatch(&self, prompt: &str, max_output_tokens: u32) -> CallResult {
        self.dispatch_with(prompt, max_output_tokens, DEFAULT_TEMPERATURE)
            .await
    }

    pub async fn dispatch_with(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> CallResult {
        let request = CallRequest::new(prompt, max_output_tokens, temperature);
        let prompt_len = request.prompt.chars().count();
        info!("Calling Gemini API with prompt length: {prompt_len}");

        let result = self.run(&request).await;

        self.metrics.record(&result);
        info!(
            prompt_len,
            estimated_cost = request.estimated_cost,
            outcome = result.kind(),
            "LLM dispatch finished"
        );
        result
    }

    async fn run(&self, request: &CallRequest) -> CallResult {
        let Some(backend) = &self.backend else {
            warn!("Gemini API key not configured. Returning placeholder.");
            return CallResult::ConfigurationMissing(DEMO_PLACEHOLDER.to_string());
        };

        if !self.admit(request.estimated_cost).await {
            return CallResult::RateLimited;
        }

        let config = GenerationConfig {
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
        };

        match backend.generate(&request.prompt, &config).await {
            Ok(Completion { text: Some(text) }) if !text.is_empty() => CallResult::Success(text),
            Ok(_) => {
                warn!("Gemini API returned a response without text");
                CallResult::ServiceError(EMPTY_RESPONSE.to_string())
            }
            Err(e) => {
                error!("Gemini API call failed: {e}");
                CallResult::ServiceError(format!("Error calling Gemini API: {e}"))
            }
        }
    }

    /// Consults the gate, waiting out one back-off before a single retry.
    async fn admit(&self, cost: u64) -> bool {
        if self.gate.try_consume(cost) {
            return true;
        }

        warn!(
            "Rate limit exceeded. Waiting {} seconds before proceeding...",
            self.backoff.as_secs()
        );
        tokio::time::sleep(self.backoff).await;

        if self.gate.try_consume(cost) {
            return true;
        }

        error!("Rate limit still exceeded after waiting. Consider reducing request frequency.");
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// What the scripted backend answers with.
    #[derive(Debug, Clone)]
    pub enum Reply {
        Text(String),
        NoText,
        ApiError(u16, String),
    }

    /// In-memory backend that records every prompt it receives.
    pub struct ScriptedBackend {
        replies: Mutex<Vec<Reply>>,
        fallback: Reply,
        calls: Mutex<Vec<(String, GenerationConfig)>>,
    }

    impl ScriptedBackend {
        /// Always answers with `reply`.
        pub fn always(reply: Reply) -> Arc<Self> {
            Self::sequence(vec![], reply)
        }

        /// Answers with `replies` in order, then with `fallback`.
        pub fn sequence(mut replies: Vec<Reply>, fallback: Reply) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                fallback,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> Vec<(String, GenerationConfig)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<Completion, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), *config));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| self.fallback.clone());
            match reply {
                Reply::Text(text) => Ok(Completion { text: Some(text) }),
                Reply::NoText => Ok(Completion { text: None }),
                Reply::ApiError(status, message) => Err(BackendError::Api { status, message }),
            }
        }
    }

    pub fn client_with(backend: Arc<ScriptedBackend>) -> LlmClient {
        LlmClient::new(Some(backend), TokenGate::default(), DEFAULT_BACKOFF)
    }

    pub fn demo_client() -> LlmClient {
        LlmClient::new(None, TokenGate::default(), DEFAULT_BACKOFF)
    }
}
