use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Cloning is cheap: the client clone shares its token gate and counters.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Language the generated material is written in.
    pub content_language: String,
}

impl AppState {
    pub fn new(llm: LlmClient, config: &Config) -> Self {
        Self {
            llm,
            content_language: config.content_language.clone(),
        }
    }
}
