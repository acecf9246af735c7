use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;

/// Application configuration loaded from environment variables.
/// Nothing is required: without an API key the tool runs in demo mode.
#[derive(Debug)]
pub struct Config {
    /// Gemini API key from `API_KEY` (or `GEMINI_API_KEY`).
    pub api_key: Option<SecretString>,
    pub tokens_per_minute: u64,
    pub rate_limit_backoff: Duration,
    pub llm_timeout: Duration,
    /// Language the generated material is written in.
    pub content_language: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("API_KEY")
            .or_else(|| var("GEMINI_API_KEY"))
            .map(SecretString::from);

        Ok(Config {
            api_key,
            tokens_per_minute: parse_or(var("TOKENS_PER_MINUTE"), 60_000, "TOKENS_PER_MINUTE")?,
            rate_limit_backoff: Duration::from_secs(parse_or(
                var("RATE_LIMIT_BACKOFF_SECS"),
                60,
                "RATE_LIMIT_BACKOFF_SECS",
            )?),
            llm_timeout: Duration::from_secs(parse_or(
                var("LLM_TIMEOUT_SECS"),
                120,
                "LLM_TIMEOUT_SECS",
            )?),
            content_language: var("CONTENT_LANGUAGE").unwrap_or_else(|| "Spanish".to_string()),
            port: parse_or(var("PORT"), 8080, "PORT")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_or<T>(value: Option<String>, default: T, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
