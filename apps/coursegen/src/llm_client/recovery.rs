//! Structured Response Recovery: pulls a JSON object out of raw model text.
//!
//! Failures never propagate: they come back as an error-marker payload
//! (`{"error": "<reason>"}`) that callers inspect like any other payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

/// Marker that makes the fixed-offset fallback worth trying.
const FENCE_PREFIX: &str = "```json";
const FENCE_LEADING_CHARS: usize = 8;
const FENCE_TRAILING_CHARS: usize = 4;

/// Field name carried by error-marker payloads.
pub const ERROR_FIELD: &str = "error";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("No JSON object found in response")]
    NoObject,

    #[error("Response too short to strip a ```json fence")]
    TooShort,

    #[error("Response is valid JSON but not an object")]
    NotAnObject,

    #[error("Malformed JSON in response: {0}")]
    Malformed(String),
}

/// How to locate the JSON object inside raw model text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// First `{` through last `}`.
    BraceScan,
    /// Drop 8 leading and 4 trailing characters, i.e. a "```json\n ... \n```" fence.
    /// Breaks silently when the model does not emit exactly that fence.
    FixedFence,
}

/// A decoded JSON object, or an error marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredPayload(Map<String, Value>);

impl StructuredPayload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn error_marker(reason: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(ERROR_FIELD.to_string(), Value::String(reason.into()));
        Self(fields)
    }

    /// The error reason, if this payload is an error marker.
    pub fn error(&self) -> Option<&str> {
        self.get_str(ERROR_FIELD)
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A string field, ignoring nulls and non-strings.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for StructuredPayload {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Recovers a payload using the brace scan, falling back to the fixed fence
/// only when the text starts with a ```` ```json ```` marker.
pub fn extract_structured(raw: &str) -> StructuredPayload {
    match try_extract(raw, RecoveryStrategy::BraceScan) {
        Err(e) if raw.starts_with(FENCE_PREFIX) => {
            warn!("Brace scan failed ({e}); retrying with fixed ```json fence offsets");
            extract_with(raw, RecoveryStrategy::FixedFence)
        }
        result => into_payload(result),
    }
}

/// Recovers a payload using exactly one strategy.
pub fn extract_with(raw: &str, strategy: RecoveryStrategy) -> StructuredPayload {
    into_payload(try_extract(raw, strategy))
}

/// Like [`extract_with`] but keeps the failure reason typed.
pub fn try_extract(
    raw: &str,
    strategy: RecoveryStrategy,
) -> Result<Map<String, Value>, DecodeError> {
    let candidate = match strategy {
        RecoveryStrategy::BraceScan => brace_region(raw).ok_or(DecodeError::NoObject)?,
        RecoveryStrategy::FixedFence => strip_fixed_fence(raw).ok_or(DecodeError::TooShort)?,
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(DecodeError::NotAnObject),
        Err(e) => Err(DecodeError::Malformed(e.to_string())),
    }
}

fn into_payload(result: Result<Map<String, Value>, DecodeError>) -> StructuredPayload {
    match result {
        Ok(fields) => {
            info!("Successfully extracted {} components", fields.len());
            StructuredPayload::new(fields)
        }
        Err(e) => {
            warn!("Structured recovery failed: {e}");
            StructuredPayload::error_marker(e.to_string())
        }
    }
}

/// Greedy span from the first `{` to the last `}`.
fn brace_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Drops the fixed fence widths, counted in characters.
fn strip_fixed_fence(text: &str) -> Option<&str> {
    let char_count = text.chars().count();
    if char_count < FENCE_LEADING_CHARS + FENCE_TRAILING_CHARS {
        return None;
    }
    let start = text.char_indices().nth(FENCE_LEADING_CHARS).map(|(i, _)| i)?;
    let end = text
        .char_indices()
        .nth(char_count - FENCE_TRAILING_CHARS)
        .map(|(i, _)| i)?;
    Some(&text[start..end])
}
