//! Extracts the ten syllabus components from raw document text.

use std::path::Path;

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{extract_structured, CallResult, LlmClient, StructuredPayload};
use crate::syllabus::components::SYLLABUS_COMPONENTS;
use crate::syllabus::document::{
    extract_text, extract_text_from_bytes, DocumentError, DocumentKind,
};
use crate::syllabus::prompts::EXTRACTION_PROMPT_TEMPLATE;

/// Output allowance for the extraction call.
pub const EXTRACTION_MAX_TOKENS: u32 = 2000;
pub const EXTRACTION_TEMPERATURE: f32 = 0.7;

/// Builds the extraction prompt for `syllabus_text`.
pub fn build_extraction_prompt(syllabus_text: &str) -> String {
    let components = SYLLABUS_COMPONENTS.join(", ");
    fill_template(
        EXTRACTION_PROMPT_TEMPLATE,
        &[
            ("components", components.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("syllabus_text", syllabus_text),
        ],
    )
}

/// Runs extraction over syllabus text.
///
/// Never fails: every dispatch outcome other than a decodable object comes back
/// as an error-marker payload. Demo mode yields the placeholder text, which holds
/// no JSON object, so it also ends up as an error marker.
pub async fn parse_syllabus(syllabus_text: &str, llm: &LlmClient) -> StructuredPayload {
    info!("Parsing syllabus...");
    let prompt = build_extraction_prompt(syllabus_text);

    let result = llm
        .dispatch_with(&prompt, EXTRACTION_MAX_TOKENS, EXTRACTION_TEMPERATURE)
        .await;

    let payload = match result {
        CallResult::Success(text) | CallResult::ConfigurationMissing(text) => {
            extract_structured(&text)
        }
        CallResult::RateLimited => {
            StructuredPayload::error_marker("API rate limit exceeded. Please try again later.")
        }
        CallResult::ServiceError(message) => StructuredPayload::error_marker(message),
    };

    match payload.error() {
        Some(reason) => error!("Failed to extract structured data from syllabus: {reason}"),
        None if payload.is_empty() => warn!("Model returned an empty syllabus object"),
        None => info!(
            "Successfully extracted {} components from syllabus",
            payload.len()
        ),
    }
    payload
}

/// Reads a syllabus file and runs extraction over its text.
pub async fn parse_syllabus_file(
    path: &Path,
    llm: &LlmClient,
) -> Result<StructuredPayload, AppError> {
    let path = path.to_path_buf();
    let text = read_document(move || extract_text(&path)).await?;
    Ok(parse_syllabus(&text, llm).await)
}

/// Like [`parse_syllabus_file`] for an uploaded document.
pub async fn parse_syllabus_bytes(
    kind: DocumentKind,
    bytes: Vec<u8>,
    llm: &LlmClient,
) -> Result<StructuredPayload, AppError> {
    let text = read_document(move || extract_text_from_bytes(kind, bytes)).await?;
    Ok(parse_syllabus(&text, llm).await)
}

/// Turns an error-marker payload into an `AppError`, passing real data through.
pub fn require_syllabus(payload: StructuredPayload) -> Result<StructuredPayload, AppError> {
    match payload.error() {
        Some(reason) => Err(AppError::Extraction(reason.to_string())),
        None => Ok(payload),
    }
}

/// Decodes the document on the blocking pool and rejects documents without text.
async fn read_document<F>(read: F) -> Result<String, AppError>
where
    F: FnOnce() -> Result<String, DocumentError> + Send + 'static,
{
    let text = tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Document extraction task failed: {e}")))??;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "The syllabus document contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}
