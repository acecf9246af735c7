//! Axum route handlers for the Content API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::{evaluate_content, summarize, EvaluationSummary};
use crate::generation::ContentType;
use crate::llm_client::StructuredPayload;
use crate::pipeline::{run_pipeline, GenerationReport, PipelineRequest, SyllabusSource};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Either an extracted `syllabus` or raw `syllabus_text` must be present.
#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub syllabus: Option<StructuredPayload>,
    pub syllabus_text: Option<String>,
    pub content_type: ContentType,
    pub topic: Option<String>,
    #[serde(default)]
    pub evaluate: bool,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateContentRequest {
    pub content: String,
    pub syllabus: StructuredPayload,
    pub content_type: ContentType,
}

#[derive(Debug, Serialize)]
pub struct EvaluateContentResponse {
    pub evaluation: StructuredPayload,
    pub summary: EvaluationSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/content/generate
///
/// Runs the pipeline: extraction (skipped when `syllabus` is given) → generation → optional evaluation.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateContentRequest>,
) -> Result<Json<GenerationReport>, AppError> {
    let source = match (request.syllabus, request.syllabus_text) {
        (Some(syllabus), _) => SyllabusSource::Parsed(syllabus),
        (None, Some(text)) => SyllabusSource::Text(text),
        (None, None) => {
            return Err(AppError::Validation(
                "either syllabus or syllabus_text is required".to_string(),
            ))
        }
    };

    let report = run_pipeline(
        PipelineRequest {
            source,
            content_type: request.content_type,
            topic: request.topic,
            evaluate: request.evaluate,
        },
        &state.llm,
        &state.content_language,
    )
    .await?;

    Ok(Json(report))
}

/// POST /api/v1/content/evaluate
///
/// Scores existing content against the rubric. A failed evaluation comes back
/// as an error-marker payload with an empty summary, not as an HTTP error.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateContentRequest>,
) -> Result<Json<EvaluateContentResponse>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let evaluation = evaluate_content(
        &request.content,
        &request.syllabus,
        request.content_type,
        &state.llm,
    )
    .await;
    let summary = summarize(&evaluation);

    Ok(Json(EvaluateContentResponse {
        evaluation,
        summary,
    }))
}
