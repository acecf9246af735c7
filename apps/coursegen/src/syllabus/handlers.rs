//! Axum route handlers for the Syllabus API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::StructuredPayload;
use crate::state::AppState;
use crate::syllabus::document::DocumentKind;
use crate::syllabus::parser::{parse_syllabus, parse_syllabus_bytes, require_syllabus};

/// Multipart field carrying the uploaded document.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ParseSyllabusRequest {
    pub syllabus_text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseSyllabusResponse {
    pub syllabus: StructuredPayload,
}

/// POST /api/v1/syllabus/parse
///
/// Extracts the syllabus components from raw text.
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(request): Json<ParseSyllabusRequest>,
) -> Result<Json<ParseSyllabusResponse>, AppError> {
    if request.syllabus_text.trim().is_empty() {
        return Err(AppError::Validation(
            "syllabus_text cannot be empty".to_string(),
        ));
    }

    let syllabus = require_syllabus(parse_syllabus(&request.syllabus_text, &state.llm).await)?;

    Ok(Json(ParseSyllabusResponse { syllabus }))
}

/// POST /api/v1/syllabus/upload
///
/// Multipart upload of a PDF, DOCX or text syllabus in the `file` field.
/// The reader is picked from the uploaded file name's extension.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseSyllabusResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let extension = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
        let kind = DocumentKind::from_extension(extension)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        info!("Received syllabus upload {file_name} ({} bytes)", bytes.len());

        let payload = parse_syllabus_bytes(kind, bytes.to_vec(), &state.llm).await?;
        let syllabus = require_syllabus(payload)?;
        return Ok(Json(ParseSyllabusResponse { syllabus }));
    }

    Err(AppError::Validation(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}
