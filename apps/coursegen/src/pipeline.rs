//! Pipeline: parse syllabus → generate content → (optional) evaluate.
//!
//! Shared by the `generate` subcommand and the HTTP API. Every step draws from
//! the same `LlmClient`, so one run never exceeds the shared token budget.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::evaluate_content;
use crate::generation::generator::generate_content;
use crate::generation::ContentType;
use crate::llm_client::{LlmClient, StructuredPayload};
use crate::syllabus::components::component_text;
use crate::syllabus::parser::{parse_syllabus, parse_syllabus_file, require_syllabus};

/// Where the syllabus comes from.
#[derive(Debug, Clone)]
pub enum SyllabusSource {
    File(PathBuf),
    Text(String),
    /// Already extracted, e.g. by an earlier `/syllabus/parse` call.
    Parsed(StructuredPayload),
}

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub source: SyllabusSource,
    pub content_type: ContentType,
    pub topic: Option<String>,
    pub evaluate: bool,
}

/// The result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub content_type: ContentType,
    pub topic: Option<String>,
    pub course_title: Option<String>,
    pub content: String,
    pub evaluation: Option<StructuredPayload>,
}

pub async fn run_pipeline(
    request: PipelineRequest,
    llm: &LlmClient,
    language: &str,
) -> Result<GenerationReport, AppError> {
    let syllabus = match request.source {
        SyllabusSource::File(path) => parse_syllabus_file(&path, llm).await?,
        SyllabusSource::Text(text) => {
            if text.trim().is_empty() {
                return Err(AppError::Validation(
                    "syllabus_text cannot be empty".to_string(),
                ));
            }
            parse_syllabus(&text, llm).await
        }
        SyllabusSource::Parsed(payload) => payload,
    };
    let syllabus = require_syllabus(syllabus)?;

    let content = generate_content(
        &syllabus,
        request.content_type,
        request.topic.as_deref(),
        language,
        llm,
    )
    .await?;

    let evaluation = if request.evaluate {
        Some(evaluate_content(&content, &syllabus, request.content_type, llm).await)
    } else {
        None
    };

    let report = GenerationReport {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        content_type: request.content_type,
        topic: request.topic,
        course_title: component_text(&syllabus, "course_title"),
        content,
        evaluation,
    };
    info!(
        "Pipeline run {} finished: {} for {}",
        report.id,
        report.content_type,
        report.course_title.as_deref().unwrap_or("untitled course")
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::{json, Value};

    use super::*;
    use crate::evaluation::demo_evaluation;
    use crate::llm_client::testing::{client_with, demo_client, Reply, ScriptedBackend};

    const SYLLABUS_JSON: &str = r#"{"course_title": "Linear Algebra", "course_code": "MAT-201", "topics": ["Vectors", "Matrices"]}"#;

    fn request(source: SyllabusSource, evaluate: bool) -> PipelineRequest {
        PipelineRequest {
            source,
            content_type: ContentType::LectureNotes,
            topic: None,
            evaluate,
        }
    }

    #[tokio::test]
    async fn test_text_source_runs_all_steps() {
        let backend = ScriptedBackend::sequence(
            vec![
                Reply::Text(format!("```json\n{SYLLABUS_JSON}\n```")),
                Reply::Text("# Vectors\nNotes...".into()),
                Reply::Text(
                    r#"{"clarity": {"score": 4, "feedback": "ok"}, "overall_score": 4}"#.into(),
                ),
            ],
            Reply::NoText,
        );
        let llm = client_with(backend.clone());

        let report = run_pipeline(
            request(SyllabusSource::Text("MAT-201 Linear Algebra".into()), true),
            &llm,
            "Spanish",
        )
        .await
        .unwrap();

        assert_eq!(report.content, "# Vectors\nNotes...");
        assert_eq!(report.course_title.as_deref(), Some("Linear Algebra"));
        assert_eq!(report.evaluation.unwrap().get("overall_score"), Some(&json!(4)));
        assert_eq!(backend.calls().len(), 3);
        assert_eq!(llm.counts().success, 3);
    }

    #[tokio::test]
    async fn test_without_evaluation_makes_two_calls() {
        let backend = ScriptedBackend::sequence(
            vec![Reply::Text(SYLLABUS_JSON.into())],
            Reply::Text("Slides".into()),
        );
        let llm = client_with(backend.clone());

        let report = run_pipeline(
            request(SyllabusSource::Text("syllabus".into()), false),
            &llm,
            "Spanish",
        )
        .await
        .unwrap();

        assert!(report.evaluation.is_none());
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_extraction_failure_halts_before_generation() {
        let backend = ScriptedBackend::always(Reply::Text("no json here".into()));
        let llm = client_with(backend.clone());

        let source = SyllabusSource::Text("syllabus".into());
        let err = run_pipeline(request(source, true), &llm, "Spanish")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_demo_mode_stops_at_extraction() {
        let err = run_pipeline(
            request(SyllabusSource::Text("syllabus".into()), true),
            &demo_client(),
            "Spanish",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_parsed_source_in_demo_mode_uses_placeholders() {
        let payload: StructuredPayload = serde_json::from_str(SYLLABUS_JSON).unwrap();
        let report = run_pipeline(
            PipelineRequest {
                source: SyllabusSource::Parsed(payload),
                content_type: ContentType::Slides,
                topic: Some("Vectors".into()),
                evaluate: true,
            },
            &demo_client(),
            "Spanish",
        )
        .await
        .unwrap();

        assert_eq!(report.content, crate::llm_client::DEMO_PLACEHOLDER);
        assert_eq!(report.evaluation, Some(demo_evaluation()));
        assert_eq!(report.topic.as_deref(), Some("Vectors"));
    }

    #[tokio::test]
    async fn test_file_source_is_read() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "MAT-201 Linear Algebra, topics: Vectors").unwrap();
        let backend = ScriptedBackend::sequence(
            vec![Reply::Text(SYLLABUS_JSON.into())],
            Reply::Text("Notes".into()),
        );
        let llm = client_with(backend.clone());

        let report = run_pipeline(
            request(SyllabusSource::File(file.path().to_path_buf()), false),
            &llm,
            "Spanish",
        )
        .await
        .unwrap();

        assert_eq!(report.content, "Notes");
        assert!(backend.calls()[0].0.contains("topics: Vectors"));
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let source = SyllabusSource::Text(" ".into());
        let err = run_pipeline(request(source, false), &demo_client(), "Spanish")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_report_serializes_snake_case_type() {
        let payload: StructuredPayload = serde_json::from_str(SYLLABUS_JSON).unwrap();
        let report = run_pipeline(
            request(SyllabusSource::Parsed(payload), false),
            &demo_client(),
            "Spanish",
        )
        .await
        .unwrap();

        let json: Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["content_type"], "lecture_notes");
        assert!(json["evaluation"].is_null());
        assert!(json["id"].as_str().is_some());
    }
}
