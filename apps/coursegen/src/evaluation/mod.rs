//! Quality Evaluator: scores generated content against a fixed ten-criterion rubric.
//!
//! The model answers with JSON which goes through structured recovery. In demo
//! mode a fixed, fully populated evaluation is returned instead so callers can
//! exercise the whole flow without an API key.

pub mod prompts;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::generation::ContentType;
use crate::llm_client::prompts::{bullet_list, fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{extract_structured, CallResult, LlmClient, StructuredPayload};
use crate::syllabus::components::component_or;

use self::prompts::{EVALUATION_CRITERIA, EVALUATION_PROMPT_TEMPLATE};

pub const EVALUATION_MAX_TOKENS: u32 = 2000;
pub const EVALUATION_TEMPERATURE: f32 = 0.3;

/// One `{"score", "feedback"}` line per criterion plus the summary fields.
fn json_shape() -> String {
    let mut lines: Vec<String> = EVALUATION_CRITERIA
        .iter()
        .map(|(name, _)| {
            format!(r#"  "{name}": {{"score": <1-5>, "feedback": "<specific feedback>"}},"#)
        })
        .collect();
    lines.push(r#"  "overall_score": <average of the scores>,"#.to_string());
    lines.push(r#"  "improvement_suggestions": ["<suggestion 1>", "<suggestion 2>"]"#.to_string());
    format!("{{\n{}\n}}", lines.join("\n"))
}

pub fn build_evaluation_prompt(
    content: &str,
    syllabus: &StructuredPayload,
    content_type: ContentType,
) -> String {
    let criteria = bullet_list(EVALUATION_CRITERIA);
    let course_title = component_or(syllabus, "course_title", "N/A");
    let course_code = component_or(syllabus, "course_code", "N/A");
    let objectives = component_or(syllabus, "learning_objectives", "Not specified");
    let json_shape = json_shape();

    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("content_type", content_type.label()),
            ("criteria", criteria.as_str()),
            ("course_title", course_title.as_str()),
            ("course_code", course_code.as_str()),
            ("learning_objectives", objectives.as_str()),
            ("json_shape", json_shape.as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("content", content),
        ],
    )
}

/// The evaluation returned when no API key is configured.
pub fn demo_evaluation() -> StructuredPayload {
    let demo = json!({
        "accuracy": {"score": 4, "feedback": "Good accuracy, but the examples could be improved."},
        "alignment": {"score": 5, "feedback": "Well aligned with the learning objectives."},
        "completeness": {"score": 4, "feedback": "Covers most topics, but some lack depth."},
        "clarity": {"score": 3, "feedback": "Some parts could be clearer."},
        "engagement": {"score": 4, "feedback": "Uses interesting examples, but could be more interactive."},
        "level_appropriateness": {"score": 5, "feedback": "Appropriate for the course level."},
        "relevance": {"score": 4, "feedback": "Relevant, but more practical connections could be added."},
        "consistency": {"score": 5, "feedback": "No contradictions detected."},
        "readability": {"score": 3, "feedback": "The language could be simplified in some sections."},
        "domain_terminology": {"score": 5, "feedback": "Correct use of technical terms."},
        "overall_score": 4.3,
        "improvement_suggestions": [
            "Add more in-depth examples.",
            "Rephrase some explanations for clarity.",
            "Make the content more interactive."
        ]
    });
    extract_structured(&demo.to_string())
}

/// Evaluates `content`. Never fails: refusals and service errors come back as
/// error-marker payloads.
pub async fn evaluate_content(
    content: &str,
    syllabus: &StructuredPayload,
    content_type: ContentType,
    llm: &LlmClient,
) -> StructuredPayload {
    info!("Evaluating generated {content_type} content...");
    let prompt = build_evaluation_prompt(content, syllabus, content_type);

    let evaluation = match llm
        .dispatch_with(&prompt, EVALUATION_MAX_TOKENS, EVALUATION_TEMPERATURE)
        .await
    {
        CallResult::Success(text) => extract_structured(&text),
        CallResult::ConfigurationMissing(_) => {
            warn!("Gemini API key not configured. Returning demo evaluation.");
            demo_evaluation()
        }
        CallResult::RateLimited => {
            StructuredPayload::error_marker("API rate limit exceeded. Please try again later.")
        }
        CallResult::ServiceError(message) => StructuredPayload::error_marker(message),
    };

    match evaluation.error() {
        Some(reason) => error!("Could not produce a structured evaluation: {reason}"),
        None => info!("Evaluation completed"),
    }
    evaluation
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: f64,
}

/// Display-ready view of an evaluation payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub overall_score: Option<f64>,
    /// Rubric criteria first, in rubric order, then any extra scored fields.
    pub criteria: Vec<CriterionScore>,
}

/// Pulls `overall_score` and every `{"score": ..}` field out of an evaluation.
/// Scores sent as numeric strings are accepted.
pub fn summarize(evaluation: &StructuredPayload) -> EvaluationSummary {
    let mut criteria: Vec<CriterionScore> = evaluation
        .fields()
        .iter()
        .filter_map(|(name, details)| {
            let score = details.as_object()?.get("score").and_then(as_score)?;
            Some(CriterionScore {
                criterion: name.clone(),
                score,
            })
        })
        .collect();
    criteria.sort_by_key(|c| rubric_position(&c.criterion));

    EvaluationSummary {
        overall_score: evaluation.get("overall_score").and_then(as_score),
        criteria,
    }
}

fn as_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn rubric_position(criterion: &str) -> usize {
    EVALUATION_CRITERIA
        .iter()
        .position(|(name, _)| *name == criterion)
        .unwrap_or(EVALUATION_CRITERIA.len())
}
