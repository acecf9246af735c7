//! Content Generator: turns an extracted syllabus into one piece of teaching material.
//!
//! Flow: resolve topics → build prompt → dispatch → map the outcome to text or `AppError`.
//!
//! Demo mode is not an error here: the placeholder text is returned as the content.

use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::prompts::{
    type_format, BASE_PROMPT_TEMPLATE, GENERAL_COURSE_CONTENT, GENERATION_PROMPT_TEMPLATE,
};
use crate::generation::ContentType;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{CallResult, LlmClient, StructuredPayload};
use crate::syllabus::components::{component_or, topics};

/// Topics to cover: the explicit topic when given, otherwise the syllabus topics.
///
/// Suggested readings cover the course as a whole unless a topic is given.
pub fn resolve_topics(
    syllabus: &StructuredPayload,
    content_type: ContentType,
    topic: Option<&str>,
) -> Vec<String> {
    match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => vec![topic.to_string()],
        None if content_type.requires_topics() => topics(syllabus),
        None => Vec::new(),
    }
}

/// Builds the generation prompt. `topics` must already be resolved.
pub fn build_generation_prompt(
    syllabus: &StructuredPayload,
    content_type: ContentType,
    topics: &[String],
    language: &str,
) -> String {
    let format = type_format(content_type);

    let mut course_info = vec![
        format!("- Title: {}", component_or(syllabus, "course_title", "N/A")),
        format!("- Code: {}", component_or(syllabus, "course_code", "N/A")),
    ];
    if format.with_description {
        course_info.push(format!(
            "- Description: {}",
            component_or(syllabus, "course_description", "N/A")
        ));
    }
    if format.with_objectives {
        course_info.push(format!(
            "- Learning Objectives: {}",
            component_or(syllabus, "learning_objectives", "Not specified")
        ));
    }

    let topics = if topics.is_empty() {
        GENERAL_COURSE_CONTENT.to_string()
    } else {
        topics.join(", ")
    };

    let base = fill_template(BASE_PROMPT_TEMPLATE, &[("language", language)]);
    let course_info = course_info.join("\n");
    fill_template(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("base", base.as_str()),
            ("task", format.task),
            ("course_info", course_info.as_str()),
            ("topics", topics.as_str()),
            ("format", format.format),
        ],
    )
}

/// Generates one piece of content for `content_type`.
///
/// Errors: `Validation` when there is nothing to cover, `RateLimited` when the
/// token gate refused twice, `Llm` when the model call failed.
pub async fn generate_content(
    syllabus: &StructuredPayload,
    content_type: ContentType,
    topic: Option<&str>,
    language: &str,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let topics = resolve_topics(syllabus, content_type, topic);
    if topics.is_empty() && content_type.requires_topics() {
        return Err(AppError::Validation(format!(
            "No topics available to generate {}",
            content_type.label()
        )));
    }

    info!("Generating {content_type} content...");
    let prompt = build_generation_prompt(syllabus, content_type, &topics, language);

    match llm.dispatch(&prompt, content_type.max_output_tokens()).await {
        CallResult::Success(text) => {
            info!("Generated {} characters of {content_type}", text.chars().count());
            Ok(text)
        }
        CallResult::ConfigurationMissing(placeholder) => Ok(placeholder),
        CallResult::RateLimited => Err(AppError::RateLimited),
        CallResult::ServiceError(message) => {
            error!("Content generation failed: {message}");
            Err(AppError::Llm(message))
        }
    }
}
